//! Pattern runtime.
//!
//! [`MbqcSimulator`] executes a compiled [`Pattern`] command by command on a
//! [`Backend`], sampling measurement outcomes from the Born rule and feeding
//! them forward into later measurements and corrections.

use std::fmt;
use std::sync::Arc;

use mbqc_ir::QubitId;
use mbqc_pattern::{Command, Correction, CorrectionKind, Measurement, OutcomeTable, Pattern};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, instrument, trace};

use crate::backend::{Backend, plus_state};
use crate::config::SimulatorConfig;
use crate::error::{SimError, SimResult};
use crate::state::QuantumState;

/// Lifecycle of a simulator.
///
/// ```text
/// Uninitialized ──set_input_state──► Ready ──run_pattern──► Running ──► Completed
///                                     ▲ │
///                                     └─┘ set_input_state
/// ```
///
/// A run that fails stays in `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuntimeState {
    /// No input state bound yet.
    Uninitialized,
    /// Input bound, ready to run.
    Ready,
    /// Executing, or aborted by an error.
    Running,
    /// All commands executed.
    Completed,
}

impl fmt::Display for RuntimeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeState::Uninitialized => write!(f, "uninitialized"),
            RuntimeState::Ready => write!(f, "ready"),
            RuntimeState::Running => write!(f, "running"),
            RuntimeState::Completed => write!(f, "completed"),
        }
    }
}

/// Executes one pattern once.
pub struct MbqcSimulator<B: Backend> {
    pattern: Arc<Pattern>,
    config: SimulatorConfig,
    state: RuntimeState,
    backend: Option<B>,
    outcomes: OutcomeTable,
    rng: StdRng,
}

impl<B: Backend> MbqcSimulator<B> {
    /// Create a simulator for a pattern.
    ///
    /// The random generator is seeded from `config.seed`, or from entropy
    /// when no seed is set.
    pub fn new(pattern: impl Into<Arc<Pattern>>, config: SimulatorConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            pattern: pattern.into(),
            config,
            state: RuntimeState::Uninitialized,
            backend: None,
            outcomes: OutcomeTable::new(),
            rng,
        }
    }

    /// The pattern being executed.
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// The configuration in use.
    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RuntimeState {
        self.state
    }

    /// The backend, once an input state is bound.
    pub fn backend(&self) -> Option<&B> {
        self.backend.as_ref()
    }

    /// Bind the input state.
    ///
    /// The labels must be exactly the pattern's input qubits, in any order.
    /// Binding again before the run replaces the previous state.
    pub fn set_input_state(&mut self, state: QuantumState) -> SimResult<()> {
        self.expect_state("set the input state", &[RuntimeState::Uninitialized, RuntimeState::Ready])?;

        let inputs = self.pattern.inputs();
        if state.num_qubits() != inputs.len()
            || !inputs.iter().all(|q| state.labels().contains(q))
        {
            return Err(SimError::StateMismatch(format!(
                "input state on {:?} does not match pattern inputs {:?}",
                state.labels(),
                inputs
            )));
        }

        self.backend = Some(B::from_state(state)?);
        self.state = RuntimeState::Ready;
        Ok(())
    }

    /// Execute every command of the pattern in order.
    #[instrument(skip(self), fields(commands = self.pattern.commands().len()))]
    pub fn run_pattern(&mut self) -> SimResult<()> {
        self.expect_state("run the pattern", &[RuntimeState::Ready])?;
        let Some(mut backend) = self.backend.take() else {
            return Err(SimError::InvalidRuntimeState {
                operation: "run the pattern",
                state: self.state,
            });
        };
        self.state = RuntimeState::Running;
        info!(
            "Running pattern with {} commands on the {} backend",
            self.pattern.commands().len(),
            backend.name()
        );

        let pattern = Arc::clone(&self.pattern);
        for (index, command) in pattern.commands().iter().enumerate() {
            trace!("#{} {}", index, command);
            let result = match command {
                Command::Entangle(a, b) => Self::entangle(&mut backend, *a, *b),
                Command::Measure(m) => self.measure(&mut backend, index, m),
                Command::Correct(c) => self.correct(&mut backend, index, c),
            };
            if let Err(e) = result {
                self.backend = Some(backend);
                return Err(e);
            }
        }

        info!(
            "Pattern completed: {} outcomes, {} output qubits",
            self.outcomes.len(),
            backend.num_qubits()
        );
        self.backend = Some(backend);
        self.state = RuntimeState::Completed;
        Ok(())
    }

    /// The state of the output qubits, in the pattern's output order.
    pub fn get_quantum_output(&self) -> SimResult<QuantumState> {
        self.expect_state("read the output state", &[RuntimeState::Completed])?;
        let backend = self.backend.as_ref().ok_or(SimError::InvalidRuntimeState {
            operation: "read the output state",
            state: self.state,
        })?;
        backend.extract_subsystem(self.pattern.outputs())
    }

    /// Recorded measurement outcomes.
    pub fn outcomes(&self) -> &OutcomeTable {
        &self.outcomes
    }

    /// Outcomes of the given qubits as a bit string, first qubit first.
    pub fn classical_output(&self, qubits: &[QubitId]) -> SimResult<String> {
        qubits
            .iter()
            .map(|&q| {
                self.outcomes
                    .get(q)
                    .map(|bit| if bit == 0 { '0' } else { '1' })
                    .ok_or(SimError::MissingOutcome(q))
            })
            .collect()
    }

    /// Consume the simulator and return the outcome table.
    pub fn into_outcomes(self) -> OutcomeTable {
        self.outcomes
    }

    fn expect_state(&self, operation: &'static str, allowed: &[RuntimeState]) -> SimResult<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(SimError::InvalidRuntimeState {
                operation,
                state: self.state,
            })
        }
    }

    fn entangle(backend: &mut B, a: QubitId, b: QubitId) -> SimResult<()> {
        for q in [a, b] {
            if !backend.contains(q) {
                backend.tensor_in(q, &plus_state())?;
            }
        }
        backend.apply_cz(a, b)
    }

    fn measure(&mut self, backend: &mut B, index: usize, m: &Measurement) -> SimResult<()> {
        let angle = m
            .adapted_angle(&self.outcomes)
            .map_err(|qubit| SimError::DependencyOrder { index, qubit })?;

        let zero = m.plane.basis_vector(angle, 0);
        let p0 = backend.outcome_probability(m.qubit, &zero)?;
        let tolerance = self.config.tolerance;
        let outcome: u8 = if p0 <= tolerance {
            1
        } else if p0 >= 1.0 - tolerance {
            0
        } else {
            u8::from(self.rng.r#gen::<f64>() >= p0)
        };

        backend.apply_projector(m.qubit, &m.plane.basis_vector(angle, outcome))?;
        self.outcomes.record(m.qubit, outcome)?;
        backend.trace_out(m.qubit)?;
        debug!(
            "M({}) {} angle {:.6} -> {} (p0 = {:.6})",
            m.qubit, m.plane, angle, outcome, p0
        );
        Ok(())
    }

    fn correct(&self, backend: &mut B, index: usize, c: &Correction) -> SimResult<()> {
        let fire = self
            .outcomes
            .parity(&c.domain)
            .map_err(|qubit| SimError::DependencyOrder { index, qubit })?;
        if !fire {
            return Ok(());
        }
        match c.kind {
            CorrectionKind::X => backend.apply_x(c.qubit),
            CorrectionKind::Z => backend.apply_z(c.qubit),
        }
    }
}

impl<B: Backend> fmt::Debug for MbqcSimulator<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MbqcSimulator")
            .field("state", &self.state)
            .field("commands", &self.pattern.commands().len())
            .field("outcomes", &self.outcomes.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendKind, DensityMatrixBackend, StateVectorBackend};
    use mbqc_pattern::Domain;
    use num_complex::Complex64;

    fn q(i: u32) -> QubitId {
        QubitId(i)
    }

    /// `J(α)` on one input: E(0,1) M(0, -α) X_1^{s0}.
    fn j_pattern(alpha: f64) -> Pattern {
        Pattern::new(
            vec![q(0)],
            vec![q(1)],
            vec![
                Command::entangle(q(0), q(1)),
                Measurement::new(q(0), mbqc_pattern::normalize_angle(-alpha)).into(),
                Correction::x(q(1), Domain::single(q(0))).into(),
            ],
        )
        .unwrap()
    }

    fn seeded(seed: u64) -> SimulatorConfig {
        SimulatorConfig {
            seed: Some(seed),
            ..SimulatorConfig::default()
        }
    }

    #[test]
    fn test_lifecycle() {
        let mut sim = MbqcSimulator::<StateVectorBackend>::new(j_pattern(0.3), seeded(1));
        assert_eq!(sim.state(), RuntimeState::Uninitialized);
        assert!(matches!(
            sim.run_pattern(),
            Err(SimError::InvalidRuntimeState {
                state: RuntimeState::Uninitialized,
                ..
            })
        ));
        assert!(sim.get_quantum_output().is_err());

        sim.set_input_state(QuantumState::zero([q(0)]).unwrap()).unwrap();
        sim.set_input_state(QuantumState::plus([q(0)]).unwrap()).unwrap();
        assert_eq!(sim.state(), RuntimeState::Ready);

        sim.run_pattern().unwrap();
        assert_eq!(sim.state(), RuntimeState::Completed);
        assert!(matches!(
            sim.run_pattern(),
            Err(SimError::InvalidRuntimeState { .. })
        ));
        assert!(matches!(
            sim.set_input_state(QuantumState::zero([q(0)]).unwrap()),
            Err(SimError::InvalidRuntimeState { .. })
        ));
        assert_eq!(sim.get_quantum_output().unwrap().labels(), &[q(1)]);
    }

    #[test]
    fn test_input_labels_must_match() {
        let mut sim = MbqcSimulator::<StateVectorBackend>::new(j_pattern(0.3), seeded(1));
        assert!(matches!(
            sim.set_input_state(QuantumState::zero([q(5)]).unwrap()),
            Err(SimError::StateMismatch(_))
        ));
        assert!(matches!(
            sim.set_input_state(QuantumState::zero([q(0), q(1)]).unwrap()),
            Err(SimError::StateMismatch(_))
        ));
        assert_eq!(sim.state(), RuntimeState::Uninitialized);
    }

    #[test]
    fn test_j_pattern_applies_h_p() {
        // J(α)|0⟩ = H·P(α)|0⟩ = |+⟩ for any α.
        for seed in 0..8 {
            let mut sim = MbqcSimulator::<StateVectorBackend>::new(j_pattern(1.1), seeded(seed));
            sim.set_input_state(QuantumState::zero([q(0)]).unwrap()).unwrap();
            sim.run_pattern().unwrap();
            let out = sim.get_quantum_output().unwrap();
            let plus = QuantumState::plus([q(0)]).unwrap();
            assert!((out.fidelity(&plus).unwrap() - 1.0).abs() < 1e-10);
        }
    }

    #[test]
    fn test_both_outcomes_are_corrected() {
        // J(π/2)|+⟩ = H·S|+⟩ = H (|0⟩ + i|1⟩)/√2.
        let h = std::f64::consts::FRAC_1_SQRT_2;
        let s = Complex64::new(0.0, 1.0);
        let expected = QuantumState::from_vector(
            [q(0)],
            vec![(Complex64::new(1.0, 0.0) + s) * h * h, (Complex64::new(1.0, 0.0) - s) * h * h],
        )
        .unwrap();

        let mut seen = [false; 2];
        for seed in 0..32 {
            let mut sim = MbqcSimulator::<DensityMatrixBackend>::new(
                j_pattern(std::f64::consts::FRAC_PI_2),
                seeded(seed),
            );
            sim.set_input_state(QuantumState::plus([q(0)]).unwrap()).unwrap();
            sim.run_pattern().unwrap();
            seen[usize::from(sim.outcomes().get(q(0)).unwrap())] = true;
            let out = sim.get_quantum_output().unwrap();
            assert!((out.fidelity(&expected).unwrap() - 1.0).abs() < 1e-10);
        }
        assert_eq!(seen, [true, true]);
    }

    #[test]
    fn test_out_of_order_read_fails_and_stays_running() {
        let pattern = Pattern::new(
            vec![q(0), q(1)],
            vec![q(2)],
            vec![
                Command::entangle(q(1), q(2)),
                Measurement::new(q(1), 0.4)
                    .with_s_domain(Domain::single(q(0)))
                    .into(),
                Measurement::new(q(0), 0.2).into(),
            ],
        )
        .unwrap();
        let mut sim = MbqcSimulator::<StateVectorBackend>::new(pattern, seeded(3));
        sim.set_input_state(QuantumState::zero([q(1), q(0)]).unwrap()).unwrap();
        assert!(matches!(
            sim.run_pattern(),
            Err(SimError::DependencyOrder { index: 1, qubit }) if qubit == q(0)
        ));
        assert_eq!(sim.state(), RuntimeState::Running);
        assert!(sim.run_pattern().is_err());
    }

    #[test]
    fn test_classical_output() {
        let mut sim = MbqcSimulator::<StateVectorBackend>::new(j_pattern(0.0), seeded(9));
        sim.set_input_state(QuantumState::zero([q(0)]).unwrap()).unwrap();
        sim.run_pattern().unwrap();

        let bits = sim.classical_output(&[q(0)]).unwrap();
        assert_eq!(bits.len(), 1);
        assert!(matches!(
            sim.classical_output(&[q(1)]),
            Err(SimError::MissingOutcome(_))
        ));
        assert_eq!(sim.config().backend, BackendKind::Statevector);
    }
}
