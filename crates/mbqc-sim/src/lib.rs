//! MBQC Pattern Runtime
//!
//! This crate executes measurement patterns produced by `mbqc-compile`. A
//! [`MbqcSimulator`] walks the command list once: entanglement commands
//! bring auxiliary qubits in as |+⟩, measurements sample their outcome from
//! the Born rule at the feed-forward angle and remove the qubit, and
//! corrections fire on the parity of earlier outcomes.
//!
//! Two backends implement the [`Backend`] trait:
//!
//! | Backend | Storage | Removing a qubit |
//! |---------|---------|------------------|
//! | [`StateVectorBackend`] | `Vec<Complex64>` | requires a product state |
//! | [`DensityMatrixBackend`] | `ndarray::Array2<Complex64>` | partial trace |
//!
//! # Example
//!
//! ```rust
//! use mbqc_ir::QubitId;
//! use mbqc_pattern::{Command, Correction, Domain, Measurement, Pattern};
//! use mbqc_sim::{QuantumState, SimulatorConfig, simulate};
//!
//! // J(0) = H: E(0,1) M(0, 0) X_1^{s0}
//! let pattern = Pattern::new(
//!     vec![QubitId(0)],
//!     vec![QubitId(1)],
//!     vec![
//!         Command::entangle(QubitId(0), QubitId(1)),
//!         Measurement::new(QubitId(0), 0.0).into(),
//!         Correction::x(QubitId(1), Domain::single(QubitId(0))).into(),
//!     ],
//! )
//! .unwrap();
//!
//! let input = QuantumState::zero([QubitId(0)]).unwrap();
//! let result = simulate(pattern, input, &SimulatorConfig::default().with_seed(7)).unwrap();
//!
//! let plus = QuantumState::plus([QubitId(1)]).unwrap();
//! assert!(result.output.fidelity(&plus).unwrap() > 1.0 - 1e-9);
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod reference;
pub mod runtime;
pub mod state;
pub mod statevector;

use std::sync::Arc;

use mbqc_pattern::{OutcomeTable, Pattern};

pub use backend::{Backend, BackendKind, DensityMatrixBackend, StateVectorBackend};
pub use config::SimulatorConfig;
pub use error::{SimError, SimResult};
pub use reference::{run_circuit, simulate_circuit};
pub use runtime::{MbqcSimulator, RuntimeState};
pub use state::{QuantumState, StateData};
pub use statevector::Statevector;

/// Output of a single pattern run.
#[derive(Debug, Clone)]
pub struct SimulationResult {
    /// State of the output qubits, in declared output order.
    pub output: QuantumState,
    /// Every measurement outcome of the run.
    pub outcomes: OutcomeTable,
}

/// Run a pattern once on the backend selected by `config`.
pub fn simulate(
    pattern: impl Into<Arc<Pattern>>,
    input: QuantumState,
    config: &SimulatorConfig,
) -> SimResult<SimulationResult> {
    match config.backend {
        BackendKind::Statevector => run::<StateVectorBackend>(pattern.into(), input, config),
        BackendKind::Density => run::<DensityMatrixBackend>(pattern.into(), input, config),
    }
}

fn run<B: Backend>(
    pattern: Arc<Pattern>,
    input: QuantumState,
    config: &SimulatorConfig,
) -> SimResult<SimulationResult> {
    let mut sim = MbqcSimulator::<B>::new(pattern, config.clone());
    sim.set_input_state(input)?;
    sim.run_pattern()?;
    let output = sim.get_quantum_output()?;
    Ok(SimulationResult {
        output,
        outcomes: sim.into_outcomes(),
    })
}
