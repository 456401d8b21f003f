//! Pure-state backend.

use mbqc_ir::QubitId;
use ndarray::Array2;
use num_complex::Complex64;
use tracing::trace;

use super::{Backend, PROBABILITY_FLOOR, check_matrix, projector};
use crate::error::{SimError, SimResult};
use crate::state::{QuantumState, StateData, positions_of};
use crate::statevector::{Statevector, insert_bit};

/// Tolerance of the separability test in [`StateVectorBackend::trace_out`].
const SEPARABILITY_TOLERANCE: f64 = 1e-9;

/// Dense amplitude vector over the present qubits.
///
/// Removing a qubit requires it to be in a product state with the rest of
/// the register, which holds right after a projective measurement.
#[derive(Debug, Clone)]
pub struct StateVectorBackend {
    labels: Vec<QubitId>,
    state: Statevector,
}

impl StateVectorBackend {
    /// The amplitudes in bit order of [`Backend::labels`].
    pub fn amplitudes(&self) -> &[Complex64] {
        self.state.amplitudes()
    }

    fn position(&self, qubit: QubitId) -> SimResult<usize> {
        self.labels
            .iter()
            .position(|&l| l == qubit)
            .ok_or(SimError::QubitNotPresent(qubit))
    }

    /// The two branches of the vector with the qubit at `pos` fixed to 0 and 1.
    fn branches(&self, pos: usize) -> (Vec<Complex64>, Vec<Complex64>) {
        let amps = self.state.amplitudes();
        let half = amps.len() / 2;
        let zero = (0..half).map(|r| amps[insert_bit(r, pos, 0)]).collect();
        let one = (0..half).map(|r| amps[insert_bit(r, pos, 1)]).collect();
        (zero, one)
    }
}

impl Backend for StateVectorBackend {
    fn name(&self) -> &'static str {
        "statevector"
    }

    fn from_state(state: QuantumState) -> SimResult<Self> {
        let (labels, data) = state.into_parts();
        match data {
            StateData::Vector(amplitudes) => Ok(Self {
                labels,
                state: Statevector::from_amplitudes(amplitudes),
            }),
            StateData::Density(_) => Err(SimError::InvalidState(
                "the state-vector backend needs a pure state vector".into(),
            )),
        }
    }

    fn labels(&self) -> &[QubitId] {
        &self.labels
    }

    fn apply_unitary(&mut self, qubits: &[QubitId], matrix: &Array2<Complex64>) -> SimResult<()> {
        check_matrix(qubits, matrix)?;
        let positions = positions_of(&self.labels, qubits)?;
        self.state.apply_matrix(&positions, matrix);
        Ok(())
    }

    fn apply_cz(&mut self, a: QubitId, b: QubitId) -> SimResult<()> {
        let (pa, pb) = (self.position(a)?, self.position(b)?);
        if pa == pb {
            return Err(SimError::InvalidState(format!("CZ on {a} with itself")));
        }
        self.state.apply_cz(pa, pb);
        Ok(())
    }

    fn apply_x(&mut self, qubit: QubitId) -> SimResult<()> {
        let pos = self.position(qubit)?;
        self.state.apply_x(pos);
        Ok(())
    }

    fn apply_z(&mut self, qubit: QubitId) -> SimResult<()> {
        let pos = self.position(qubit)?;
        self.state.apply_z(pos);
        Ok(())
    }

    fn outcome_probability(&self, qubit: QubitId, basis: &[Complex64; 2]) -> SimResult<f64> {
        let pos = self.position(qubit)?;
        let (zero, one) = self.branches(pos);
        let (v0, v1) = (basis[0].conj(), basis[1].conj());
        Ok(zero
            .iter()
            .zip(&one)
            .map(|(a, b)| (v0 * *a + v1 * *b).norm_sqr())
            .sum())
    }

    fn apply_projector(&mut self, qubit: QubitId, basis: &[Complex64; 2]) -> SimResult<f64> {
        let pos = self.position(qubit)?;
        self.state.apply_matrix(&[pos], &projector(basis));

        let probability = self.state.norm_sqr();
        if probability < PROBABILITY_FLOOR {
            return Err(SimError::ZeroProbability { qubit, probability });
        }
        let scale = probability.sqrt();
        let normalized: Vec<Complex64> = self
            .state
            .amplitudes()
            .iter()
            .map(|a| *a / scale)
            .collect();
        self.state = Statevector::from_amplitudes(normalized);
        Ok(probability)
    }

    fn trace_out(&mut self, qubit: QubitId) -> SimResult<()> {
        let pos = self.position(qubit)?;
        let (zero, one) = self.branches(pos);

        // |ψ⟩ = |0⟩|ψ0⟩ + |1⟩|ψ1⟩ is a product state iff ψ0 ∥ ψ1.
        let n0: f64 = zero.iter().map(Complex64::norm_sqr).sum();
        let n1: f64 = one.iter().map(Complex64::norm_sqr).sum();
        let overlap: Complex64 = zero.iter().zip(&one).map(|(a, b)| a.conj() * *b).sum();
        if n0 * n1 - overlap.norm_sqr() > SEPARABILITY_TOLERANCE {
            return Err(SimError::NotSeparable(qubit));
        }

        let (kept, norm) = if n0 >= n1 { (zero, n0) } else { (one, n1) };
        let scale = norm.sqrt();
        let reduced = kept.into_iter().map(|a| a / scale).collect();
        self.state = Statevector::from_amplitudes(reduced);
        self.labels.remove(pos);
        trace!("traced out {} ({} qubits left)", qubit, self.labels.len());
        Ok(())
    }

    fn tensor_in(&mut self, qubit: QubitId, fiducial: &[Complex64; 2]) -> SimResult<()> {
        if self.labels.contains(&qubit) {
            return Err(SimError::InvalidState(format!("qubit {qubit} is already present")));
        }
        let amps = self.state.amplitudes();
        let expanded = fiducial
            .iter()
            .flat_map(|f| amps.iter().map(move |a| *f * *a))
            .collect();
        self.state = Statevector::from_amplitudes(expanded);
        self.labels.push(qubit);
        Ok(())
    }

    fn extract_subsystem(&self, qubits: &[QubitId]) -> SimResult<QuantumState> {
        let mut reduced = self.clone();
        let others: Vec<QubitId> = self
            .labels
            .iter()
            .copied()
            .filter(|l| !qubits.contains(l))
            .collect();
        for q in others {
            reduced.trace_out(q)?;
        }
        QuantumState::from_vector(reduced.labels, reduced.state.into_amplitudes())?.permuted(qubits)
    }
}
