//! Numeric backends for the pattern runtime.
//!
//! A backend owns the register of currently present qubits. New qubits are
//! appended at the highest bit; removed qubits close the gap, so bit `k`
//! always belongs to `labels()[k]`.

pub mod density;
pub mod statevector;

use std::fmt;
use std::str::FromStr;

use mbqc_ir::QubitId;
use ndarray::{Array2, array};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::state::QuantumState;

pub use density::DensityMatrixBackend;
pub use statevector::StateVectorBackend;

/// Probability below which a projection is considered impossible.
pub const PROBABILITY_FLOOR: f64 = 1e-14;

/// Primitive operations the runtime needs from a state representation.
pub trait Backend: Sized {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Load a state.
    fn from_state(state: QuantumState) -> SimResult<Self>;

    /// Labels of the present qubits in bit order.
    fn labels(&self) -> &[QubitId];

    /// Number of present qubits.
    fn num_qubits(&self) -> usize {
        self.labels().len()
    }

    /// Whether the qubit is present.
    fn contains(&self, qubit: QubitId) -> bool {
        self.labels().contains(&qubit)
    }

    /// Apply a `2^k × 2^k` unitary; matrix bit `j` belongs to `qubits[j]`.
    fn apply_unitary(&mut self, qubits: &[QubitId], matrix: &Array2<Complex64>) -> SimResult<()>;

    /// Born probability of finding `qubit` in the state `basis`.
    fn outcome_probability(&self, qubit: QubitId, basis: &[Complex64; 2]) -> SimResult<f64>;

    /// Project `qubit` onto `basis` and renormalize.
    ///
    /// Returns the probability of the branch. Fails with
    /// [`SimError::ZeroProbability`] below [`PROBABILITY_FLOOR`].
    fn apply_projector(&mut self, qubit: QubitId, basis: &[Complex64; 2]) -> SimResult<f64>;

    /// Remove a qubit from the register.
    fn trace_out(&mut self, qubit: QubitId) -> SimResult<()>;

    /// Append a fresh qubit in the single-qubit state `fiducial`.
    fn tensor_in(&mut self, qubit: QubitId, fiducial: &[Complex64; 2]) -> SimResult<()>;

    /// The reduced state of `qubits`, in that order.
    fn extract_subsystem(&self, qubits: &[QubitId]) -> SimResult<QuantumState>;

    /// Controlled-Z between two present qubits.
    fn apply_cz(&mut self, a: QubitId, b: QubitId) -> SimResult<()> {
        self.apply_unitary(&[a, b], &cz())
    }

    /// Pauli X.
    fn apply_x(&mut self, qubit: QubitId) -> SimResult<()> {
        self.apply_unitary(&[qubit], &pauli_x())
    }

    /// Pauli Z.
    fn apply_z(&mut self, qubit: QubitId) -> SimResult<()> {
        self.apply_unitary(&[qubit], &pauli_z())
    }
}

/// Backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// [`StateVectorBackend`].
    #[default]
    Statevector,
    /// [`DensityMatrixBackend`].
    Density,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Statevector => write!(f, "statevector"),
            BackendKind::Density => write!(f, "density"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "statevector" | "sv" | "vector" => Ok(BackendKind::Statevector),
            "density" | "dm" | "densitymatrix" | "density_matrix" => Ok(BackendKind::Density),
            other => Err(SimError::Config(format!("unknown backend '{other}'"))),
        }
    }
}

/// The fiducial state |+⟩ of auxiliary qubits.
pub fn plus_state() -> [Complex64; 2] {
    let amp = Complex64::new(std::f64::consts::FRAC_1_SQRT_2, 0.0);
    [amp, amp]
}

fn cz() -> Array2<Complex64> {
    let one = Complex64::new(1.0, 0.0);
    let zero = Complex64::new(0.0, 0.0);
    array![
        [one, zero, zero, zero],
        [zero, one, zero, zero],
        [zero, zero, one, zero],
        [zero, zero, zero, -one],
    ]
}

fn pauli_x() -> Array2<Complex64> {
    let one = Complex64::new(1.0, 0.0);
    let zero = Complex64::new(0.0, 0.0);
    array![[zero, one], [one, zero]]
}

fn pauli_z() -> Array2<Complex64> {
    let one = Complex64::new(1.0, 0.0);
    let zero = Complex64::new(0.0, 0.0);
    array![[one, zero], [zero, -one]]
}

/// `|v⟩⟨v|` for a single-qubit vector.
pub(crate) fn projector(basis: &[Complex64; 2]) -> Array2<Complex64> {
    Array2::from_shape_fn((2, 2), |(i, j)| basis[i] * basis[j].conj())
}

/// Check that a matrix fits the number of target qubits.
pub(crate) fn check_matrix(qubits: &[QubitId], matrix: &Array2<Complex64>) -> SimResult<()> {
    let dim = 1usize << qubits.len();
    if matrix.dim() != (dim, dim) {
        let (rows, cols) = matrix.dim();
        return Err(SimError::InvalidState(format!(
            "{rows}x{cols} matrix applied to {} qubits",
            qubits.len()
        )));
    }
    for (i, q) in qubits.iter().enumerate() {
        if qubits[..i].contains(q) {
            return Err(SimError::InvalidState(format!(
                "qubit {q} appears twice among the targets"
            )));
        }
    }
    Ok(())
}
