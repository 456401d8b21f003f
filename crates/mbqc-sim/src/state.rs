//! Quantum states exchanged with the runtime.

use std::f64::consts::FRAC_1_SQRT_2;

use mbqc_ir::QubitId;
use ndarray::Array2;
use num_complex::Complex64;
use rand::Rng;
use rustc_hash::FxHashSet;

use crate::error::{SimError, SimResult};
use crate::statevector::scatter_bits;

/// Tolerance on the norm or trace of a state handed in from outside.
const NORM_TOLERANCE: f64 = 1e-8;

/// Numeric payload of a [`QuantumState`].
#[derive(Debug, Clone, PartialEq)]
pub enum StateData {
    /// Dense amplitude vector of length `2^n`.
    Vector(Vec<Complex64>),
    /// Density matrix of shape `2^n × 2^n`.
    Density(Array2<Complex64>),
}

/// A labelled state: basis index bit `k` belongs to `labels[k]`.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantumState {
    labels: Vec<QubitId>,
    data: StateData,
}

impl QuantumState {
    /// Build a pure state from amplitudes.
    pub fn from_vector(
        labels: impl IntoIterator<Item = QubitId>,
        amplitudes: Vec<Complex64>,
    ) -> SimResult<Self> {
        let labels = check_labels(labels)?;
        check_dimension(labels.len(), amplitudes.len())?;
        let norm: f64 = amplitudes.iter().map(Complex64::norm_sqr).sum();
        if (norm - 1.0).abs() > NORM_TOLERANCE {
            return Err(SimError::InvalidState(format!(
                "amplitudes have squared norm {norm}, expected 1"
            )));
        }
        Ok(Self {
            labels,
            data: StateData::Vector(amplitudes),
        })
    }

    /// Build a mixed state from a density matrix.
    ///
    /// The matrix must be square, Hermitian and of unit trace.
    pub fn from_density(
        labels: impl IntoIterator<Item = QubitId>,
        rho: Array2<Complex64>,
    ) -> SimResult<Self> {
        let labels = check_labels(labels)?;
        let (rows, cols) = rho.dim();
        if rows != cols {
            return Err(SimError::InvalidState(format!(
                "density matrix is {rows}x{cols}, expected a square matrix"
            )));
        }
        check_dimension(labels.len(), rows)?;

        let trace: Complex64 = rho.diag().sum();
        if (trace - Complex64::new(1.0, 0.0)).norm() > NORM_TOLERANCE {
            return Err(SimError::InvalidState(format!(
                "density matrix has trace {trace}, expected 1"
            )));
        }
        let hermitian = rho
            .indexed_iter()
            .all(|((i, j), v)| (*v - rho[[j, i]].conj()).norm() <= NORM_TOLERANCE);
        if !hermitian {
            return Err(SimError::InvalidState(
                "density matrix is not Hermitian".into(),
            ));
        }
        Ok(Self {
            labels,
            data: StateData::Density(rho),
        })
    }

    /// The all-zero product state |0…0⟩.
    pub fn zero(labels: impl IntoIterator<Item = QubitId>) -> SimResult<Self> {
        Self::basis(labels, 0)
    }

    /// The computational basis state with the given index.
    pub fn basis(labels: impl IntoIterator<Item = QubitId>, index: usize) -> SimResult<Self> {
        let labels = check_labels(labels)?;
        let dim = 1usize << labels.len();
        if index >= dim {
            return Err(SimError::InvalidState(format!(
                "basis index {index} out of range for {} qubits",
                labels.len()
            )));
        }
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); dim];
        amplitudes[index] = Complex64::new(1.0, 0.0);
        Ok(Self {
            labels,
            data: StateData::Vector(amplitudes),
        })
    }

    /// The product state |+…+⟩.
    pub fn plus(labels: impl IntoIterator<Item = QubitId>) -> SimResult<Self> {
        let labels = check_labels(labels)?;
        let dim = 1usize << labels.len();
        let amp = FRAC_1_SQRT_2.powi(i32::try_from(labels.len()).unwrap_or(i32::MAX));
        Ok(Self {
            labels,
            data: StateData::Vector(vec![Complex64::new(amp, 0.0); dim]),
        })
    }

    /// The zero-qubit state, used as input for patterns without inputs.
    pub fn empty() -> Self {
        Self {
            labels: vec![],
            data: StateData::Vector(vec![Complex64::new(1.0, 0.0)]),
        }
    }

    /// A random pure state.
    ///
    /// Real and imaginary parts are drawn from standard normals via
    /// Box-Muller, which makes the normalized vector Haar distributed.
    pub fn random<R: Rng>(
        labels: impl IntoIterator<Item = QubitId>,
        rng: &mut R,
    ) -> SimResult<Self> {
        let labels = check_labels(labels)?;
        let dim = 1usize << labels.len();
        let mut amplitudes: Vec<Complex64> = (0..dim)
            .map(|_| {
                let u1: f64 = 1.0 - rng.r#gen::<f64>();
                let u2: f64 = rng.r#gen::<f64>();
                Complex64::from_polar((-2.0 * u1.ln()).sqrt(), std::f64::consts::TAU * u2)
            })
            .collect();
        let norm = amplitudes.iter().map(Complex64::norm_sqr).sum::<f64>().sqrt();
        for amp in &mut amplitudes {
            *amp /= norm;
        }
        Ok(Self {
            labels,
            data: StateData::Vector(amplitudes),
        })
    }

    /// Qubit labels in bit order.
    pub fn labels(&self) -> &[QubitId] {
        &self.labels
    }

    /// Number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.labels.len()
    }

    /// The numeric payload.
    pub fn data(&self) -> &StateData {
        &self.data
    }

    /// Consume the state and return its parts.
    pub fn into_parts(self) -> (Vec<QubitId>, StateData) {
        (self.labels, self.data)
    }

    /// Amplitudes, if the state is stored as a vector.
    pub fn amplitudes(&self) -> Option<&[Complex64]> {
        match &self.data {
            StateData::Vector(v) => Some(v),
            StateData::Density(_) => None,
        }
    }

    /// Density matrix, if the state is stored as one.
    pub fn density_matrix(&self) -> Option<&Array2<Complex64>> {
        match &self.data {
            StateData::Vector(_) => None,
            StateData::Density(rho) => Some(rho),
        }
    }

    /// Whether the state is stored as a vector.
    pub fn is_vector(&self) -> bool {
        matches!(self.data, StateData::Vector(_))
    }

    /// Convert to density-matrix form `|ψ⟩⟨ψ|`.
    pub fn to_density(&self) -> Self {
        let rho = match &self.data {
            StateData::Vector(v) => outer(v),
            StateData::Density(rho) => rho.clone(),
        };
        Self {
            labels: self.labels.clone(),
            data: StateData::Density(rho),
        }
    }

    /// The same numbers under new labels.
    pub fn relabeled(self, labels: impl IntoIterator<Item = QubitId>) -> SimResult<Self> {
        let labels = check_labels(labels)?;
        if labels.len() != self.labels.len() {
            return Err(SimError::StateMismatch(format!(
                "cannot relabel {} qubits with {} labels",
                self.labels.len(),
                labels.len()
            )));
        }
        Ok(Self {
            labels,
            data: self.data,
        })
    }

    /// Reorder the qubits so that bit `j` belongs to `order[j]`.
    ///
    /// `order` must be a permutation of the current labels.
    pub fn permuted(&self, order: &[QubitId]) -> SimResult<Self> {
        check_labels(order.iter().copied())?;
        let positions = self.positions_of(order)?;
        if positions.len() != self.labels.len() {
            return Err(SimError::StateMismatch(format!(
                "permutation names {} of {} qubits",
                positions.len(),
                self.labels.len()
            )));
        }
        let dim = 1usize << positions.len();
        let data = match &self.data {
            StateData::Vector(v) => {
                StateData::Vector((0..dim).map(|i| v[scatter_bits(i, &positions)]).collect())
            }
            StateData::Density(rho) => StateData::Density(Array2::from_shape_fn(
                (dim, dim),
                |(i, j)| rho[[scatter_bits(i, &positions), scatter_bits(j, &positions)]],
            )),
        };
        Ok(Self {
            labels: order.to_vec(),
            data,
        })
    }

    /// Fidelity with another state of the same width.
    ///
    /// States are compared bit by bit, so labels may differ. Global phase
    /// is ignored. For two mixed states this is the overlap `Tr(ρσ)`, which
    /// equals the fidelity whenever one of them is pure.
    pub fn fidelity(&self, other: &Self) -> SimResult<f64> {
        if self.num_qubits() != other.num_qubits() {
            return Err(SimError::StateMismatch(format!(
                "cannot compare a {}-qubit state with a {}-qubit state",
                self.num_qubits(),
                other.num_qubits()
            )));
        }
        let value = match (&self.data, &other.data) {
            (StateData::Vector(a), StateData::Vector(b)) => a
                .iter()
                .zip(b)
                .map(|(x, y)| x.conj() * y)
                .sum::<Complex64>()
                .norm_sqr(),
            (StateData::Vector(psi), StateData::Density(rho))
            | (StateData::Density(rho), StateData::Vector(psi)) => expectation(rho, psi),
            (StateData::Density(a), StateData::Density(b)) => {
                // Tr(AB) = Σ_ij A_ij B_ji
                a.indexed_iter()
                    .map(|((i, j), v)| *v * b[[j, i]])
                    .sum::<Complex64>()
                    .re
            }
        };
        Ok(value)
    }

    /// Bit positions of the given labels.
    pub(crate) fn positions_of(&self, qubits: &[QubitId]) -> SimResult<Vec<usize>> {
        positions_of(&self.labels, qubits)
    }
}

/// Bit positions of `qubits` within `labels`.
pub(crate) fn positions_of(labels: &[QubitId], qubits: &[QubitId]) -> SimResult<Vec<usize>> {
    qubits
        .iter()
        .map(|q| {
            labels
                .iter()
                .position(|l| l == q)
                .ok_or(SimError::QubitNotPresent(*q))
        })
        .collect()
}

/// `|ψ⟩⟨ψ|`.
pub(crate) fn outer(psi: &[Complex64]) -> Array2<Complex64> {
    Array2::from_shape_fn((psi.len(), psi.len()), |(i, j)| psi[i] * psi[j].conj())
}

/// `⟨ψ|ρ|ψ⟩`.
fn expectation(rho: &Array2<Complex64>, psi: &[Complex64]) -> f64 {
    rho.indexed_iter()
        .map(|((i, j), v)| psi[i].conj() * *v * psi[j])
        .sum::<Complex64>()
        .re
}

fn check_labels(labels: impl IntoIterator<Item = QubitId>) -> SimResult<Vec<QubitId>> {
    let labels: Vec<QubitId> = labels.into_iter().collect();
    let mut seen = FxHashSet::default();
    for q in &labels {
        if !seen.insert(*q) {
            return Err(SimError::InvalidState(format!("qubit {q} is labelled twice")));
        }
    }
    if labels.len() >= usize::BITS as usize {
        return Err(SimError::InvalidState(format!(
            "{} qubits exceed the addressable dimension",
            labels.len()
        )));
    }
    Ok(labels)
}

fn check_dimension(num_qubits: usize, len: usize) -> SimResult<()> {
    let expected = 1usize << num_qubits;
    if len != expected {
        return Err(SimError::InvalidState(format!(
            "{num_qubits} qubits need dimension {expected}, got {len}"
        )));
    }
    Ok(())
}
