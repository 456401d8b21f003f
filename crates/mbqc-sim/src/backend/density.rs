//! Mixed-state backend on ndarray density matrices.
//!
//! Measurements are not applied as the outcome-averaged channel. The runtime
//! samples an outcome from the Born rule, exactly as for the state-vector
//! backend, and this backend projects onto that branch. With the same seed
//! both backends therefore record the same outcomes; the density matrix only
//! adds support for mixed input states.

use mbqc_ir::QubitId;
use ndarray::{Array2, Axis};
use num_complex::Complex64;
use tracing::trace;

use super::{Backend, PROBABILITY_FLOOR, check_matrix, projector};
use crate::error::{SimError, SimResult};
use crate::state::{QuantumState, StateData, outer, positions_of};
use crate::statevector::{apply_matrix, insert_bit};

/// Density matrix `ρ` over the present qubits.
///
/// Every operation is a conjugation `ρ → AρA†`, computed column by column
/// and then row by row with the state-vector kernel. Tracing out is a
/// general partial trace.
#[derive(Debug, Clone)]
pub struct DensityMatrixBackend {
    labels: Vec<QubitId>,
    rho: Array2<Complex64>,
}

impl DensityMatrixBackend {
    /// The density matrix in bit order of [`Backend::labels`].
    pub fn density_matrix(&self) -> &Array2<Complex64> {
        &self.rho
    }

    /// `Tr(ρ²)`.
    pub fn purity(&self) -> f64 {
        self.rho
            .indexed_iter()
            .map(|((i, j), v)| (*v * self.rho[[j, i]]).re)
            .sum()
    }

    fn position(&self, qubit: QubitId) -> SimResult<usize> {
        self.labels
            .iter()
            .position(|&l| l == qubit)
            .ok_or(SimError::QubitNotPresent(qubit))
    }

    /// `ρ → AρA†` for a local operator `A` on bit positions.
    fn conjugate(&mut self, positions: &[usize], matrix: &Array2<Complex64>) {
        let mut buffer = Vec::with_capacity(self.rho.nrows());

        // A·ρ: the operator acts on every column.
        for mut column in self.rho.axis_iter_mut(Axis(1)) {
            buffer.clear();
            buffer.extend(column.iter().copied());
            apply_matrix(&mut buffer, positions, matrix);
            column.iter_mut().zip(&buffer).for_each(|(dst, src)| *dst = *src);
        }

        // (A·ρ)·A†: row i becomes conj(A)·row_i.
        let conj = matrix.mapv(|v| v.conj());
        for mut row in self.rho.axis_iter_mut(Axis(0)) {
            buffer.clear();
            buffer.extend(row.iter().copied());
            apply_matrix(&mut buffer, positions, &conj);
            row.iter_mut().zip(&buffer).for_each(|(dst, src)| *dst = *src);
        }
    }

    fn trace(&self) -> f64 {
        self.rho.diag().iter().map(|v| v.re).sum()
    }
}

impl Backend for DensityMatrixBackend {
    fn name(&self) -> &'static str {
        "density"
    }

    fn from_state(state: QuantumState) -> SimResult<Self> {
        let (labels, data) = state.into_parts();
        let rho = match data {
            StateData::Vector(psi) => outer(&psi),
            StateData::Density(rho) => rho,
        };
        Ok(Self { labels, rho })
    }

    fn labels(&self) -> &[QubitId] {
        &self.labels
    }

    fn apply_unitary(&mut self, qubits: &[QubitId], matrix: &Array2<Complex64>) -> SimResult<()> {
        check_matrix(qubits, matrix)?;
        let positions = positions_of(&self.labels, qubits)?;
        self.conjugate(&positions, matrix);
        Ok(())
    }

    fn outcome_probability(&self, qubit: QubitId, basis: &[Complex64; 2]) -> SimResult<f64> {
        let pos = self.position(qubit)?;
        let half = self.rho.nrows() / 2;
        // Tr(Pρ) = Σ_r Σ_ab conj(v_a) ρ[(r,a),(r,b)] v_b
        let mut probability = 0.0;
        for r in 0..half {
            for (a, va) in basis.iter().enumerate() {
                for (b, vb) in basis.iter().enumerate() {
                    let i = insert_bit(r, pos, a);
                    let j = insert_bit(r, pos, b);
                    probability += (va.conj() * self.rho[[i, j]] * *vb).re;
                }
            }
        }
        Ok(probability)
    }

    fn apply_projector(&mut self, qubit: QubitId, basis: &[Complex64; 2]) -> SimResult<f64> {
        let pos = self.position(qubit)?;
        self.conjugate(&[pos], &projector(basis));

        let probability = self.trace();
        if probability < PROBABILITY_FLOOR {
            return Err(SimError::ZeroProbability { qubit, probability });
        }
        self.rho.mapv_inplace(|v| v / probability);
        Ok(probability)
    }

    fn trace_out(&mut self, qubit: QubitId) -> SimResult<()> {
        let pos = self.position(qubit)?;
        let half = self.rho.nrows() / 2;
        let rho = &self.rho;
        let reduced = Array2::from_shape_fn((half, half), |(r, c)| {
            rho[[insert_bit(r, pos, 0), insert_bit(c, pos, 0)]]
                + rho[[insert_bit(r, pos, 1), insert_bit(c, pos, 1)]]
        });
        self.rho = reduced;
        self.labels.remove(pos);
        trace!("traced out {} ({} qubits left)", qubit, self.labels.len());
        Ok(())
    }

    fn tensor_in(&mut self, qubit: QubitId, fiducial: &[Complex64; 2]) -> SimResult<()> {
        if self.labels.contains(&qubit) {
            return Err(SimError::InvalidState(format!("qubit {qubit} is already present")));
        }
        let dim = self.rho.nrows();
        let rho = &self.rho;
        // The new qubit is the highest bit: ρ' = |f⟩⟨f| ⊗ ρ.
        let expanded = Array2::from_shape_fn((2 * dim, 2 * dim), |(i, j)| {
            fiducial[i / dim] * fiducial[j / dim].conj() * rho[[i % dim, j % dim]]
        });
        self.rho = expanded;
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
        QuantumState::from_density(reduced.labels, reduced.rho)?.permuted(qubits)
    }
}
