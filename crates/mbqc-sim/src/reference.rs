//! Gate-by-gate reference simulation.
//!
//! Runs a circuit directly on the state-vector kernels so that pattern
//! outputs can be compared against the intended unitary.

use mbqc_ir::{Circuit, QubitId};
use tracing::debug;

use crate::error::{SimError, SimResult};
use crate::state::QuantumState;
use crate::statevector::Statevector;

/// Apply a circuit to an input state.
///
/// Wire `w` of the circuit acts on bit `w` of the input, whatever its label.
/// The result carries the labels `q0..q{n-1}`.
pub fn simulate_circuit(circuit: &Circuit, input: &QuantumState) -> SimResult<QuantumState> {
    circuit.validate()?;
    if input.num_qubits() != circuit.num_qubits() {
        return Err(SimError::StateMismatch(format!(
            "circuit '{}' has {} qubits, input state has {}",
            circuit.name(),
            circuit.num_qubits(),
            input.num_qubits()
        )));
    }
    let amplitudes = input.amplitudes().ok_or_else(|| {
        SimError::InvalidState("reference simulation needs a pure state vector".into())
    })?;

    let mut state = Statevector::from_amplitudes(amplitudes.to_vec());
    for inst in circuit.instructions() {
        let gate = inst
            .as_standard()
            .ok_or_else(|| SimError::UnsupportedGate(inst.name().to_string()))?;
        let qubits: Vec<usize> = inst.qubits.iter().map(|q| q.index()).collect();
        state.apply_standard_gate(gate, &qubits)?;
    }
    debug!(
        "Reference simulation of '{}': {} gates on {} qubits",
        circuit.name(),
        circuit.len(),
        circuit.num_qubits()
    );

    QuantumState::from_vector(circuit.qubits(), state.into_amplitudes())
}

/// Apply a circuit to |0…0⟩.
pub fn run_circuit(circuit: &Circuit) -> SimResult<QuantumState> {
    let labels: Vec<QubitId> = circuit.qubits().collect();
    simulate_circuit(circuit, &QuantumState::zero(labels)?)
}
