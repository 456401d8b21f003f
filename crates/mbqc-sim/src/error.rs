//! Error types for the sim crate.

use mbqc_ir::QubitId;
use mbqc_pattern::PatternError;
use thiserror::Error;

use crate::runtime::RuntimeState;

/// Errors produced while preparing or executing a pattern.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SimError {
    /// A command read an outcome that was not recorded yet.
    #[error("Command #{index} reads the outcome of {qubit} before it was measured")]
    DependencyOrder {
        /// Position of the command.
        index: usize,
        /// The unmeasured qubit.
        qubit: QubitId,
    },

    /// The labels of a state do not fit where it is used.
    #[error("State mismatch: {0}")]
    StateMismatch(String),

    /// Operation called in the wrong lifecycle state.
    #[error("Cannot {operation} while the simulator is {state}")]
    InvalidRuntimeState {
        /// The rejected operation.
        operation: &'static str,
        /// The lifecycle state at the time of the call.
        state: RuntimeState,
    },

    /// Malformed amplitudes or density matrix.
    #[error("Invalid quantum state: {0}")]
    InvalidState(String),

    /// Qubit cannot be removed from a pure state without losing information.
    #[error("Qubit {0} is entangled with the rest of the register and cannot be traced out")]
    NotSeparable(QubitId),

    /// Qubit is not part of the current register.
    #[error("Qubit {0} is not present in the register")]
    QubitNotPresent(QubitId),

    /// Projection onto a branch with vanishing probability.
    #[error("Projection of {qubit} has probability {probability:e}")]
    ZeroProbability {
        /// The projected qubit.
        qubit: QubitId,
        /// Probability of the requested branch.
        probability: f64,
    },

    /// Outcome requested for a qubit that was never measured.
    #[error("No outcome recorded for {0}")]
    MissingOutcome(QubitId),

    /// Gate without a reference kernel.
    #[error("Gate '{0}' is not supported by the reference simulator")]
    UnsupportedGate(String),

    /// Circuit failed validation.
    #[error("Circuit IR error: {0}")]
    Ir(#[from] mbqc_ir::IrError),

    /// Bad configuration value.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pattern bookkeeping failure.
    #[error("Pattern error: {0}")]
    Pattern(#[from] PatternError),
}

/// Result type for simulation operations.
pub type SimResult<T> = Result<T, SimError>;
