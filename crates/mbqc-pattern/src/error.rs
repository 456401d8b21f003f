//! Error types for the pattern crate.

use mbqc_ir::QubitId;
use thiserror::Error;

/// Errors raised by graph-state operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum GraphError {
    /// Qubit is not part of the graph.
    #[error("Qubit {0} is not part of the graph")]
    UnknownQubit(QubitId),

    /// Edge from a qubit to itself.
    #[error("Self-loop on qubit {0} is not allowed")]
    SelfLoop(QubitId),

    /// Qubit added twice.
    #[error("Qubit {0} is already part of the graph")]
    DuplicateQubit(QubitId),
}

/// Result type for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;

/// Errors raised while building or loading a pattern.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PatternError {
    /// Malformed graph operation.
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    /// A qubit appears twice in the input or output list.
    #[error("Qubit {qubit} is listed twice among the {role} qubits")]
    DuplicateQubit {
        /// The repeated qubit.
        qubit: QubitId,
        /// "input" or "output".
        role: &'static str,
    },

    /// Command acts on a qubit that is neither an input nor entangled earlier.
    #[error("Command #{index} acts on {qubit}, which is not an input and was never entangled before")]
    NotIntroduced {
        /// Position of the command.
        index: usize,
        /// The unknown qubit.
        qubit: QubitId,
    },

    /// Command acts on a qubit that was already measured.
    #[error("Command #{index} acts on {qubit}, which was already measured")]
    ActsOnMeasured {
        /// Position of the command.
        index: usize,
        /// The measured qubit.
        qubit: QubitId,
    },

    /// An output qubit is measured by the pattern.
    #[error("Output qubit {0} is measured by the pattern")]
    OutputMeasured(QubitId),

    /// An output qubit never appears in the pattern.
    #[error("Output qubit {0} is not an input and is never entangled")]
    UnknownOutput(QubitId),

    /// A non-output qubit is left unmeasured.
    #[error("Qubit {0} is neither measured nor declared as output")]
    UnmeasuredQubit(QubitId),

    /// Outcome written twice.
    #[error("Outcome of {0} was already recorded")]
    OutcomeAlreadyRecorded(QubitId),

    /// Outcome bit outside {0, 1}.
    #[error("Outcome of {qubit} must be 0 or 1, got {bit}")]
    InvalidOutcome {
        /// The measured qubit.
        qubit: QubitId,
        /// The rejected value.
        bit: u8,
    },

    /// JSON (de)serialization failure.
    #[error("Pattern JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for pattern operations.
pub type PatternResult<T> = Result<T, PatternError>;
