//! Error types for pattern compilation.

use mbqc_ir::{IrError, QubitId};
use mbqc_pattern::{GraphError, PatternError};
use thiserror::Error;

/// Errors raised while compiling a circuit into a measurement pattern.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompileError {
    /// The circuit record is malformed.
    #[error("Invalid circuit: {0}")]
    InvalidCircuit(#[from] IrError),

    /// The gate has no measurement-pattern substitution.
    #[error("Gate '{gate_name}' at instruction #{index} has no measurement pattern")]
    UnsupportedGate {
        /// Name of the gate.
        gate_name: String,
        /// Position in the circuit.
        index: usize,
    },

    /// The dependency graph has a cycle.
    #[error("Cyclic dependency: {remaining} commands could not be ordered")]
    CyclicDependency {
        /// Number of commands left unordered.
        remaining: usize,
    },

    /// A domain reads the outcome of a qubit the pattern never measures.
    #[error("Command #{index} reads the outcome of {qubit}, which is never measured")]
    UnknownSignal {
        /// Position of the reading command.
        index: usize,
        /// The unmeasured qubit.
        qubit: QubitId,
    },

    /// The command order reads an outcome before it is written, or acts on
    /// a qubit that is absent at that point.
    #[error("Command #{index} violates execution order on {qubit}")]
    DependencyViolation {
        /// Position of the offending command.
        index: usize,
        /// The qubit involved.
        qubit: QubitId,
    },

    /// A pass produced an invalid pattern.
    #[error("Pattern error: {0}")]
    Pattern(#[from] PatternError),

    /// Malformed graph operation.
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),
}

/// Result type for compilation operations.
pub type CompileResult<T> = Result<T, CompileError>;
