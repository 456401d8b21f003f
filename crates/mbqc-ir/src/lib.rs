//! MBQC Circuit Records
//!
//! This crate provides the gate-level input consumed by the measurement
//! pattern compiler: qubit identifiers, gate kinds and an ordered circuit.
//!
//! # Example: Building a Bell Circuit
//!
//! ```rust
//! use mbqc_ir::{Circuit, QubitId};
//!
//! let mut circuit = Circuit::with_size("bell_state", 2);
//! circuit.h(QubitId(0)).unwrap();
//! circuit.cx(QubitId(0), QubitId(1)).unwrap();
//!
//! assert_eq!(circuit.num_qubits(), 2);
//! assert_eq!(circuit.len(), 2);
//! ```
//!
//! # Supported Gates
//!
//! | Gate | Qubits | Description |
//! |------|--------|-------------|
//! | `H` | 1 | Hadamard gate |
//! | `X`, `Y`, `Z` | 1 | Pauli gates |
//! | `S`, `Sdg`, `T`, `Tdg` | 1 | Phase gates |
//! | `SX`, `SXdg` | 1 | sqrt(X) gates |
//! | `Rx`, `Ry`, `Rz`, `P` | 1 | Rotation gates |
//! | `U` | 1 | Universal single-qubit gate U(θ,φ,λ) |
//! | `CX`, `CZ` | 2 | Controlled-NOT and controlled-Z |
//! | `Swap` | 2 | SWAP gate |
//!
//! `CY`, `ISwap`, `CRz`, `RZZ`, `CCX`, `CSwap` and custom gates can be
//! represented but have no measurement-pattern substitution.

pub mod circuit;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod qubit;

pub use circuit::Circuit;
pub use error::{IrError, IrResult};
pub use gate::{CustomGate, Gate, GateKind, StandardGate};
pub use instruction::Instruction;
pub use qubit::QubitId;
