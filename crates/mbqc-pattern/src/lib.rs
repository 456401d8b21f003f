//! Measurement Patterns
//!
//! This crate holds the intermediate representation of measurement-based
//! quantum computation: open graph states, EMC commands (entanglement,
//! measurement, correction), the append-only outcome table and the validated
//! [`Pattern`] produced by the compiler and consumed by the runtime.
//!
//! # Example: The Elementary `J(α)` Pattern
//!
//! ```rust
//! use mbqc_ir::QubitId;
//! use mbqc_pattern::{Command, Correction, Domain, Measurement, Pattern};
//!
//! let pattern = Pattern::new(
//!     vec![QubitId(0)],
//!     vec![QubitId(1)],
//!     vec![
//!         Command::entangle(QubitId(0), QubitId(1)),
//!         Measurement::new(QubitId(0), -0.25).into(),
//!         Correction::x(QubitId(1), Domain::single(QubitId(0))).into(),
//!     ],
//! )
//! .unwrap();
//!
//! assert_eq!(pattern.num_qubits(), 2);
//! assert_eq!(pattern.num_measurements(), 1);
//! ```
//!
//! # Conventions
//!
//! - `|±_θ⟩ = (|0⟩ ± e^{iθ}|1⟩)/√2`; outcome 0 selects `+`.
//! - A measurement's s-domain records pending X byproducts, its t-domain
//!   pending Z byproducts. See [`Plane::adapt`] for the adapted angles.

pub mod command;
pub mod error;
pub mod graph;
pub mod outcome;
pub mod pattern;

pub use command::{Command, Correction, CorrectionKind, Domain, Measurement, Plane, normalize_angle};
pub use error::{GraphError, GraphResult, PatternError, PatternResult};
pub use graph::{Basis, GraphState, QubitKind};
pub use outcome::OutcomeTable;
pub use pattern::Pattern;
