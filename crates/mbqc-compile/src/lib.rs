//! MBQC Pattern Compilation
//!
//! This crate compiles gate-level circuits into measurement patterns. It
//! follows a pass-based architecture: the [`Transpiler`] substitutes every
//! gate with its measurement-calculus fragment, then a [`PassManager`] runs
//! the pattern passes.
//!
//! # Architecture
//!
//! ```text
//! Circuit
//!    │
//!    ▼
//! Transpiler ── J(α) fragments, CZ as E, Swap as relabel
//!    │
//!    ▼
//! PassManager ◄── PropertySet (options, pass statistics)
//!    │
//!    ├── Standardize            Pauli-frame propagation
//!    ├── SignalShift            drop π-shift domains
//!    ├── Simplify               Pauli angles, merges, cancellations
//!    ├── ResolveDependencies    DAG + stable topological order
//!    └── DependencyVerification static order audit
//!    │
//!    ▼
//! Pattern
//! ```
//!
//! # Example
//!
//! ```rust
//! use mbqc_compile::{CompileOptions, Transpiler};
//! use mbqc_ir::{Circuit, QubitId};
//!
//! let mut circuit = Circuit::with_size("bell", 2);
//! circuit.h(QubitId(0)).unwrap();
//! circuit.cx(QubitId(0), QubitId(1)).unwrap();
//!
//! let pattern = Transpiler::new(CompileOptions::default())
//!     .compile(&circuit)
//!     .unwrap();
//! assert_eq!(pattern.outputs().len(), 2);
//! ```
//!
//! # Custom Passes
//!
//! ```rust
//! use mbqc_compile::{CompileResult, Pass, PassKind, PropertySet};
//! use mbqc_pattern::Pattern;
//!
//! struct CountMeasurements;
//!
//! impl Pass for CountMeasurements {
//!     fn name(&self) -> &str { "count_measurements" }
//!     fn kind(&self) -> PassKind { PassKind::Analysis }
//!
//!     fn run(&self, pattern: &mut Pattern, props: &mut PropertySet) -> CompileResult<()> {
//!         props.insert(pattern.num_measurements());
//!         Ok(())
//!     }
//! }
//! ```

pub mod error;
pub mod manager;
pub mod options;
pub mod pass;
pub mod property;
pub mod transpiler;
pub mod unitary;

// Built-in passes
pub mod passes;

pub use error::{CompileError, CompileResult};
pub use manager::{PassManager, PassManagerBuilder};
pub use options::CompileOptions;
pub use pass::{Pass, PassKind};
pub use passes::{resolve_order, verify_order};
pub use property::PropertySet;
pub use transpiler::{Transpiler, compile};
pub use unitary::Unitary2x2;
