//! Built-in pattern passes, in pipeline order.

pub mod resolve;
pub mod signal_shift;
pub mod simplify;
pub mod standardize;
pub mod verification;

pub use resolve::{DependencyGraph, ResolveDependencies, ResolvedOrder, resolve_order};
pub use signal_shift::{SignalShift, SignalShiftStats, shift_signals};
pub use simplify::{Simplify, SimplifyStats, simplify};
pub use standardize::{Standardize, StandardizeStats, standardize};
pub use verification::{DependencyVerification, VerificationResult, verify_order};
