//! Pass trait and types for pattern passes.

use mbqc_pattern::Pattern;

use crate::error::CompileResult;
use crate::property::PropertySet;

/// The kind of pattern pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
    /// Reads the pattern, may write to the `PropertySet`.
    Analysis,
    /// Rewrites the command list.
    Transformation,
}

/// A pass over a measurement pattern.
///
/// Transformation passes replace the command list through
/// [`Pattern::set_commands`], which re-checks the structural invariants, so a
/// pass cannot leave behind a pattern that acts on absent qubits.
pub trait Pass: Send + Sync {
    /// Get the name of this pass.
    fn name(&self) -> &str;

    /// Get the kind of this pass.
    fn kind(&self) -> PassKind;

    /// Run the pass on the given pattern.
    fn run(&self, pattern: &mut Pattern, properties: &mut PropertySet) -> CompileResult<()>;

    /// Check if this pass should run based on current state.
    fn should_run(&self, _pattern: &Pattern, _properties: &PropertySet) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoopPass;

    impl Pass for NoopPass {
        fn name(&self) -> &'static str {
            "noop"
        }

        fn kind(&self) -> PassKind {
            PassKind::Analysis
        }

        fn run(&self, _pattern: &mut Pattern, _properties: &mut PropertySet) -> CompileResult<()> {
            Ok(())
        }
    }

    #[test]
    fn test_pass_kind() {
        let pass = NoopPass;
        assert_eq!(pass.kind(), PassKind::Analysis);
        assert_eq!(pass.name(), "noop");
    }
}
