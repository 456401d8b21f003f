//! Static audit of a pattern's execution order.
//!
//! Runs last in the pipeline and catches any pass that left behind a
//! command reading an outcome too early.

use mbqc_ir::QubitId;
use mbqc_pattern::{Command, Pattern};
use rustc_hash::FxHashSet;
use tracing::debug;

use crate::error::{CompileError, CompileResult};
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;

/// Result of the order audit.
#[derive(Debug, Clone, Default)]
pub struct VerificationResult {
    /// Whether the audit passed.
    pub passed: bool,
    /// Number of commands checked.
    pub commands_checked: usize,
    /// Number of outcome reads checked.
    pub signals_checked: usize,
}

/// Check that a command list can execute in order.
///
/// For every command, each outcome it reads was written by a strictly
/// earlier measurement, and each qubit it acts on is present: an input or
/// entangled earlier, and not yet measured. Entanglement brings absent
/// qubits in.
pub fn verify_order(pattern: &Pattern) -> CompileResult<VerificationResult> {
    let mut present: FxHashSet<QubitId> = pattern.inputs().iter().copied().collect();
    let mut written: FxHashSet<QubitId> = FxHashSet::default();
    let mut signals_checked = 0;

    for (index, cmd) in pattern.commands().iter().enumerate() {
        for qubit in cmd.signals() {
            signals_checked += 1;
            if !written.contains(&qubit) {
                return Err(CompileError::DependencyViolation { index, qubit });
            }
        }

        match cmd {
            Command::Entangle(a, b) => {
                for &qubit in [a, b] {
                    if written.contains(&qubit) {
                        return Err(CompileError::DependencyViolation { index, qubit });
                    }
                    present.insert(qubit);
                }
            }
            Command::Measure(m) => {
                if !present.remove(&m.qubit) {
                    return Err(CompileError::DependencyViolation {
                        index,
                        qubit: m.qubit,
                    });
                }
                written.insert(m.qubit);
            }
            Command::Correct(c) => {
                if !present.contains(&c.qubit) {
                    return Err(CompileError::DependencyViolation {
                        index,
                        qubit: c.qubit,
                    });
                }
            }
        }
    }

    Ok(VerificationResult {
        passed: true,
        commands_checked: pattern.commands().len(),
        signals_checked,
    })
}

/// Analysis pass running [`verify_order`].
pub struct DependencyVerification;

impl Pass for DependencyVerification {
    fn name(&self) -> &'static str {
        "dependency_verification"
    }

    fn kind(&self) -> PassKind {
        PassKind::Analysis
    }

    fn should_run(&self, _pattern: &Pattern, properties: &PropertySet) -> bool {
        properties.options.verify
    }

    fn run(&self, pattern: &mut Pattern, properties: &mut PropertySet) -> CompileResult<()> {
        let result = verify_order(pattern)?;
        debug!(
            "Order audit passed: {} commands, {} signal reads",
            result.commands_checked, result.signals_checked
        );
        properties.insert(result);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mbqc_pattern::{Correction, Domain, Measurement};

    fn q(i: u32) -> QubitId {
        QubitId(i)
    }

    #[test]
    fn test_valid_order_passes() {
        let p = Pattern::new(
            vec![q(0)],
            vec![q(1)],
            vec![
                Command::entangle(q(0), q(1)),
                Measurement::new(q(0), 0.2).into(),
                Correction::x(q(1), Domain::single(q(0))).into(),
            ],
        )
        .unwrap();
        let result = verify_order(&p).unwrap();
        assert!(result.passed);
        assert_eq!(result.commands_checked, 3);
        assert_eq!(result.signals_checked, 1);
    }

    #[test]
    fn test_read_before_write_fails() {
        let p = Pattern::new(
            vec![q(0), q(1)],
            vec![],
            vec![
                Measurement::new(q(1), 0.2)
                    .with_t_domain(Domain::single(q(0)))
                    .into(),
                Measurement::new(q(0), 0.2).into(),
            ],
        )
        .unwrap();
        assert!(matches!(
            verify_order(&p),
            Err(CompileError::DependencyViolation {
                index: 0,
                qubit: QubitId(0)
            })
        ));
    }

    #[test]
    fn test_self_read_fails() {
        let p = Pattern::new(
            vec![q(0)],
            vec![],
            vec![Measurement::new(q(0), 0.2)
                .with_s_domain(Domain::single(q(0)))
                .into()],
        )
        .unwrap();
        assert!(verify_order(&p).is_err());
    }
}
