//! Signal shifting.

use mbqc_ir::QubitId;
use mbqc_pattern::{Command, Domain, Pattern, Plane};
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::error::CompileResult;
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;

/// Removes the π-shift domain from measurements.
///
/// A π shift of the measurement angle only swaps the two outcomes, so a
/// measurement can drop its shift domain (t for XY, s for YZ) provided every
/// later reader of its outcome `s_i` reads `s_i ⊕ parity(domain)` instead.
/// XZ measurements keep both domains.
pub struct SignalShift;

/// Number of measurements whose shift domain was moved downstream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignalShiftStats {
    /// Shifted measurements.
    pub shifted: usize,
}

impl Pass for SignalShift {
    fn name(&self) -> &'static str {
        "signal_shift"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn should_run(&self, _pattern: &Pattern, properties: &PropertySet) -> bool {
        properties.options.signal_shifting
    }

    fn run(&self, pattern: &mut Pattern, properties: &mut PropertySet) -> CompileResult<()> {
        let (commands, stats) = shift_signals(pattern.commands());
        debug!("Signal shifting moved {} domains", stats.shifted);
        pattern.set_commands(commands)?;
        properties.insert(stats);
        Ok(())
    }
}

/// Rewrite domains through the substitution map.
fn expand(domain: &Domain, substitutions: &FxHashMap<QubitId, Domain>) -> Domain {
    let mut expanded = Domain::new();
    for q in domain.iter() {
        expanded.toggle(q);
        if let Some(extra) = substitutions.get(&q) {
            expanded ^= extra;
        }
    }
    expanded
}

/// Apply signal shifting to a command list in execution order.
pub fn shift_signals(commands: &[Command]) -> (Vec<Command>, SignalShiftStats) {
    let mut substitutions: FxHashMap<QubitId, Domain> = FxHashMap::default();
    let mut stats = SignalShiftStats::default();

    let shifted = commands
        .iter()
        .map(|cmd| match cmd {
            Command::Entangle(_, _) => cmd.clone(),
            Command::Correct(c) => {
                let mut c = c.clone();
                c.domain = expand(&c.domain, &substitutions);
                Command::Correct(c)
            }
            Command::Measure(m) => {
                let mut m = m.clone();
                m.s_domain = expand(&m.s_domain, &substitutions);
                m.t_domain = expand(&m.t_domain, &substitutions);

                let shift = match m.plane {
                    Plane::XY => Some(&mut m.t_domain),
                    Plane::YZ => Some(&mut m.s_domain),
                    Plane::XZ => None,
                };
                if let Some(domain) = shift.filter(|d| !d.is_empty()) {
                    substitutions.insert(m.qubit, std::mem::take(domain));
                    stats.shifted += 1;
                }
                Command::Measure(m)
            }
        })
        .collect();

    (shifted, stats)
}
