//! Local simplifications of standardized patterns.

use mbqc_ir::QubitId;
use mbqc_pattern::{Command, CorrectionKind, Pattern, Plane};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use super::standardize::pair_key;
use crate::error::CompileResult;
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;

/// Counts of the rewrites performed by [`Simplify`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimplifyStats {
    /// Sign domains dropped from Pauli-angle measurements.
    pub pauli_domains_dropped: usize,
    /// Corrections removed (empty domain, merged or cancelled).
    pub corrections_removed: usize,
    /// Entanglements removed in cancelling pairs.
    pub entanglements_removed: usize,
}

/// Local rewrites that keep the pattern's semantics:
///
/// - a measurement whose angle is a multiple of π ignores the sign flip, so
///   its sign domain is cleared (s for XY, t for YZ and XZ)
/// - corrections with an empty domain are dropped
/// - two corrections of the same kind on a qubit with nothing acting on that
///   qubit in between merge into one at the later position
/// - two entanglements of the same pair with no measurement or correction on
///   either qubit in between cancel, unless the first one introduces a qubit
pub struct Simplify;

impl Pass for Simplify {
    fn name(&self) -> &'static str {
        "simplify"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn should_run(&self, _pattern: &Pattern, properties: &PropertySet) -> bool {
        properties.options.simplify
    }

    fn run(&self, pattern: &mut Pattern, properties: &mut PropertySet) -> CompileResult<()> {
        let (commands, stats) = simplify(pattern);
        debug!(
            "Simplified: {} Pauli domains, {} corrections, {} entanglements removed",
            stats.pauli_domains_dropped, stats.corrections_removed, stats.entanglements_removed
        );
        pattern.set_commands(commands)?;
        properties.insert(stats);
        Ok(())
    }
}

/// Simplify a pattern's command list.
pub fn simplify(pattern: &Pattern) -> (Vec<Command>, SimplifyStats) {
    let mut stats = SimplifyStats::default();
    let mut out: Vec<Option<Command>> = Vec::with_capacity(pattern.commands().len());

    let mut present: FxHashSet<QubitId> = pattern.inputs().iter().copied().collect();
    let mut open_corrections: FxHashMap<(QubitId, CorrectionKind), usize> = FxHashMap::default();
    let mut open_pairs: FxHashMap<(QubitId, QubitId), usize> = FxHashMap::default();

    for cmd in pattern.commands() {
        match cmd {
            Command::Entangle(a, b) => {
                close_corrections(&mut open_corrections, *a);
                close_corrections(&mut open_corrections, *b);

                let introduces = !present.contains(a) || !present.contains(b);
                present.insert(*a);
                present.insert(*b);
                if !introduces {
                    let key = pair_key(*a, *b);
                    if let Some(first) = open_pairs.remove(&key) {
                        out[first] = None;
                        stats.entanglements_removed += 2;
                        continue;
                    }
                    open_pairs.insert(key, out.len());
                }
                out.push(Some(cmd.clone()));
            }
            Command::Measure(m) => {
                close_corrections(&mut open_corrections, m.qubit);
                close_pairs(&mut open_pairs, m.qubit);
                present.remove(&m.qubit);

                let mut m = m.clone();
                if Plane::is_pauli_angle(m.angle) {
                    let sign = match m.plane {
                        Plane::XY => &mut m.s_domain,
                        Plane::YZ | Plane::XZ => &mut m.t_domain,
                    };
                    if !sign.is_empty() {
                        sign.clear();
                        stats.pauli_domains_dropped += 1;
                    }
                }
                out.push(Some(Command::Measure(m)));
            }
            Command::Correct(c) => {
                close_pairs(&mut open_pairs, c.qubit);
                let other = match c.kind {
                    CorrectionKind::X => CorrectionKind::Z,
                    CorrectionKind::Z => CorrectionKind::X,
                };
                open_corrections.remove(&(c.qubit, other));

                let mut c = c.clone();
                if let Some(first) = open_corrections.remove(&(c.qubit, c.kind)) {
                    if let Some(Command::Correct(prev)) = out[first].take() {
                        c.domain ^= &prev.domain;
                    }
                    stats.corrections_removed += 1;
                }
                if c.domain.is_empty() {
                    stats.corrections_removed += 1;
                    continue;
                }
                open_corrections.insert((c.qubit, c.kind), out.len());
                out.push(Some(Command::Correct(c)));
            }
        }
    }

    (out.into_iter().flatten().collect(), stats)
}

fn close_corrections(open: &mut FxHashMap<(QubitId, CorrectionKind), usize>, qubit: QubitId) {
    open.remove(&(qubit, CorrectionKind::X));
    open.remove(&(qubit, CorrectionKind::Z));
}

fn close_pairs(open: &mut FxHashMap<(QubitId, QubitId), usize>, qubit: QubitId) {
    open.retain(|&(a, b), _| a != qubit && b != qubit);
}

#[cfg(test)]
mod tests {
    use super::*;
    use mbqc_pattern::{Correction, Domain, Measurement};
    use std::f64::consts::PI;

    fn q(i: u32) -> QubitId {
        QubitId(i)
    }

    fn pattern(commands: Vec<Command>) -> Pattern {
        Pattern::new(vec![q(0), q(1)], vec![q(1)], commands).unwrap()
    }

    #[test]
    fn test_pauli_measurement_drops_sign_domain() {
        let p = Pattern::new(
            vec![q(0), q(1), q(2)],
            vec![q(2)],
            vec![
                Measurement::new(q(0), 0.4).into(),
                Measurement::new(q(1), PI)
                    .with_s_domain(Domain::single(q(0)))
                    .into(),
            ],
        )
        .unwrap();
        let (commands, stats) = simplify(&p);
        assert_eq!(stats.pauli_domains_dropped, 1);
        assert_eq!(commands[1], Measurement::new(q(1), PI).into());
    }

    #[test]
    fn test_non_pauli_measurement_untouched() {
        let m: Command = Measurement::new(q(0), 0.5)
            .with_s_domain(Domain::single(q(1)))
            .into();
        let p = Pattern::new(
            vec![q(0), q(1)],
            vec![],
            vec![Measurement::new(q(1), 0.0).into(), m.clone()],
        )
        .unwrap();
        let (commands, _) = simplify(&p);
        assert_eq!(commands[1], m);
    }

    #[test]
    fn test_corrections_merge_and_vanish() {
        let p = pattern(vec![
            Measurement::new(q(0), 0.3).into(),
            Correction::x(q(1), Domain::single(q(0))).into(),
            Correction::x(q(1), Domain::single(q(0))).into(),
            Correction::z(q(1), Domain::new()).into(),
        ]);
        let (commands, stats) = simplify(&p);
        assert_eq!(commands.len(), 1);
        assert_eq!(stats.corrections_removed, 3);
    }

    #[test]
    fn test_merge_lands_at_later_position() {
        let p = Pattern::new(
            vec![q(0), q(1), q(2)],
            vec![q(2)],
            vec![
                Measurement::new(q(0), 0.3).into(),
                Correction::x(q(2), Domain::single(q(0))).into(),
                Measurement::new(q(1), 0.3).into(),
                Correction::x(q(2), Domain::single(q(1))).into(),
            ],
        )
        .unwrap();
        let (commands, _) = simplify(&p);
        assert_eq!(commands.len(), 3);
        let merged: Domain = [q(0), q(1)].into_iter().collect();
        assert_eq!(commands[2], Correction::x(q(2), merged).into());
    }

    #[test]
    fn test_intervening_command_blocks_merge() {
        let p = pattern(vec![
            Measurement::new(q(0), 0.3).into(),
            Correction::x(q(1), Domain::single(q(0))).into(),
            Correction::z(q(1), Domain::single(q(0))).into(),
            Correction::x(q(1), Domain::single(q(0))).into(),
        ]);
        let (commands, stats) = simplify(&p);
        assert_eq!(commands.len(), 4);
        assert_eq!(stats, SimplifyStats::default());
    }

    #[test]
    fn test_entanglement_pair_cancels() {
        let p = pattern(vec![
            Command::entangle(q(0), q(1)),
            Command::entangle(q(1), q(0)),
            Measurement::new(q(0), 0.0).into(),
        ]);
        let (commands, stats) = simplify(&p);
        assert_eq!(stats.entanglements_removed, 2);
        assert_eq!(commands.len(), 1);
    }

    #[test]
    fn test_measurement_between_pairs_blocks_cancel() {
        let p = Pattern::new(
            vec![q(0), q(1), q(2)],
            vec![q(1), q(2)],
            vec![
                Command::entangle(q(1), q(2)),
                Correction::x(q(1), Domain::new()).into(),
                Command::entangle(q(1), q(2)),
                Measurement::new(q(0), 0.0).into(),
            ],
        )
        .unwrap();
        let (commands, stats) = simplify(&p);
        assert_eq!(stats.entanglements_removed, 0);
        assert_eq!(commands.iter().filter(|c| c.is_entangle()).count(), 2);
    }
}
