//! Standardization by Pauli-frame propagation.

use mbqc_ir::QubitId;
use mbqc_pattern::{Command, Correction, CorrectionKind, Domain, Pattern};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use crate::error::CompileResult;
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;

/// What standardization did to the command list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StandardizeStats {
    /// Correction commands folded into the Pauli frame.
    pub absorbed_corrections: usize,
    /// Entanglement commands removed in cancelling pairs.
    pub cancelled_entanglements: usize,
    /// Corrections emitted on output qubits.
    pub output_corrections: usize,
}

/// Moves every correction to the end of the pattern.
///
/// Pending byproducts are tracked per qubit as an X and a Z domain. A
/// correction is XOR-ed into the frame; an entanglement commutes through it
/// by `E_ab X_a = X_a Z_b E_ab`; a measurement absorbs the X part into its
/// s-domain and the Z part into its t-domain. What remains on output qubits
/// is emitted as X then Z corrections after the last measurement.
///
/// Entanglements stay at their emission point unless
/// [`CompileOptions::hoist_entanglement`](crate::CompileOptions::hoist_entanglement)
/// is set. Two entanglements of the same pair cancel when neither of them
/// brings a qubit into the register.
pub struct Standardize;

impl Pass for Standardize {
    fn name(&self) -> &'static str {
        "standardize"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, pattern: &mut Pattern, properties: &mut PropertySet) -> CompileResult<()> {
        let (commands, stats) = standardize(pattern, properties.options.hoist_entanglement);
        debug!(
            "Standardized: {} corrections absorbed, {} entanglements cancelled, {} output corrections",
            stats.absorbed_corrections, stats.cancelled_entanglements, stats.output_corrections
        );
        pattern.set_commands(commands)?;
        properties.insert(stats);
        Ok(())
    }
}

#[derive(Default)]
struct PauliFrame {
    x: FxHashMap<QubitId, Domain>,
    z: FxHashMap<QubitId, Domain>,
}

impl PauliFrame {
    fn absorb(&mut self, correction: &Correction) {
        let frame = match correction.kind {
            CorrectionKind::X => &mut self.x,
            CorrectionKind::Z => &mut self.z,
        };
        *frame.entry(correction.qubit).or_default() ^= &correction.domain;
    }

    fn entangle(&mut self, a: QubitId, b: QubitId) {
        let xa = self.x.get(&a).cloned();
        let xb = self.x.get(&b).cloned();
        if let Some(xa) = xa {
            *self.z.entry(b).or_default() ^= &xa;
        }
        if let Some(xb) = xb {
            *self.z.entry(a).or_default() ^= &xb;
        }
    }

    fn take(&mut self, qubit: QubitId) -> (Domain, Domain) {
        (
            self.x.remove(&qubit).unwrap_or_default(),
            self.z.remove(&qubit).unwrap_or_default(),
        )
    }
}

pub(crate) fn pair_key(a: QubitId, b: QubitId) -> (QubitId, QubitId) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Standardize a command list. Returns the new commands and statistics.
pub fn standardize(pattern: &Pattern, hoist: bool) -> (Vec<Command>, StandardizeStats) {
    let mut stats = StandardizeStats::default();
    let mut frame = PauliFrame::default();
    let mut out: Vec<Option<Command>> = Vec::with_capacity(pattern.commands().len());

    let mut present: FxHashSet<QubitId> = pattern.inputs().iter().copied().collect();
    // Entanglements that introduced no qubit, keyed by pair.
    let mut open_pairs: FxHashMap<(QubitId, QubitId), usize> = FxHashMap::default();

    for cmd in pattern.commands() {
        match cmd {
            Command::Correct(c) => {
                frame.absorb(c);
                stats.absorbed_corrections += 1;
            }
            Command::Entangle(a, b) => {
                frame.entangle(*a, *b);
                let key = pair_key(*a, *b);
                let introduces = !present.contains(a) || !present.contains(b);
                present.insert(*a);
                present.insert(*b);

                if !introduces {
                    if let Some(first) = open_pairs.remove(&key) {
                        out[first] = None;
                        stats.cancelled_entanglements += 2;
                        continue;
                    }
                    open_pairs.insert(key, out.len());
                }
                out.push(Some(cmd.clone()));
            }
            Command::Measure(m) => {
                let (x, z) = frame.take(m.qubit);
                let mut m = m.clone();
                m.s_domain ^= &x;
                m.t_domain ^= &z;
                present.remove(&m.qubit);
                out.push(Some(Command::Measure(m)));
            }
        }
    }

    for &q in pattern.outputs() {
        let (x, z) = frame.take(q);
        if !x.is_empty() {
            out.push(Some(Correction::x(q, x).into()));
            stats.output_corrections += 1;
        }
        if !z.is_empty() {
            out.push(Some(Correction::z(q, z).into()));
            stats.output_corrections += 1;
        }
    }

    let mut commands: Vec<Command> = out.into_iter().flatten().collect();
    if hoist {
        let (mut entangle, rest): (Vec<_>, Vec<_>) =
            commands.into_iter().partition(Command::is_entangle);
        entangle.extend(rest);
        commands = entangle;
    }
    (commands, stats)
}
