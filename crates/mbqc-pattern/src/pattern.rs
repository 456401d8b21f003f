//! Measurement patterns: an open graph plus an ordered command list.

use std::fmt;

use mbqc_ir::QubitId;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::command::Command;
use crate::error::{PatternError, PatternResult};
use crate::graph::{Basis, GraphState, QubitKind};

/// A validated measurement pattern.
///
/// Construction checks the structural invariants:
///
/// - inputs and outputs are free of duplicates
/// - every qubit a command acts on is an input or was entangled earlier
/// - no command acts on a qubit after its measurement
/// - output qubits are never measured
/// - every other qubit is measured exactly once
///
/// Signal order (outcomes read only after they are written) is not checked
/// here; that is the dependency resolver's job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "PatternRecord", into = "PatternRecord")]
pub struct Pattern {
    graph: GraphState,
    commands: Vec<Command>,
    inputs: Vec<QubitId>,
    outputs: Vec<QubitId>,
}

/// Serialized form of a pattern. The graph is derived on load.
#[derive(Serialize, Deserialize)]
struct PatternRecord {
    inputs: Vec<QubitId>,
    outputs: Vec<QubitId>,
    commands: Vec<Command>,
}

impl TryFrom<PatternRecord> for Pattern {
    type Error = PatternError;

    fn try_from(record: PatternRecord) -> PatternResult<Self> {
        Pattern::new(record.inputs, record.outputs, record.commands)
    }
}

impl From<Pattern> for PatternRecord {
    fn from(pattern: Pattern) -> Self {
        PatternRecord {
            inputs: pattern.inputs,
            outputs: pattern.outputs,
            commands: pattern.commands,
        }
    }
}

impl Pattern {
    /// Build a pattern, deriving the graph from the commands.
    pub fn new(
        inputs: Vec<QubitId>,
        outputs: Vec<QubitId>,
        commands: Vec<Command>,
    ) -> PatternResult<Self> {
        check_unique(&inputs, "input")?;
        check_unique(&outputs, "output")?;
        let graph = build_graph(&inputs, &outputs, &commands)?;
        Ok(Self {
            graph,
            commands,
            inputs,
            outputs,
        })
    }

    /// Replace the command list, keeping inputs and outputs.
    pub fn set_commands(&mut self, commands: Vec<Command>) -> PatternResult<()> {
        self.graph = build_graph(&self.inputs, &self.outputs, &commands)?;
        self.commands = commands;
        Ok(())
    }

    /// Split into `(inputs, outputs, commands)`.
    pub fn into_parts(self) -> (Vec<QubitId>, Vec<QubitId>, Vec<Command>) {
        (self.inputs, self.outputs, self.commands)
    }

    /// The open graph.
    pub fn graph(&self) -> &GraphState {
        &self.graph
    }

    /// Commands in execution order.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Input qubits, in the order the input state lists them.
    pub fn inputs(&self) -> &[QubitId] {
        &self.inputs
    }

    /// Output qubits, in the order the output state lists them.
    pub fn outputs(&self) -> &[QubitId] {
        &self.outputs
    }

    /// Measured qubits in command order.
    pub fn measured_qubits(&self) -> impl Iterator<Item = QubitId> + '_ {
        self.commands.iter().filter_map(|cmd| match cmd {
            Command::Measure(m) => Some(m.qubit),
            _ => None,
        })
    }

    /// Total number of qubits in the graph.
    pub fn num_qubits(&self) -> usize {
        self.graph.num_qubits()
    }

    /// Number of measurement commands.
    pub fn num_measurements(&self) -> usize {
        self.commands.iter().filter(|c| c.is_measure()).count()
    }

    /// Number of entanglement commands.
    pub fn num_entanglements(&self) -> usize {
        self.commands.iter().filter(|c| c.is_entangle()).count()
    }

    /// Number of correction commands.
    pub fn num_corrections(&self) -> usize {
        self.commands.iter().filter(|c| c.is_correct()).count()
    }

    /// Peak number of qubits held in the register while executing the
    /// commands in order.
    pub fn max_active_qubits(&self) -> usize {
        let mut active: FxHashSet<QubitId> = self.inputs.iter().copied().collect();
        let mut peak = active.len();
        for cmd in &self.commands {
            match cmd {
                Command::Entangle(a, b) => {
                    active.insert(*a);
                    active.insert(*b);
                    peak = peak.max(active.len());
                }
                Command::Measure(m) => {
                    active.remove(&m.qubit);
                }
                Command::Correct(_) => {}
            }
        }
        peak
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> PatternResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from JSON, re-validating the invariants.
    pub fn from_json(json: &str) -> PatternResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.inputs == other.inputs
            && self.outputs == other.outputs
            && self.commands == other.commands
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Pattern: {} inputs, {} outputs, {} qubits, {} commands",
            self.inputs.len(),
            self.outputs.len(),
            self.num_qubits(),
            self.commands.len()
        )?;
        for (i, cmd) in self.commands.iter().enumerate() {
            writeln!(f, "  {i:>4}: {cmd}")?;
        }
        Ok(())
    }
}

fn check_unique(qubits: &[QubitId], role: &'static str) -> PatternResult<()> {
    let mut seen = FxHashSet::default();
    for &qubit in qubits {
        if !seen.insert(qubit) {
            return Err(PatternError::DuplicateQubit { qubit, role });
        }
    }
    Ok(())
}

fn build_graph(
    inputs: &[QubitId],
    outputs: &[QubitId],
    commands: &[Command],
) -> PatternResult<GraphState> {
    let mut graph = GraphState::new();
    for &q in inputs {
        graph.add_qubit(q, QubitKind::Input)?;
    }

    let mut measured = FxHashSet::default();
    for (index, cmd) in commands.iter().enumerate() {
        match cmd {
            Command::Entangle(a, b) => {
                for &q in [a, b] {
                    if measured.contains(&q) {
                        return Err(PatternError::ActsOnMeasured { index, qubit: q });
                    }
                    if !graph.contains(q) {
                        graph.add_qubit(q, QubitKind::Auxiliary)?;
                    }
                }
                graph.add_edge(*a, *b)?;
            }
            Command::Measure(m) => {
                check_acts_on(&graph, &measured, index, m.qubit)?;
                measured.insert(m.qubit);
                graph.set_measurement(
                    m.qubit,
                    Basis {
                        plane: m.plane,
                        angle: m.angle,
                    },
                )?;
            }
            Command::Correct(c) => check_acts_on(&graph, &measured, index, c.qubit)?,
        }
    }

    for &q in outputs {
        if !graph.contains(q) {
            return Err(PatternError::UnknownOutput(q));
        }
        if measured.contains(&q) {
            return Err(PatternError::OutputMeasured(q));
        }
    }

    let outputs: FxHashSet<QubitId> = outputs.iter().copied().collect();
    if let Some(q) = graph.unmeasured().find(|q| !outputs.contains(q)) {
        return Err(PatternError::UnmeasuredQubit(q));
    }

    Ok(graph)
}

fn check_acts_on(
    graph: &GraphState,
    measured: &FxHashSet<QubitId>,
    index: usize,
    qubit: QubitId,
) -> PatternResult<()> {
    if !graph.contains(qubit) {
        return Err(PatternError::NotIntroduced { index, qubit });
    }
    if measured.contains(&qubit) {
        return Err(PatternError::ActsOnMeasured { index, qubit });
    }
    Ok(())
}
