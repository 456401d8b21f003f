//! Dependency resolution: a command DAG and a stable linearization.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use mbqc_ir::QubitId;
use mbqc_pattern::{Command, Pattern};
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::error::{CompileError, CompileResult};
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;

/// Dependency DAG over command indices.
///
/// Node `i` is command `i`. An edge `a -> b` means `a` must execute before
/// `b`. Two kinds of edges exist:
///
/// - wire edges: commands acting on a common qubit keep their relative
///   order, except that entanglements on a shared qubit commute with each
///   other
/// - signal edges: the measurement of `j` precedes every command whose
///   domains contain `j`
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    graph: DiGraph<(), ()>,
}

impl DependencyGraph {
    /// Build the DAG for a command list.
    pub fn build(commands: &[Command]) -> CompileResult<Self> {
        let mut graph = DiGraph::with_capacity(commands.len(), commands.len() * 2);
        for _ in commands {
            graph.add_node(());
        }

        let measured_at: FxHashMap<QubitId, usize> = commands
            .iter()
            .enumerate()
            .filter_map(|(i, cmd)| match cmd {
                Command::Measure(m) => Some((m.qubit, i)),
                _ => None,
            })
            .collect();

        let mut last_non_entangle: FxHashMap<QubitId, usize> = FxHashMap::default();
        let mut entangles_since: FxHashMap<QubitId, Vec<usize>> = FxHashMap::default();

        for (i, cmd) in commands.iter().enumerate() {
            let node = NodeIndex::new(i);

            for q in cmd.qubits() {
                if let Some(&prev) = last_non_entangle.get(&q) {
                    graph.add_edge(NodeIndex::new(prev), node, ());
                }
                if cmd.is_entangle() {
                    entangles_since.entry(q).or_default().push(i);
                } else {
                    for prev in entangles_since.remove(&q).unwrap_or_default() {
                        graph.add_edge(NodeIndex::new(prev), node, ());
                    }
                    last_non_entangle.insert(q, i);
                }
            }

            for j in cmd.signals() {
                let Some(&writer) = measured_at.get(&j) else {
                    return Err(CompileError::UnknownSignal { index: i, qubit: j });
                };
                graph.add_edge(NodeIndex::new(writer), node, ());
            }
        }

        Ok(Self { graph })
    }

    /// Number of commands.
    pub fn num_commands(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of dependency edges.
    pub fn num_edges(&self) -> usize {
        self.graph.edge_count()
    }

    /// Direct predecessors of a command.
    pub fn dependencies(&self, index: usize) -> Vec<usize> {
        let mut deps: Vec<usize> = self
            .graph
            .neighbors_directed(NodeIndex::new(index), Direction::Incoming)
            .map(NodeIndex::index)
            .collect();
        deps.sort_unstable();
        deps.dedup();
        deps
    }

    /// Kahn topological sort; among ready commands the lowest index goes first.
    pub fn linearize(&self) -> CompileResult<Vec<usize>> {
        let n = self.graph.node_count();
        let mut in_degree: Vec<usize> = self
            .graph
            .node_indices()
            .map(|node| self.graph.neighbors_directed(node, Direction::Incoming).count())
            .collect();

        let mut ready: BinaryHeap<Reverse<usize>> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, d)| **d == 0)
            .map(|(i, _)| Reverse(i))
            .collect();

        let mut order = Vec::with_capacity(n);
        while let Some(Reverse(i)) = ready.pop() {
            order.push(i);
            for succ in self
                .graph
                .neighbors_directed(NodeIndex::new(i), Direction::Outgoing)
            {
                let j = succ.index();
                in_degree[j] -= 1;
                if in_degree[j] == 0 {
                    ready.push(Reverse(j));
                }
            }
        }

        if order.len() < n {
            return Err(CompileError::CyclicDependency {
                remaining: n - order.len(),
            });
        }
        Ok(order)
    }
}

/// Compute a valid execution order for a command list.
pub fn resolve_order(commands: &[Command]) -> CompileResult<Vec<usize>> {
    DependencyGraph::build(commands)?.linearize()
}

/// Summary of the resolved order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolvedOrder {
    /// Number of dependency edges in the DAG.
    pub edges: usize,
    /// Commands whose position changed.
    pub moved: usize,
}

/// Reorders the commands so every outcome is written before it is read.
///
/// A command list that is already valid comes out unchanged.
pub struct ResolveDependencies;

impl Pass for ResolveDependencies {
    fn name(&self) -> &'static str {
        "resolve_dependencies"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, pattern: &mut Pattern, properties: &mut PropertySet) -> CompileResult<()> {
        let dag = DependencyGraph::build(pattern.commands())?;
        let order = dag.linearize()?;
        let moved = order.iter().enumerate().filter(|(pos, i)| pos != *i).count();
        debug!(
            "Resolved {} commands over {} edges, {} moved",
            order.len(),
            dag.num_edges(),
            moved
        );

        if moved > 0 {
            let commands = pattern.commands();
            let reordered: Vec<Command> = order
                .iter()
                .map(|&i| {
                    trace!("{} -> {}", i, commands[i]);
                    commands[i].clone()
                })
                .collect();
            pattern.set_commands(reordered)?;
        }

        properties.insert(ResolvedOrder {
            edges: dag.num_edges(),
            moved,
        });
        Ok(())
    }
}
