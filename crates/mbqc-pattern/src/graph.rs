//! Open graph states.

use std::collections::BTreeSet;

use mbqc_ir::QubitId;
use petgraph::graphmap::UnGraphMap;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::command::Plane;
use crate::error::{GraphError, GraphResult};

/// How a qubit enters the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QubitKind {
    /// Present in the initial state handed to the runtime.
    Input,
    /// Created by an entangling command in the fiducial state |+⟩.
    Auxiliary,
}

/// Measurement basis recorded for a measured qubit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Basis {
    /// Measurement plane.
    pub plane: Plane,
    /// Base angle before signal adaptation.
    pub angle: f64,
}

/// An open graph: qubits, CZ edges and the bases of measured qubits.
///
/// The graph is undirected and simple. Adding an edge that already exists
/// is a no-op.
#[derive(Debug, Clone, Default)]
pub struct GraphState {
    /// Qubits are nodes, entanglement is an edge.
    graph: UnGraphMap<QubitId, ()>,
    /// Lifecycle entry point of each qubit.
    kinds: FxHashMap<QubitId, QubitKind>,
    /// Bases of measured qubits.
    bases: FxHashMap<QubitId, Basis>,
}

impl GraphState {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a qubit.
    pub fn add_qubit(&mut self, qubit: QubitId, kind: QubitKind) -> GraphResult<()> {
        if self.graph.contains_node(qubit) {
            return Err(GraphError::DuplicateQubit(qubit));
        }
        self.graph.add_node(qubit);
        self.kinds.insert(qubit, kind);
        Ok(())
    }

    /// Check if the qubit is part of the graph.
    #[inline]
    pub fn contains(&self, qubit: QubitId) -> bool {
        self.graph.contains_node(qubit)
    }

    /// Kind of a qubit.
    pub fn kind(&self, qubit: QubitId) -> Option<QubitKind> {
        self.kinds.get(&qubit).copied()
    }

    /// Add an undirected edge.
    ///
    /// Returns `true` if the edge is new.
    pub fn add_edge(&mut self, a: QubitId, b: QubitId) -> GraphResult<bool> {
        if a == b {
            return Err(GraphError::SelfLoop(a));
        }
        for q in [a, b] {
            if !self.graph.contains_node(q) {
                return Err(GraphError::UnknownQubit(q));
            }
        }
        Ok(self.graph.add_edge(a, b, ()).is_none())
    }

    /// Check if an edge exists.
    pub fn has_edge(&self, a: QubitId, b: QubitId) -> bool {
        self.graph.contains_edge(a, b)
    }

    /// Neighbors of a qubit.
    pub fn neighbors(&self, qubit: QubitId) -> GraphResult<BTreeSet<QubitId>> {
        if !self.graph.contains_node(qubit) {
            return Err(GraphError::UnknownQubit(qubit));
        }
        Ok(self.graph.neighbors(qubit).collect())
    }

    /// Record the measurement basis of a qubit.
    pub fn set_measurement(&mut self, qubit: QubitId, basis: Basis) -> GraphResult<()> {
        if !self.graph.contains_node(qubit) {
            return Err(GraphError::UnknownQubit(qubit));
        }
        self.bases.insert(qubit, basis);
        Ok(())
    }

    /// Measurement basis of a qubit, `None` for unmeasured qubits.
    pub fn measurement(&self, qubit: QubitId) -> Option<&Basis> {
        self.bases.get(&qubit)
    }

    /// Qubits in insertion order.
    pub fn qubits(&self) -> impl Iterator<Item = QubitId> + '_ {
        self.graph.nodes()
    }

    /// Qubits without a recorded measurement, in insertion order.
    pub fn unmeasured(&self) -> impl Iterator<Item = QubitId> + '_ {
        self.graph.nodes().filter(|q| !self.bases.contains_key(q))
    }

    /// Edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (QubitId, QubitId)> + '_ {
        self.graph.all_edges().map(|(a, b, _)| (a, b))
    }

    /// Number of qubits.
    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of edges.
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.graph.edge_count()
    }
}
