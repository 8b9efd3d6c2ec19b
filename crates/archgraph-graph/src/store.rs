//! In-memory architecture graph.
//!
//! A `StableDiGraph` holds the structure; a string index maps node ids to
//! graph indices. Every node and edge carries an insertion sequence number
//! so iteration order is deterministic even though petgraph reuses vacant
//! slots after removals.

use std::collections::{HashMap, HashSet};

use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use petgraph::Direction as Side;
use serde::Serialize;

use archgraph_core::architecture::{validate_node_id, validate_properties};
use archgraph_core::{
    Direction, Edge, EdgeKey, GraphError, GraphResult, Node, NodeType, Properties, Relationship,
};

#[derive(Debug, Clone)]
struct Slot<T> {
    seq: u64,
    value: T,
}

/// Result of removing a node: the node itself and every edge that touched it.
#[derive(Debug, Clone, Serialize)]
pub struct RemovedNode {
    pub node: Node,
    pub edges: Vec<Edge>,
}

impl RemovedNode {
    pub fn edges_removed(&self) -> usize {
        self.edges.len()
    }
}

/// Directed property graph of architecture elements.
#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    graph: StableDiGraph<Slot<Node>, Slot<Edge>>,
    index: HashMap<String, NodeIndex>,
    next_seq: u64,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn get_node(&self, id: &str) -> Option<&Node> {
        self.index
            .get(id)
            .and_then(|idx| self.graph.node_weight(*idx))
            .map(|slot| &slot.value)
    }

    /// Look up an edge by its identity triple.
    pub fn get_edge(&self, from: &str, to: &str, relationship: Relationship) -> Option<&Edge> {
        self.find_edge(from, to, relationship)
            .and_then(|e| self.graph.edge_weight(e))
            .map(|slot| &slot.value)
    }

    /// Create a node. Fails if the id is already taken.
    pub fn add_node(
        &mut self,
        id: &str,
        node_type: NodeType,
        name: &str,
        properties: Properties,
    ) -> GraphResult<Node> {
        let id = validate_node_id(id)?;
        let node = Node::new(id, node_type, name, properties);
        self.insert_node(node.clone())?;
        Ok(node)
    }

    /// Insert a fully-formed node, keeping its `created_at`.
    pub fn insert_node(&mut self, node: Node) -> GraphResult<()> {
        validate_node_id(&node.id)?;
        validate_properties(&node.properties)?;
        if self.index.contains_key(&node.id) {
            return Err(GraphError::DuplicateNode(node.id));
        }

        let id = node.id.clone();
        let seq = self.bump_seq();
        let idx = self.graph.add_node(Slot { seq, value: node });
        self.index.insert(id, idx);
        Ok(())
    }

    /// Create or overwrite the edge identified by (from, to, relationship).
    pub fn add_edge(
        &mut self,
        from: &str,
        to: &str,
        relationship: Relationship,
        properties: Properties,
    ) -> GraphResult<Edge> {
        self.insert_edge(Edge::new(from, to, relationship, properties))
    }

    /// Insert a fully-formed edge, keeping its `created_at`.
    ///
    /// Re-inserting an existing triple replaces its properties and timestamp
    /// but keeps its position in iteration order.
    pub fn insert_edge(&mut self, edge: Edge) -> GraphResult<Edge> {
        let from_idx = self.require_endpoint(&edge.from_id)?;
        let to_idx = self.require_endpoint(&edge.to_id)?;
        validate_properties(&edge.properties)?;

        match self.find_edge(&edge.from_id, &edge.to_id, edge.relationship) {
            Some(existing) => {
                if let Some(slot) = self.graph.edge_weight_mut(existing) {
                    slot.value = edge.clone();
                }
            }
            None => {
                let seq = self.bump_seq();
                self.graph.add_edge(
                    from_idx,
                    to_idx,
                    Slot {
                        seq,
                        value: edge.clone(),
                    },
                );
            }
        }

        Ok(edge)
    }

    /// Remove a single edge.
    pub fn remove_edge(
        &mut self,
        from: &str,
        to: &str,
        relationship: Relationship,
    ) -> GraphResult<Edge> {
        let idx = self
            .find_edge(from, to, relationship)
            .ok_or_else(|| GraphError::NotFound(format!("Edge {}", EdgeKey::new(from, to, relationship))))?;

        self.graph
            .remove_edge(idx)
            .map(|slot| slot.value)
            .ok_or_else(|| GraphError::NotFound(format!("Edge {}", EdgeKey::new(from, to, relationship))))
    }

    /// Remove a node together with every incident edge.
    pub fn remove_node(&mut self, id: &str) -> GraphResult<RemovedNode> {
        let idx = *self
            .index
            .get(id)
            .ok_or_else(|| GraphError::NotFound(format!("Node '{}'", id)))?;

        let mut seen = HashSet::new();
        let mut incident: Vec<&Slot<Edge>> = self
            .graph
            .edges_directed(idx, Side::Outgoing)
            .chain(self.graph.edges_directed(idx, Side::Incoming))
            .filter(|e| seen.insert(e.id()))
            .map(|e| e.weight())
            .collect();
        incident.sort_by_key(|slot| slot.seq);
        let edges: Vec<Edge> = incident.into_iter().map(|slot| slot.value.clone()).collect();

        let node = self
            .graph
            .remove_node(idx)
            .map(|slot| slot.value)
            .ok_or_else(|| GraphError::NotFound(format!("Node '{}'", id)))?;
        self.index.remove(id);

        Ok(RemovedNode { node, edges })
    }

    /// All nodes in insertion order.
    pub fn nodes(&self) -> Vec<&Node> {
        let mut slots: Vec<&Slot<Node>> = self
            .graph
            .node_indices()
            .filter_map(|i| self.graph.node_weight(i))
            .collect();
        slots.sort_by_key(|slot| slot.seq);
        slots.into_iter().map(|slot| &slot.value).collect()
    }

    /// All edges in insertion order.
    pub fn edges(&self) -> Vec<&Edge> {
        let mut slots: Vec<&Slot<Edge>> = self
            .graph
            .edge_indices()
            .filter_map(|e| self.graph.edge_weight(e))
            .collect();
        slots.sort_by_key(|slot| slot.seq);
        slots.into_iter().map(|slot| &slot.value).collect()
    }

    /// Edges touching `id`: outgoing first, then incoming, each in insertion order.
    pub fn neighbors(&self, id: &str, direction: Direction) -> GraphResult<Vec<&Edge>> {
        let idx = self.require_node(id)?;
        let mut edges = Vec::new();
        if direction.includes_outgoing() {
            edges.extend(self.edges_on(idx, Side::Outgoing));
        }
        if direction.includes_incoming() {
            edges.extend(self.edges_on(idx, Side::Incoming));
        }
        Ok(edges)
    }

    /// Ids of nodes with an edge from `id`, distinct, in edge insertion order.
    pub fn successors(&self, id: &str) -> GraphResult<Vec<&str>> {
        let idx = self.require_node(id)?;
        Ok(self.adjacent_ids(idx, Side::Outgoing))
    }

    /// In-degree plus out-degree. A self-loop counts twice.
    pub fn degree(&self, id: &str) -> GraphResult<usize> {
        let idx = self.require_node(id)?;
        Ok(self.degree_at(idx))
    }

    // -- crate internals used by the traversal queries --

    pub(crate) fn index_of(&self, id: &str) -> Option<NodeIndex> {
        self.index.get(id).copied()
    }

    pub(crate) fn node_at(&self, idx: NodeIndex) -> Option<&Node> {
        self.graph.node_weight(idx).map(|slot| &slot.value)
    }

    pub(crate) fn degree_at(&self, idx: NodeIndex) -> usize {
        self.graph.edges_directed(idx, Side::Outgoing).count()
            + self.graph.edges_directed(idx, Side::Incoming).count()
    }

    /// Adjacent nodes with the relationship of the connecting edge, ordered by
    /// edge insertion. A neighbor reachable through several edges appears once.
    pub(crate) fn adjacent(&self, idx: NodeIndex, side: Side) -> Vec<(NodeIndex, Relationship)> {
        let mut slots: Vec<(NodeIndex, &Slot<Edge>)> = self
            .graph
            .edges_directed(idx, side)
            .map(|e| {
                let other = match side {
                    Side::Outgoing => e.target(),
                    Side::Incoming => e.source(),
                };
                (other, e.weight())
            })
            .collect();
        slots.sort_by_key(|(_, slot)| slot.seq);

        let mut seen = HashSet::new();
        slots
            .into_iter()
            .filter(|(other, _)| seen.insert(*other))
            .map(|(other, slot)| (other, slot.value.relationship))
            .collect()
    }

    fn adjacent_ids(&self, idx: NodeIndex, side: Side) -> Vec<&str> {
        self.adjacent(idx, side)
            .into_iter()
            .filter_map(|(other, _)| self.node_at(other))
            .map(|node| node.id.as_str())
            .collect()
    }

    fn edges_on(&self, idx: NodeIndex, side: Side) -> Vec<&Edge> {
        let mut slots: Vec<&Slot<Edge>> =
            self.graph.edges_directed(idx, side).map(|e| e.weight()).collect();
        slots.sort_by_key(|slot| slot.seq);
        slots.into_iter().map(|slot| &slot.value).collect()
    }

    fn find_edge(&self, from: &str, to: &str, relationship: Relationship) -> Option<EdgeIndex> {
        let from_idx = self.index_of(from)?;
        let to_idx = self.index_of(to)?;
        self.graph
            .edges_directed(from_idx, Side::Outgoing)
            .find(|e| e.target() == to_idx && e.weight().value.relationship == relationship)
            .map(|e| e.id())
    }

    fn require_node(&self, id: &str) -> GraphResult<NodeIndex> {
        self.index_of(id)
            .ok_or_else(|| GraphError::NotFound(format!("Node '{}'", id)))
    }

    fn require_endpoint(&self, id: &str) -> GraphResult<NodeIndex> {
        self.index_of(id)
            .ok_or_else(|| GraphError::UnknownNode(id.to_string()))
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }
}
