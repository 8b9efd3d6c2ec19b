//! Neighborhood exploration: relationships of one node and node listings.

use serde::Serialize;

use archgraph_core::{Direction, GraphError, GraphResult, NodeType, Properties, Relationship};

use crate::store::GraphStore;

/// Default page size for node listings.
pub const DEFAULT_LIST_LIMIT: usize = 100;

/// An edge leaving the queried node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutgoingRelation {
    pub to_id: String,
    pub to_name: String,
    pub to_type: NodeType,
    pub relationship: Relationship,
    pub properties: Properties,
}

/// An edge arriving at the queried node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncomingRelation {
    pub from_id: String,
    pub from_name: String,
    pub from_type: NodeType,
    pub relationship: Relationship,
    pub properties: Properties,
}

#[derive(Debug, Clone, Serialize)]
pub struct RelationshipView {
    pub node_id: String,
    pub node_name: String,
    pub node_type: NodeType,
    pub outgoing: Vec<OutgoingRelation>,
    pub incoming: Vec<IncomingRelation>,
    pub total_connections: usize,
}

/// Listing entry for a node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeSummary {
    pub node_id: String,
    pub node_type: NodeType,
    pub name: String,
    pub connections: usize,
}

/// Relationships of `id` in the given direction, optionally restricted to one
/// relationship type.
pub fn query_relationships(
    store: &GraphStore,
    id: &str,
    direction: Direction,
    relationship: Option<Relationship>,
) -> GraphResult<RelationshipView> {
    let node = store
        .get_node(id)
        .ok_or_else(|| GraphError::NotFound(format!("Node '{}'", id)))?;
    let wanted = |r: Relationship| relationship.map_or(true, |want| want == r);

    let mut outgoing = Vec::new();
    if direction.includes_outgoing() {
        for edge in store.neighbors(id, Direction::Outgoing)? {
            if !wanted(edge.relationship) {
                continue;
            }
            if let Some(to) = store.get_node(&edge.to_id) {
                outgoing.push(OutgoingRelation {
                    to_id: to.id.clone(),
                    to_name: to.name.clone(),
                    to_type: to.node_type,
                    relationship: edge.relationship,
                    properties: edge.properties.clone(),
                });
            }
        }
    }

    let mut incoming = Vec::new();
    if direction.includes_incoming() {
        for edge in store.neighbors(id, Direction::Incoming)? {
            if !wanted(edge.relationship) {
                continue;
            }
            if let Some(from) = store.get_node(&edge.from_id) {
                incoming.push(IncomingRelation {
                    from_id: from.id.clone(),
                    from_name: from.name.clone(),
                    from_type: from.node_type,
                    relationship: edge.relationship,
                    properties: edge.properties.clone(),
                });
            }
        }
    }

    Ok(RelationshipView {
        node_id: node.id.clone(),
        node_name: node.name.clone(),
        node_type: node.node_type,
        total_connections: outgoing.len() + incoming.len(),
        outgoing,
        incoming,
    })
}

/// Nodes in insertion order, optionally of one type, at most `limit`.
pub fn list_nodes(store: &GraphStore, node_type: Option<NodeType>, limit: usize) -> Vec<NodeSummary> {
    store
        .nodes()
        .into_iter()
        .filter(|node| node_type.map_or(true, |t| t == node.node_type))
        .take(limit)
        .map(|node| NodeSummary {
            node_id: node.id.clone(),
            node_type: node.node_type,
            name: node.name.clone(),
            connections: store.degree(&node.id).unwrap_or(0),
        })
        .collect()
}
