//! Degree analysis and graph statistics.

use std::collections::BTreeMap;

use serde::Serialize;

use archgraph_core::{NodeType, Relationship};

use crate::store::GraphStore;

/// Number of nodes reported in `GraphStats::most_connected`.
pub const TOP_CONNECTED: usize = 5;

/// A node with no edges.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrphanNode {
    pub node_id: String,
    pub node_name: String,
    pub node_type: NodeType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectedNode {
    pub node_id: String,
    pub node_name: String,
    pub connections: usize,
}

/// Whole-graph statistics.
#[derive(Debug, Clone, Serialize)]
pub struct GraphStats {
    pub total_nodes: usize,
    pub total_edges: usize,
    pub nodes_by_type: BTreeMap<NodeType, usize>,
    pub edges_by_relationship: BTreeMap<Relationship, usize>,
    pub orphaned_nodes: usize,
    pub most_connected: Vec<ConnectedNode>,
}

/// Nodes with total degree zero, in insertion order.
pub fn find_orphans(store: &GraphStore) -> Vec<OrphanNode> {
    store
        .nodes()
        .into_iter()
        .filter(|node| store.degree(&node.id).map(|d| d == 0).unwrap_or(false))
        .map(|node| OrphanNode {
            node_id: node.id.clone(),
            node_name: node.name.clone(),
            node_type: node.node_type,
        })
        .collect()
}

/// Top `limit` nodes by total degree. Ties keep insertion order; isolated
/// nodes are never listed.
pub fn most_connected(store: &GraphStore, limit: usize) -> Vec<ConnectedNode> {
    let mut ranked: Vec<ConnectedNode> = store
        .nodes()
        .into_iter()
        .filter_map(|node| {
            let connections = store.degree(&node.id).ok()?;
            (connections > 0).then(|| ConnectedNode {
                node_id: node.id.clone(),
                node_name: node.name.clone(),
                connections,
            })
        })
        .collect();

    // Stable sort, so equal degrees stay in insertion order.
    ranked.sort_by(|a, b| b.connections.cmp(&a.connections));
    ranked.truncate(limit);
    ranked
}

pub fn graph_stats(store: &GraphStore) -> GraphStats {
    let mut nodes_by_type: BTreeMap<NodeType, usize> =
        NodeType::ALL.iter().map(|t| (*t, 0)).collect();
    for node in store.nodes() {
        *nodes_by_type.entry(node.node_type).or_default() += 1;
    }

    let mut edges_by_relationship: BTreeMap<Relationship, usize> =
        Relationship::ALL.iter().map(|r| (*r, 0)).collect();
    for edge in store.edges() {
        *edges_by_relationship.entry(edge.relationship).or_default() += 1;
    }

    GraphStats {
        total_nodes: store.node_count(),
        total_edges: store.edge_count(),
        nodes_by_type,
        edges_by_relationship,
        orphaned_nodes: find_orphans(store).len(),
        most_connected: most_connected(store, TOP_CONNECTED),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use archgraph_core::Properties;

    fn store() -> GraphStore {
        let mut g = GraphStore::new();
        g.add_node("api-a", NodeType::Api, "A", Properties::new()).unwrap();
        g.add_node("api-b", NodeType::Api, "B", Properties::new()).unwrap();
        g.add_node("svc", NodeType::Service, "Svc", Properties::new()).unwrap();
        g.add_node("lonely", NodeType::Model, "Lonely", Properties::new()).unwrap();
        g.add_node("db", NodeType::Database, "DB", Properties::new()).unwrap();
        g.add_edge("api-a", "svc", Relationship::Calls, Properties::new()).unwrap();
        g.add_edge("api-b", "svc", Relationship::Calls, Properties::new()).unwrap();
        g.add_edge("svc", "db", Relationship::Writes, Properties::new()).unwrap();
        g
    }

    #[test]
    fn test_find_orphans() {
        let mut g = store();
        let orphans = find_orphans(&g);
        assert_eq!(orphans.len(), 1);
        assert_eq!(orphans[0].node_id, "lonely");

        g.remove_node("svc").unwrap();
        let ids: Vec<String> = find_orphans(&g).into_iter().map(|o| o.node_id).collect();
        assert_eq!(ids, vec!["api-a", "api-b", "lonely", "db"]);
    }

    #[test]
    fn test_most_connected_ties_keep_insertion_order() {
        let g = store();
        let top = most_connected(&g, 3);
        let ids: Vec<&str> = top.iter().map(|c| c.node_id.as_str()).collect();
        assert_eq!(ids, vec!["svc", "api-a", "api-b"]);
        assert_eq!(top[0].connections, 3);

        let all = most_connected(&g, 100);
        assert_eq!(all.len(), 4);
        assert!(all.iter().all(|c| c.node_id != "lonely"));
    }

    #[test]
    fn test_graph_stats_lists_every_type() {
        let stats = graph_stats(&store());
        assert_eq!(stats.total_nodes, 5);
        assert_eq!(stats.total_edges, 3);
        assert_eq!(stats.nodes_by_type.len(), NodeType::ALL.len());
        assert_eq!(stats.nodes_by_type[&NodeType::Api], 2);
        assert_eq!(stats.nodes_by_type[&NodeType::Queue], 0);
        assert_eq!(stats.edges_by_relationship.len(), Relationship::ALL.len());
        assert_eq!(stats.edges_by_relationship[&Relationship::Calls], 2);
        assert_eq!(stats.edges_by_relationship[&Relationship::Emits], 0);
        assert_eq!(stats.orphaned_nodes, 1);
        assert_eq!(stats.most_connected.len(), 4);
    }

    #[test]
    fn test_empty_graph_stats() {
        let stats = graph_stats(&GraphStore::new());
        assert_eq!(stats.total_nodes, 0);
        assert!(stats.most_connected.is_empty());
        assert!(stats.nodes_by_type.values().all(|c| *c == 0));
    }
}
