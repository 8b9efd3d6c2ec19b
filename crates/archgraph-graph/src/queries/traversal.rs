//! Reachability and shortest-path queries.
//!
//! Breadth-first over the store's adjacency with a visited set, so cycles
//! terminate. Neighbors are visited in edge insertion order, which makes
//! discovery order and chosen shortest paths deterministic.

use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::stable_graph::NodeIndex;
use petgraph::Direction as Side;
use serde::Serialize;

use archgraph_core::{GraphError, GraphResult, NodeType, Relationship};

use crate::store::GraphStore;

/// One hop on a path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathStep {
    pub node_id: String,
    pub node_name: String,
    pub node_type: NodeType,
    /// Relationship leading to the next step. `None` on the last step.
    pub relationship: Option<Relationship>,
}

/// Outcome of a shortest-path query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PathResult {
    Found {
        path_length: usize,
        path: Vec<PathStep>,
    },
    NotFound {
        message: String,
    },
}

impl PathResult {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }

    /// Number of edges on the path, if one exists.
    pub fn length(&self) -> Option<usize> {
        match self {
            Self::Found { path_length, .. } => Some(*path_length),
            Self::NotFound { .. } => None,
        }
    }

    pub fn node_ids(&self) -> Vec<&str> {
        match self {
            Self::Found { path, .. } => path.iter().map(|s| s.node_id.as_str()).collect(),
            Self::NotFound { .. } => Vec::new(),
        }
    }
}

/// Every node reachable from `id` along outgoing edges, excluding `id`.
pub fn descendants(store: &GraphStore, id: &str) -> GraphResult<Vec<String>> {
    reachable_ids(store, id, Side::Outgoing)
}

/// Every node that can reach `id`, excluding `id`.
pub fn ancestors(store: &GraphStore, id: &str) -> GraphResult<Vec<String>> {
    reachable_ids(store, id, Side::Incoming)
}

fn reachable_ids(store: &GraphStore, id: &str, side: Side) -> GraphResult<Vec<String>> {
    let start = store
        .index_of(id)
        .ok_or_else(|| GraphError::NotFound(format!("Node '{}'", id)))?;

    Ok(reachable(store, start, side)
        .into_iter()
        .filter_map(|idx| store.node_at(idx))
        .map(|node| node.id.clone())
        .collect())
}

/// BFS from `start`, returning visited nodes in discovery order, start excluded.
pub(crate) fn reachable(store: &GraphStore, start: NodeIndex, side: Side) -> Vec<NodeIndex> {
    let mut visited = HashSet::from([start]);
    let mut queue = VecDeque::from([start]);
    let mut order = Vec::new();

    while let Some(current) = queue.pop_front() {
        for (next, _) in store.adjacent(current, side) {
            if visited.insert(next) {
                order.push(next);
                queue.push_back(next);
            }
        }
    }

    order
}

/// Shortest path by edge count from `from` to `to`.
pub fn find_path(store: &GraphStore, from: &str, to: &str) -> GraphResult<PathResult> {
    let start = store
        .index_of(from)
        .ok_or_else(|| GraphError::UnknownNode(from.to_string()))?;
    let goal = store
        .index_of(to)
        .ok_or_else(|| GraphError::UnknownNode(to.to_string()))?;

    // child -> (parent, relationship used to reach the child)
    let mut parents: HashMap<NodeIndex, (NodeIndex, Relationship)> = HashMap::new();
    let mut visited = HashSet::from([start]);
    let mut queue = VecDeque::from([start]);

    while let Some(current) = queue.pop_front() {
        if current == goal {
            break;
        }
        for (next, relationship) in store.adjacent(current, Side::Outgoing) {
            if visited.insert(next) {
                parents.insert(next, (current, relationship));
                queue.push_back(next);
            }
        }
    }

    if !visited.contains(&goal) {
        return Ok(PathResult::NotFound {
            message: format!("No path exists between {} and {}", from, to),
        });
    }

    // Walk back from the goal, then reverse.
    let mut hops: Vec<(NodeIndex, Option<Relationship>)> = vec![(goal, None)];
    let mut cursor = goal;
    while let Some((parent, relationship)) = parents.get(&cursor) {
        hops.push((*parent, Some(*relationship)));
        cursor = *parent;
    }
    hops.reverse();

    let path: Vec<PathStep> = hops
        .into_iter()
        .filter_map(|(idx, relationship)| {
            store.node_at(idx).map(|node| PathStep {
                node_id: node.id.clone(),
                node_name: node.name.clone(),
                node_type: node.node_type,
                relationship,
            })
        })
        .collect();

    Ok(PathResult::Found {
        path_length: path.len().saturating_sub(1),
        path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use archgraph_core::Properties;

    fn chain() -> GraphStore {
        // screen -> api -> svc -> db, plus svc -> queue and a cycle queue -> api
        let mut g = GraphStore::new();
        for (id, t) in [
            ("screen-login", NodeType::Screen),
            ("api-login", NodeType::Api),
            ("svc-auth", NodeType::Service),
            ("db-users", NodeType::Database),
            ("q-audit", NodeType::Queue),
            ("model-user", NodeType::Model),
        ] {
            g.add_node(id, t, id, Properties::new()).unwrap();
        }
        for (a, b, r) in [
            ("screen-login", "api-login", Relationship::Calls),
            ("api-login", "svc-auth", Relationship::Calls),
            ("svc-auth", "db-users", Relationship::Reads),
            ("svc-auth", "q-audit", Relationship::Emits),
            ("q-audit", "api-login", Relationship::Triggers),
        ] {
            g.add_edge(a, b, r, Properties::new()).unwrap();
        }
        g
    }

    #[test]
    fn test_descendants_discovery_order() {
        let g = chain();
        assert_eq!(
            descendants(&g, "screen-login").unwrap(),
            vec!["api-login", "svc-auth", "db-users", "q-audit"]
        );
    }

    #[test]
    fn test_descendants_exclude_start_in_cycle() {
        let g = chain();
        let found = descendants(&g, "api-login").unwrap();
        assert!(!found.contains(&"api-login".to_string()));
        assert_eq!(found, vec!["svc-auth", "db-users", "q-audit"]);
    }

    #[test]
    fn test_descendants_closed_under_edges() {
        let g = chain();
        let found: HashSet<String> = descendants(&g, "screen-login").unwrap().into_iter().collect();
        for id in &found {
            for succ in g.successors(id).unwrap() {
                assert!(succ == "screen-login" || found.contains(succ));
            }
        }
    }

    #[test]
    fn test_ancestors() {
        let g = chain();
        assert_eq!(
            ancestors(&g, "db-users").unwrap(),
            vec!["svc-auth", "api-login", "screen-login", "q-audit"]
        );
        assert!(ancestors(&g, "screen-login").unwrap().is_empty());
    }

    #[test]
    fn test_isolated_and_missing_nodes() {
        let g = chain();
        assert!(descendants(&g, "model-user").unwrap().is_empty());
        assert!(ancestors(&g, "model-user").unwrap().is_empty());
        assert!(matches!(descendants(&g, "nope"), Err(GraphError::NotFound(_))));
    }

    #[test]
    fn test_find_path_with_relationships() {
        let g = chain();
        let result = find_path(&g, "screen-login", "db-users").unwrap();
        assert_eq!(result.length(), Some(3));
        assert_eq!(
            result.node_ids(),
            vec!["screen-login", "api-login", "svc-auth", "db-users"]
        );

        let PathResult::Found { path, .. } = result else {
            panic!("expected a path");
        };
        let rels: Vec<Option<Relationship>> = path.iter().map(|s| s.relationship).collect();
        assert_eq!(
            rels,
            vec![
                Some(Relationship::Calls),
                Some(Relationship::Calls),
                Some(Relationship::Reads),
                None
            ]
        );
        assert_eq!(path[3].node_type, NodeType::Database);
    }

    #[test]
    fn test_find_path_to_self_is_zero_length() {
        let g = chain();
        let result = find_path(&g, "svc-auth", "svc-auth").unwrap();
        assert_eq!(result.length(), Some(0));
        assert_eq!(result.node_ids(), vec!["svc-auth"]);
    }

    #[test]
    fn test_find_path_not_found_and_unknown() {
        let g = chain();
        let result = find_path(&g, "db-users", "screen-login").unwrap();
        assert!(!result.is_found());

        assert!(matches!(
            find_path(&g, "ghost", "db-users"),
            Err(GraphError::UnknownNode(ref id)) if id == "ghost"
        ));
        assert!(matches!(
            find_path(&g, "db-users", "ghost"),
            Err(GraphError::UnknownNode(_))
        ));
    }

    #[test]
    fn test_path_result_serializes_with_status() {
        let g = chain();
        let json = serde_json::to_value(find_path(&g, "db-users", "api-login").unwrap()).unwrap();
        assert_eq!(json["status"], "not_found");

        let json = serde_json::to_value(find_path(&g, "api-login", "db-users").unwrap()).unwrap();
        assert_eq!(json["status"], "found");
        assert_eq!(json["path_length"], 2);
        assert_eq!(json["path"][0]["relationship"], "calls");
    }
}
