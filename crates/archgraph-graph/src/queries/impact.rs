//! Impact analysis.
//!
//! The blast radius of changing a node is everything that transitively
//! reaches it: if `api-login --calls--> svc-auth`, a change to `svc-auth`
//! impacts `api-login`. What the node itself reaches is reported separately
//! as its dependencies.

use std::collections::BTreeMap;
use std::fmt;

use petgraph::Direction as Side;
use serde::Serialize;

use archgraph_core::{GraphError, GraphResult, NodeType};

use crate::queries::traversal::reachable;
use crate::store::GraphStore;

/// Impacted count above which a change is high risk.
pub const HIGH_RISK_THRESHOLD: usize = 10;

/// Impacted count above which a change is medium risk.
pub const MEDIUM_RISK_THRESHOLD: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn classify(impacted: usize) -> Self {
        if impacted > HIGH_RISK_THRESHOLD {
            Self::High
        } else if impacted > MEDIUM_RISK_THRESHOLD {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Rollout advice for a change touching `impacted` components.
    pub fn recommendation(&self, impacted: usize) -> String {
        match self {
            Self::High => format!(
                "HIGH RISK: {} components affected. Consider phased rollout and extensive testing.",
                impacted
            ),
            Self::Medium => format!(
                "MEDIUM RISK: {} components affected. Test thoroughly before deployment.",
                impacted
            ),
            Self::Low => format!(
                "LOW RISK: {} components affected. Standard testing recommended.",
                impacted
            ),
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node in the blast radius.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpactedNode {
    pub id: String,
    pub name: String,
}

/// Impact analysis result for one node.
#[derive(Debug, Clone, Serialize)]
pub struct ImpactReport {
    pub node_id: String,
    pub node_name: String,
    pub node_type: NodeType,
    pub direct_dependents: usize,
    pub total_impacted: usize,
    pub dependencies: usize,
    pub impacted_by_type: BTreeMap<NodeType, Vec<ImpactedNode>>,
    pub risk_level: RiskLevel,
    pub recommendation: String,
}

/// Analyze what a change to `id` affects.
///
/// Edges point from dependent to dependency (`api --calls--> service`), so
/// the impacted set is the ancestors of `id`: every node with a path into it.
/// `dependencies` counts the other direction, the descendants of `id`.
/// A service called by one API therefore reports `total_impacted == 1`, and
/// a leaf database reached by nothing reports zero.
pub fn analyze_impact(store: &GraphStore, id: &str) -> GraphResult<ImpactReport> {
    let idx = store
        .index_of(id)
        .ok_or_else(|| GraphError::NotFound(format!("Node '{}'", id)))?;
    let node = store
        .node_at(idx)
        .ok_or_else(|| GraphError::NotFound(format!("Node '{}'", id)))?;

    let impacted = reachable(store, idx, Side::Incoming);
    let dependencies = reachable(store, idx, Side::Outgoing).len();
    let direct_dependents = store.adjacent(idx, Side::Incoming).len();

    let mut impacted_by_type: BTreeMap<NodeType, Vec<ImpactedNode>> = BTreeMap::new();
    for other in impacted.iter().filter_map(|i| store.node_at(*i)) {
        impacted_by_type
            .entry(other.node_type)
            .or_default()
            .push(ImpactedNode {
                id: other.id.clone(),
                name: other.name.clone(),
            });
    }

    let total_impacted = impacted.len();
    let risk_level = RiskLevel::classify(total_impacted);

    Ok(ImpactReport {
        node_id: node.id.clone(),
        node_name: node.name.clone(),
        node_type: node.node_type,
        direct_dependents,
        total_impacted,
        dependencies,
        impacted_by_type,
        risk_level,
        recommendation: risk_level.recommendation(total_impacted),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use archgraph_core::{Properties, Relationship};

    #[test]
    fn test_risk_thresholds() {
        assert_eq!(RiskLevel::classify(0), RiskLevel::Low);
        assert_eq!(RiskLevel::classify(3), RiskLevel::Low);
        assert_eq!(RiskLevel::classify(4), RiskLevel::Medium);
        assert_eq!(RiskLevel::classify(10), RiskLevel::Medium);
        assert_eq!(RiskLevel::classify(11), RiskLevel::High);
    }

    #[test]
    fn test_single_caller_is_low_risk() {
        let mut g = GraphStore::new();
        g.add_node("api-login", NodeType::Api, "Login API", Properties::new()).unwrap();
        g.add_node("svc-auth", NodeType::Service, "Auth Service", Properties::new()).unwrap();
        g.add_edge("api-login", "svc-auth", Relationship::Calls, Properties::new()).unwrap();

        let report = analyze_impact(&g, "svc-auth").unwrap();
        assert_eq!(report.direct_dependents, 1);
        assert_eq!(report.total_impacted, 1);
        assert_eq!(report.dependencies, 0);
        assert_eq!(report.risk_level, RiskLevel::Low);
        assert_eq!(
            report.recommendation,
            "LOW RISK: 1 components affected. Standard testing recommended."
        );
        assert_eq!(
            report.impacted_by_type[&NodeType::Api],
            vec![ImpactedNode {
                id: "api-login".into(),
                name: "Login API".into()
            }]
        );

        let upstream = analyze_impact(&g, "api-login").unwrap();
        assert_eq!(upstream.total_impacted, 0);
        assert_eq!(upstream.dependencies, 1);
    }

    #[test]
    fn test_fan_in_escalates_risk() {
        let mut g = GraphStore::new();
        g.add_node("db-core", NodeType::Database, "Core DB", Properties::new()).unwrap();
        for i in 0..12 {
            let id = format!("svc-{}", i);
            g.add_node(&id, NodeType::Service, &id, Properties::new()).unwrap();
            g.add_edge(&id, "db-core", Relationship::Reads, Properties::new()).unwrap();
            g.add_edge(&id, "db-core", Relationship::Writes, Properties::new()).unwrap();
        }

        let report = analyze_impact(&g, "db-core").unwrap();
        // Two edges per caller, counted once.
        assert_eq!(report.direct_dependents, 12);
        assert_eq!(report.total_impacted, 12);
        assert_eq!(report.risk_level, RiskLevel::High);
        assert!(report.recommendation.starts_with("HIGH RISK: 12"));
    }

    #[test]
    fn test_impact_follows_incoming_edges() {
        let mut g = GraphStore::new();
        g.add_node("api-login", NodeType::Api, "Login API", Properties::new()).unwrap();
        g.add_node("svc-auth", NodeType::Service, "Auth Service", Properties::new()).unwrap();
        g.add_node("db-users", NodeType::Database, "Users DB", Properties::new()).unwrap();
        g.add_edge("api-login", "svc-auth", Relationship::Calls, Properties::new()).unwrap();
        g.add_edge("svc-auth", "db-users", Relationship::Reads, Properties::new()).unwrap();

        let caller = analyze_impact(&g, "api-login").unwrap();
        assert_eq!(caller.total_impacted, 0);
        assert_eq!(caller.dependencies, 2);

        let leaf = analyze_impact(&g, "db-users").unwrap();
        assert_eq!(leaf.total_impacted, 2);
        assert_eq!(leaf.direct_dependents, 1);
        assert_eq!(leaf.dependencies, 0);
    }

    #[test]
    fn test_missing_node() {
        let g = GraphStore::new();
        assert!(matches!(analyze_impact(&g, "x"), Err(GraphError::NotFound(_))));
    }

    #[test]
    fn test_report_serializes_types_as_keys() {
        let mut g = GraphStore::new();
        g.add_node("a", NodeType::Screen, "A", Properties::new()).unwrap();
        g.add_node("b", NodeType::Api, "B", Properties::new()).unwrap();
        g.add_edge("a", "b", Relationship::Calls, Properties::new()).unwrap();

        let json = serde_json::to_value(analyze_impact(&g, "b").unwrap()).unwrap();
        assert_eq!(json["risk_level"], "low");
        assert_eq!(json["impacted_by_type"]["screen"][0]["id"], "a");
    }
}
