//! Architecture graph model types.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::GraphError;

/// Kind of architecture element a node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Api,
    Screen,
    Journey,
    Component,
    Service,
    Database,
    Queue,
    Event,
    Model,
}

impl NodeType {
    /// Every node type, in display order.
    pub const ALL: [NodeType; 9] = [
        Self::Api,
        Self::Screen,
        Self::Journey,
        Self::Component,
        Self::Service,
        Self::Database,
        Self::Queue,
        Self::Event,
        Self::Model,
    ];

    /// Convert to string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Api => "api",
            Self::Screen => "screen",
            Self::Journey => "journey",
            Self::Component => "component",
            Self::Service => "service",
            Self::Database => "database",
            Self::Queue => "queue",
            Self::Event => "event",
            Self::Model => "model",
        }
    }

    /// Comma separated list of accepted values, for error messages.
    pub fn expected() -> String {
        Self::ALL.iter().map(|t| t.as_str()).collect::<Vec<_>>().join(", ")
    }
}

impl FromStr for NodeType {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| GraphError::invalid_enum("node_type", s, Self::expected()))
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of relationship an edge expresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relationship {
    Calls,
    Uses,
    DependsOn,
    PartOf,
    Triggers,
    Reads,
    Writes,
    Emits,
    Consumes,
}

impl Relationship {
    /// Every relationship type, in display order.
    pub const ALL: [Relationship; 9] = [
        Self::Calls,
        Self::Uses,
        Self::DependsOn,
        Self::PartOf,
        Self::Triggers,
        Self::Reads,
        Self::Writes,
        Self::Emits,
        Self::Consumes,
    ];

    /// Convert to string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Calls => "calls",
            Self::Uses => "uses",
            Self::DependsOn => "depends_on",
            Self::PartOf => "part_of",
            Self::Triggers => "triggers",
            Self::Reads => "reads",
            Self::Writes => "writes",
            Self::Emits => "emits",
            Self::Consumes => "consumes",
        }
    }

    /// Comma separated list of accepted values, for error messages.
    pub fn expected() -> String {
        Self::ALL.iter().map(|r| r.as_str()).collect::<Vec<_>>().join(", ")
    }
}

impl FromStr for Relationship {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|r| r.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| GraphError::invalid_enum("relationship", s, Self::expected()))
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which side of a node to look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Incoming,
    Outgoing,
    #[default]
    Both,
}

impl Direction {
    pub fn includes_outgoing(&self) -> bool {
        matches!(self, Self::Outgoing | Self::Both)
    }

    pub fn includes_incoming(&self) -> bool {
        matches!(self, Self::Incoming | Self::Both)
    }
}

impl FromStr for Direction {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "incoming" | "in" => Ok(Self::Incoming),
            "outgoing" | "out" => Ok(Self::Outgoing),
            "both" => Ok(Self::Both),
            _ => Err(GraphError::invalid_enum("direction", s, "incoming, outgoing, both")),
        }
    }
}

/// A scalar property value.
///
/// Serialized untagged so a property bag reads as a plain JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl PropertyValue {
    /// Parse a CLI-style literal: `true`/`false`, integers, floats, else a string.
    pub fn parse_literal(raw: &str) -> Self {
        if let Ok(b) = raw.parse::<bool>() {
            return Self::Bool(b);
        }
        if let Ok(i) = raw.parse::<i64>() {
            return Self::Integer(i);
        }
        if let Ok(f) = raw.parse::<f64>() {
            if f.is_finite() {
                return Self::Float(f);
            }
        }
        Self::String(raw.to_string())
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{}", x),
            Self::String(s) => f.write_str(s),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for PropertyValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<f64> for PropertyValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// Property bag attached to nodes and edges. Ordered for stable output.
pub type Properties = BTreeMap<String, PropertyValue>;

/// An architecture element (API, screen, service, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub node_type: NodeType,
    pub name: String,
    #[serde(default)]
    pub properties: Properties,
    pub created_at: DateTime<Utc>,
}

impl Node {
    /// Create a node stamped with the current time.
    pub fn new(
        id: impl Into<String>,
        node_type: NodeType,
        name: impl Into<String>,
        properties: Properties,
    ) -> Self {
        Self {
            id: id.into(),
            node_type,
            name: name.into(),
            properties,
            created_at: Utc::now(),
        }
    }
}

/// Identity of an edge: at most one edge exists per key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeKey {
    pub from_id: String,
    pub to_id: String,
    pub relationship: Relationship,
}

impl EdgeKey {
    pub fn new(from_id: impl Into<String>, to_id: impl Into<String>, relationship: Relationship) -> Self {
        Self {
            from_id: from_id.into(),
            to_id: to_id.into(),
            relationship,
        }
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} --{}--> {}", self.from_id, self.relationship, self.to_id)
    }
}

/// A directed, typed relationship between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub from_id: String,
    pub to_id: String,
    pub relationship: Relationship,
    #[serde(default)]
    pub properties: Properties,
    pub created_at: DateTime<Utc>,
}

impl Edge {
    /// Create an edge stamped with the current time.
    pub fn new(
        from_id: impl Into<String>,
        to_id: impl Into<String>,
        relationship: Relationship,
        properties: Properties,
    ) -> Self {
        Self {
            from_id: from_id.into(),
            to_id: to_id.into(),
            relationship,
            properties,
            created_at: Utc::now(),
        }
    }

    pub fn key(&self) -> EdgeKey {
        EdgeKey::new(self.from_id.clone(), self.to_id.clone(), self.relationship)
    }

    /// Whether `node_id` is either endpoint.
    pub fn touches(&self, node_id: &str) -> bool {
        self.from_id == node_id || self.to_id == node_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_type_parse() {
        assert_eq!("api".parse::<NodeType>().unwrap(), NodeType::Api);
        assert_eq!(" Database ".parse::<NodeType>().unwrap(), NodeType::Database);
        assert!(matches!(
            "lambda".parse::<NodeType>(),
            Err(GraphError::InvalidEnum { .. })
        ));
    }

    #[test]
    fn test_relationship_parse_roundtrip() {
        for rel in Relationship::ALL {
            assert_eq!(rel.as_str().parse::<Relationship>().unwrap(), rel);
        }
        assert!("owns".parse::<Relationship>().is_err());
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!("in".parse::<Direction>().unwrap(), Direction::Incoming);
        assert_eq!("outgoing".parse::<Direction>().unwrap(), Direction::Outgoing);
        assert!(Direction::Both.includes_incoming() && Direction::Both.includes_outgoing());
        assert!("sideways".parse::<Direction>().is_err());
    }

    #[test]
    fn test_property_literal_parsing() {
        assert_eq!(PropertyValue::parse_literal("true"), PropertyValue::Bool(true));
        assert_eq!(PropertyValue::parse_literal("42"), PropertyValue::Integer(42));
        assert_eq!(PropertyValue::parse_literal("0.5"), PropertyValue::Float(0.5));
        assert_eq!(
            PropertyValue::parse_literal("POST /login"),
            PropertyValue::String("POST /login".to_string())
        );
        assert_eq!(PropertyValue::parse_literal("NaN"), PropertyValue::String("NaN".to_string()));
    }

    #[test]
    fn test_properties_json_shape() {
        let mut props = Properties::new();
        props.insert("method".to_string(), "POST".into());
        props.insert("auth".to_string(), true.into());
        props.insert("rate_limit".to_string(), 100i64.into());

        let json = serde_json::to_string(&props).unwrap();
        assert_eq!(json, r#"{"auth":true,"method":"POST","rate_limit":100}"#);

        let back: Properties = serde_json::from_str(&json).unwrap();
        assert_eq!(back, props);
    }

    #[test]
    fn test_edge_key_display() {
        let edge = Edge::new("api-login", "svc-auth", Relationship::Calls, Properties::new());
        assert_eq!(edge.key().to_string(), "api-login --calls--> svc-auth");
        assert!(edge.touches("svc-auth"));
        assert!(!edge.touches("db-users"));
    }
}
