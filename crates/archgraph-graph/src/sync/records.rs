//! Record encoding for graph nodes and edges.
//!
//! Keys are deterministic so a mutation always addresses the same record:
//! `node:{id}` for nodes and `edge:{len(from)}:{from}:{to}:{relationship}`
//! for edges. The length prefix makes the edge key injective even when ids
//! contain `:`.

use chrono::{DateTime, Utc};

use archgraph_core::{Edge, GraphError, Node, NodeType, Properties, Relationship};
use archgraph_embedding::{Metadata, MetadataValue, Record};

pub const CATEGORY_FIELD: &str = "category";
pub const NODE_CATEGORY: &str = "graph_node";
pub const EDGE_CATEGORY: &str = "graph_edge";
pub const PROJECT_FIELD: &str = "project_id";

/// A decoded value plus the non-fatal problems found while decoding it.
#[derive(Debug)]
pub struct Decoded<T> {
    pub value: T,
    pub warnings: Vec<GraphError>,
}

pub fn node_key(id: &str) -> String {
    format!("node:{}", id)
}

pub fn edge_key(from: &str, to: &str, relationship: Relationship) -> String {
    format!("edge:{}:{}:{}:{}", from.len(), from, to, relationship)
}

/// Filter selecting every record of one category in a project.
pub fn category_filter(category: &str, project_id: &str) -> Metadata {
    let mut filter = Metadata::new();
    filter.insert(CATEGORY_FIELD.into(), category.into());
    filter.insert(PROJECT_FIELD.into(), project_id.into());
    filter
}

pub fn node_metadata(node: &Node, project_id: &str) -> Metadata {
    let mut metadata = Metadata::new();
    metadata.insert(CATEGORY_FIELD.into(), NODE_CATEGORY.into());
    metadata.insert("node_id".into(), node.id.as_str().into());
    metadata.insert("node_type".into(), node.node_type.as_str().into());
    metadata.insert("name".into(), node.name.as_str().into());
    metadata.insert("properties".into(), encode_properties(&node.properties).into());
    metadata.insert("created_at".into(), node.created_at.to_rfc3339().into());
    metadata.insert(PROJECT_FIELD.into(), project_id.into());
    metadata
}

pub fn edge_metadata(edge: &Edge, project_id: &str) -> Metadata {
    let mut metadata = Metadata::new();
    metadata.insert(CATEGORY_FIELD.into(), EDGE_CATEGORY.into());
    metadata.insert("from_node".into(), edge.from_id.as_str().into());
    metadata.insert("to_node".into(), edge.to_id.as_str().into());
    metadata.insert("relationship".into(), edge.relationship.as_str().into());
    metadata.insert("properties".into(), encode_properties(&edge.properties).into());
    metadata.insert("created_at".into(), edge.created_at.to_rfc3339().into());
    metadata.insert(PROJECT_FIELD.into(), project_id.into());
    metadata
}

/// Markdown summary of a node, used as the embedded record text.
pub fn node_document(node: &Node) -> String {
    let mut doc = format!(
        "# {}: {}\n\n**ID:** {}\n**Type:** {}\n\n",
        node.node_type.as_str().to_uppercase(),
        node.name,
        node.id,
        node.node_type
    );
    push_properties(&mut doc, &node.properties);
    doc
}

/// Markdown summary of an edge. Endpoint names make it searchable by meaning.
pub fn edge_document(edge: &Edge, from: &Node, to: &Node) -> String {
    let mut doc = format!(
        "# Relationship: {} -> {}\n\n**From:** {} ({})\n**To:** {} ({})\n**Relationship:** {}\n\n",
        from.name, to.name, edge.from_id, from.node_type, edge.to_id, to.node_type, edge.relationship
    );
    push_properties(&mut doc, &edge.properties);
    doc
}

fn push_properties(doc: &mut String, properties: &Properties) {
    if properties.is_empty() {
        return;
    }
    doc.push_str("## Properties\n");
    for (key, value) in properties {
        doc.push_str(&format!("- **{}:** {}\n", key, value));
    }
}

fn encode_properties(properties: &Properties) -> String {
    // Non-finite floats are rejected by the graph store, so a bag that got
    // this far maps to a JSON object that reads back unchanged.
    serde_json::to_string(properties).unwrap_or_else(|_| "{}".to_string())
}

/// Rebuild a node from its record.
///
/// Missing or invalid identity fields are fatal. A bad property bag or
/// timestamp degrades to a default and is reported as a warning.
pub fn decode_node(record: &Record) -> Result<Decoded<Node>, GraphError> {
    let id = required(record, "node_id")?;
    let node_type: NodeType = required(record, "node_type")?
        .parse()
        .map_err(|e: GraphError| GraphError::malformed(&record.key, e.to_string()))?;
    let name = record.get_str("name").unwrap_or(id).to_string();

    let mut warnings = Vec::new();
    let properties = decode_properties(record, &mut warnings);
    let created_at = decode_timestamp(record, &mut warnings);

    Ok(Decoded {
        value: Node {
            id: id.to_string(),
            node_type,
            name,
            properties,
            created_at,
        },
        warnings,
    })
}

/// Rebuild an edge from its record. Same degradation rules as nodes.
pub fn decode_edge(record: &Record) -> Result<Decoded<Edge>, GraphError> {
    let from_id = required(record, "from_node")?;
    let to_id = required(record, "to_node")?;
    let relationship: Relationship = required(record, "relationship")?
        .parse()
        .map_err(|e: GraphError| GraphError::malformed(&record.key, e.to_string()))?;

    let mut warnings = Vec::new();
    let properties = decode_properties(record, &mut warnings);
    let created_at = decode_timestamp(record, &mut warnings);

    Ok(Decoded {
        value: Edge {
            from_id: from_id.to_string(),
            to_id: to_id.to_string(),
            relationship,
            properties,
            created_at,
        },
        warnings,
    })
}

fn required<'a>(record: &'a Record, field: &str) -> Result<&'a str, GraphError> {
    record
        .get_str(field)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| GraphError::malformed(&record.key, format!("missing {}", field)))
}

fn decode_properties(record: &Record, warnings: &mut Vec<GraphError>) -> Properties {
    match record.metadata.get("properties") {
        None => Properties::new(),
        Some(MetadataValue::String(raw)) if raw.trim().is_empty() => Properties::new(),
        Some(MetadataValue::String(raw)) => match serde_json::from_str::<Properties>(raw) {
            Ok(props) => props,
            Err(e) => {
                warnings.push(GraphError::malformed(
                    &record.key,
                    format!("unreadable properties: {}", e),
                ));
                Properties::new()
            }
        },
        Some(other) => {
            warnings.push(GraphError::malformed(
                &record.key,
                format!("properties is not a JSON string: {}", other),
            ));
            Properties::new()
        }
    }
}

fn decode_timestamp(record: &Record, warnings: &mut Vec<GraphError>) -> DateTime<Utc> {
    let Some(raw) = record.get_str("created_at") else {
        return Utc::now();
    };
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => ts.with_timezone(&Utc),
        Err(e) => {
            warnings.push(GraphError::malformed(
                &record.key,
                format!("unreadable created_at '{}': {}", raw, e),
            ));
            Utc::now()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use archgraph_core::PropertyValue;

    fn node() -> Node {
        let mut props = Properties::new();
        props.insert("method".into(), PropertyValue::from("POST"));
        props.insert("rate_limit".into(), PropertyValue::Integer(100));
        Node::new("api-login", NodeType::Api, "Login API", props)
    }

    fn record(key: String, metadata: Metadata) -> Record {
        Record {
            key,
            text: String::new(),
            metadata,
        }
    }

    #[test]
    fn test_edge_key_is_injective() {
        // Without the length prefix these two would collide.
        let a = edge_key("a:b", "c", Relationship::Calls);
        let b = edge_key("a", "b:c", Relationship::Calls);
        assert_ne!(a, b);
        assert_eq!(edge_key("api-login", "svc-auth", Relationship::DependsOn),
            "edge:9:api-login:svc-auth:depends_on");
        assert_eq!(node_key("svc-auth"), "node:svc-auth");
    }

    #[test]
    fn test_node_roundtrip_through_metadata() {
        let original = node();
        let rec = record(node_key(&original.id), node_metadata(&original, "shop"));

        assert_eq!(rec.get_str("category"), Some(NODE_CATEGORY));
        assert_eq!(rec.get_str("project_id"), Some("shop"));

        let decoded = decode_node(&rec).unwrap();
        assert!(decoded.warnings.is_empty());
        assert_eq!(decoded.value, original);
    }

    #[test]
    fn test_edge_roundtrip_through_metadata() {
        let edge = Edge::new("api-login", "svc-auth", Relationship::Calls, Properties::new());
        let rec = record(
            edge_key(&edge.from_id, &edge.to_id, edge.relationship),
            edge_metadata(&edge, "shop"),
        );
        let decoded = decode_edge(&rec).unwrap();
        assert!(decoded.warnings.is_empty());
        assert_eq!(decoded.value, edge);
    }

    #[test]
    fn test_bad_properties_degrade_to_empty() {
        let original = node();
        let mut metadata = node_metadata(&original, "shop");
        metadata.insert("properties".into(), "{not json".into());

        let decoded = decode_node(&record(node_key(&original.id), metadata)).unwrap();
        assert!(decoded.value.properties.is_empty());
        assert_eq!(decoded.warnings.len(), 1);
        assert!(matches!(decoded.warnings[0], GraphError::MalformedRecord { .. }));
    }

    #[test]
    fn test_bad_identity_is_fatal() {
        let original = node();

        let mut metadata = node_metadata(&original, "shop");
        metadata.insert("node_type".into(), "spaceship".into());
        assert!(matches!(
            decode_node(&record("node:x".into(), metadata)),
            Err(GraphError::MalformedRecord { .. })
        ));

        let mut metadata = node_metadata(&original, "shop");
        metadata.remove("node_id");
        assert!(decode_node(&record("node:x".into(), metadata)).is_err());

        let edge = Edge::new("a", "b", Relationship::Uses, Properties::new());
        let mut metadata = edge_metadata(&edge, "shop");
        metadata.insert("relationship".into(), "loves".into());
        assert!(decode_edge(&record("edge:x".into(), metadata)).is_err());
    }

    #[test]
    fn test_missing_name_falls_back_to_id() {
        let mut metadata = node_metadata(&node(), "shop");
        metadata.remove("name");
        let decoded = decode_node(&record("node:api-login".into(), metadata)).unwrap();
        assert_eq!(decoded.value.name, "api-login");
    }

    #[test]
    fn test_empty_name_is_kept() {
        let original = Node::new("svc-x", NodeType::Service, "", Properties::new());
        let rec = record(node_key(&original.id), node_metadata(&original, "shop"));
        let decoded = decode_node(&rec).unwrap();
        assert_eq!(decoded.value.name, "");
        assert_eq!(decoded.value, original);
    }

    #[test]
    fn test_documents() {
        let n = node();
        let doc = node_document(&n);
        assert!(doc.starts_with("# API: Login API\n"));
        assert!(doc.contains("**ID:** api-login"));
        assert!(doc.contains("- **method:** POST"));

        let svc = Node::new("svc-auth", NodeType::Service, "Auth", Properties::new());
        let edge = Edge::new("api-login", "svc-auth", Relationship::Calls, Properties::new());
        let doc = edge_document(&edge, &n, &svc);
        assert!(doc.starts_with("# Relationship: Login API -> Auth"));
        assert!(doc.contains("**To:** svc-auth (service)"));
        assert!(!doc.contains("## Properties"));
    }
}
