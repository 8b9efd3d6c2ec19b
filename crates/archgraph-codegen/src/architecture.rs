//! ARCHITECTURE.md generation.
//!
//! Renders the whole graph as a markdown document: totals, every node grouped
//! by type with its relationships, and a Mermaid diagram at the end.

use anyhow::Result;
use chrono::{DateTime, Utc};
use std::path::Path;

use archgraph_core::{Direction, NodeType};
use archgraph_graph::queries::{list_nodes, query_relationships};
use archgraph_graph::GraphStore;

use crate::mermaid::generate_mermaid;

/// Default output file name.
pub const ARCHITECTURE_FILE: &str = "ARCHITECTURE.md";

/// Generated ARCHITECTURE.md content.
#[derive(Debug, Clone)]
pub struct GeneratedArchitecture {
    pub content: String,
}

/// Render the document. The same graph and timestamp give the same text.
pub fn export_architecture(graph: &GraphStore, generated_at: DateTime<Utc>) -> GeneratedArchitecture {
    let mut content = String::new();

    content.push_str("# Architecture Map\n\n");
    content.push_str(&format!(
        "*Auto-generated on {}*\n\n",
        generated_at.format("%Y-%m-%d %H:%M UTC")
    ));

    content.push_str("## Overview\n\n");
    content.push_str(&format!("- **Total Nodes:** {}\n", graph.node_count()));
    content.push_str(&format!("- **Total Relationships:** {}\n\n", graph.edge_count()));

    for node_type in NodeType::ALL {
        let nodes = list_nodes(graph, Some(node_type), usize::MAX);
        if nodes.is_empty() {
            continue;
        }

        content.push_str(&format!("## {}\n\n", section_title(node_type)));
        for node in nodes {
            content.push_str(&format!("### {}\n", node.name));
            content.push_str(&format!("- **ID:** `{}`\n", node.node_id));
            content.push_str(&format!("- **Connections:** {}\n", node.connections));

            if let Ok(rels) = query_relationships(graph, &node.node_id, Direction::Both, None) {
                if !rels.outgoing.is_empty() {
                    content.push_str("- **Outgoing:**\n");
                    for rel in &rels.outgoing {
                        content.push_str(&format!("  - {} -> {}\n", rel.relationship, rel.to_name));
                    }
                }
                if !rels.incoming.is_empty() {
                    content.push_str("- **Incoming:**\n");
                    for rel in &rels.incoming {
                        content.push_str(&format!("  - {} -> {}\n", rel.from_name, rel.relationship));
                    }
                }
            }
            content.push('\n');
        }
    }

    content.push_str("## Visual Diagram\n\n");
    content.push_str("```mermaid\n");
    content.push_str(&generate_mermaid(graph, None));
    content.push_str("```\n");

    GeneratedArchitecture { content }
}

/// Write the document to `path`, creating parent directories.
pub fn write_architecture_md(generated: &GeneratedArchitecture, path: &Path) -> Result<String> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, &generated.content)?;
    Ok(path.display().to_string())
}

/// "Apis", "Screens", ...
fn section_title(node_type: NodeType) -> String {
    let name = node_type.as_str();
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => format!("{}{}s", first.to_uppercase(), chars.as_str()),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use archgraph_core::{Properties, Relationship};

    fn graph() -> GraphStore {
        let mut g = GraphStore::new();
        g.add_node("svc-auth", NodeType::Service, "Auth Service", Properties::new()).unwrap();
        g.add_node("api-login", NodeType::Api, "Login API", Properties::new()).unwrap();
        g.add_node("model-user", NodeType::Model, "User", Properties::new()).unwrap();
        g.add_edge("api-login", "svc-auth", Relationship::Calls, Properties::new()).unwrap();
        g
    }

    fn at() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-03-01T09:30:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_sections_follow_type_order() {
        let doc = export_architecture(&graph(), at()).content;
        assert!(doc.contains("*Auto-generated on 2025-03-01 09:30 UTC*"));
        assert!(doc.contains("- **Total Nodes:** 3\n"));
        assert!(doc.contains("- **Total Relationships:** 1\n"));

        let apis = doc.find("## Apis").unwrap();
        let services = doc.find("## Services").unwrap();
        let models = doc.find("## Models").unwrap();
        assert!(apis < services && services < models);
        assert!(!doc.contains("## Queues"));
    }

    #[test]
    fn test_relationships_listed() {
        let doc = export_architecture(&graph(), at()).content;
        assert!(doc.contains("### Login API\n- **ID:** `api-login`\n- **Connections:** 1\n- **Outgoing:**\n  - calls -> Auth Service\n"));
        assert!(doc.contains("- **Incoming:**\n  - Login API -> calls\n"));
        assert!(doc.contains("```mermaid\ngraph TD\n"));
        assert!(doc.ends_with("```\n"));
    }

    #[test]
    fn test_deterministic_for_same_input() {
        let g = graph();
        assert_eq!(export_architecture(&g, at()).content, export_architecture(&g, at()).content);
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let dir = std::env::temp_dir().join(format!("archgraph-export-{}", uuid::Uuid::new_v4()));
        let path = dir.join("docs").join(ARCHITECTURE_FILE);

        let written = write_architecture_md(&export_architecture(&graph(), at()), &path).unwrap();
        assert_eq!(written, path.display().to_string());
        assert!(std::fs::read_to_string(&path).unwrap().starts_with("# Architecture Map"));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
