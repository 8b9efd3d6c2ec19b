//! Mermaid flowchart rendering of the architecture graph.

use std::collections::{HashMap, HashSet};

use archgraph_core::{Node, NodeType};
use archgraph_graph::GraphStore;

/// `classDef` lines for the styled node types.
const CLASS_DEFS: &[(&str, &str)] = &[
    ("api", "fill:#e1f5ff,stroke:#01579b,color:#01579b"),
    ("screen", "fill:#f3e5f5,stroke:#4a148c,color:#4a148c"),
    ("database", "fill:#e8f5e9,stroke:#1b5e20,color:#1b5e20"),
    ("service", "fill:#fff3e0,stroke:#e65100,color:#e65100"),
    ("queue", "fill:#fce4ec,stroke:#880e4f,color:#880e4f"),
];

/// Render a `graph TD` diagram.
///
/// With `node_ids`, only those nodes (unknown ids are ignored) and the edges
/// running between them are drawn.
pub fn generate_mermaid(graph: &GraphStore, node_ids: Option<&[String]>) -> String {
    let subset: Option<HashSet<&str>> = node_ids.map(|ids| {
        ids.iter()
            .map(String::as_str)
            .filter(|id| graph.contains_node(id))
            .collect()
    });
    let included = |id: &str| subset.as_ref().map_or(true, |s| s.contains(id));

    let nodes: Vec<&Node> = graph.nodes().into_iter().filter(|n| included(&n.id)).collect();
    let ids = diagram_ids(&nodes);
    let diagram_id = |id: &str| ids.get(id).cloned().unwrap_or_else(|| mermaid_id(id));

    let mut out = String::from("graph TD\n");

    for node in &nodes {
        out.push_str(&format!("    {}\n", node_line(node, &diagram_id(&node.id))));
    }

    out.push('\n');

    for edge in graph
        .edges()
        .into_iter()
        .filter(|e| included(&e.from_id) && included(&e.to_id))
    {
        out.push_str(&format!(
            "    {} -->|{}| {}\n",
            diagram_id(&edge.from_id),
            edge.relationship,
            diagram_id(&edge.to_id)
        ));
    }

    out.push('\n');
    for (class, style) in CLASS_DEFS {
        out.push_str(&format!("    classDef {} {}\n", class, style));
    }

    out
}

fn node_line(node: &Node, id: &str) -> String {
    let label = escape_label(&node.name);
    match node.node_type {
        NodeType::Api => format!("{}[\"{}\"]:::api", id, label),
        NodeType::Screen => format!("{}(\"{}\"):::screen", id, label),
        NodeType::Database => format!("{}[(\"{}\")]:::database", id, label),
        NodeType::Service => format!("{}[[\"{}\"]]:::service", id, label),
        NodeType::Queue => format!("{}>\"{}\"]:::queue", id, label),
        _ => format!("{}[\"{}\"]", id, label),
    }
}

/// Map each node id to a distinct Mermaid identifier.
///
/// Ids that are already valid keep their spelling. Rewritten ids that would
/// clash with another node get a `_{n}` suffix.
fn diagram_ids<'a>(nodes: &[&'a Node]) -> HashMap<&'a str, String> {
    let mut taken: HashSet<String> = nodes
        .iter()
        .filter(|n| mermaid_id(&n.id) == n.id)
        .map(|n| n.id.clone())
        .collect();

    let mut ids = HashMap::with_capacity(nodes.len());
    for node in nodes {
        let base = mermaid_id(&node.id);
        if base == node.id {
            ids.insert(node.id.as_str(), base);
            continue;
        }
        let mut candidate = base.clone();
        let mut n = 1;
        while taken.contains(&candidate) {
            candidate = format!("{}_{}", base, n);
            n += 1;
        }
        taken.insert(candidate.clone());
        ids.insert(node.id.as_str(), candidate);
    }
    ids
}

/// Mermaid identifiers allow letters, digits, `-` and `_`.
fn mermaid_id(id: &str) -> String {
    id.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

fn escape_label(name: &str) -> String {
    name.replace('"', "'").replace('[', "(").replace(']', ")")
}
