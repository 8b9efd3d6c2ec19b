//! Node commands.

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use archgraph_core::architecture::parse_properties;
use archgraph_core::NodeType;
use archgraph_graph::queries::explore::{list_nodes, DEFAULT_LIST_LIMIT};
use archgraph_graph::ArchitectureGraph;

use crate::output;

#[derive(Subcommand)]
pub enum NodeCommands {
    /// Add a node
    Add {
        /// Unique node ID (e.g. api-create-invoice)
        id: String,
        /// Node type (api, screen, journey, component, service, database, queue, event, model)
        #[arg(short = 't', long = "type")]
        node_type: String,
        /// Display name
        name: String,
        /// Property as key=value (repeatable)
        #[arg(long = "prop")]
        props: Vec<String>,
    },

    /// Show a node
    Get {
        /// Node ID
        id: String,
    },

    /// List nodes
    List {
        /// Only nodes of this type
        #[arg(short = 't', long = "type")]
        node_type: Option<String>,
        /// Maximum number of nodes
        #[arg(long, default_value_t = DEFAULT_LIST_LIMIT)]
        limit: usize,
    },

    /// Delete a node and all its relationships
    Delete {
        /// Node ID
        id: String,
    },
}

pub async fn execute(cmd: NodeCommands, graph: &ArchitectureGraph, json: bool) -> Result<()> {
    match cmd {
        NodeCommands::Add {
            id,
            node_type,
            name,
            props,
        } => {
            let node_type: NodeType = node_type.parse()?;
            let properties = parse_properties(props.iter().map(String::as_str))?;
            let synced = graph.add_node(&id, node_type, &name, properties).await?;

            if json {
                output::print_synced_json(&synced.value, synced.persistence_error.as_ref())?;
            } else {
                println!(
                    "{} {} {}",
                    "Created node".green().bold(),
                    synced.value.id.cyan(),
                    format!("({})", synced.value.node_type).dimmed()
                );
                output::print_persistence_warning(synced.persistence_error.as_ref());
            }
            Ok(())
        }

        NodeCommands::Get { id } => {
            let node = graph
                .get_node(&id)
                .await
                .ok_or_else(|| anyhow::anyhow!("Node '{}' not found", id.trim()))?;
            if json {
                output::print_json(&node)
            } else {
                output::print_node(&node);
                Ok(())
            }
        }

        NodeCommands::List { node_type, limit } => {
            let node_type = node_type.map(|t| t.parse::<NodeType>()).transpose()?;
            let nodes = list_nodes(&*graph.read().await, node_type, limit);
            if json {
                output::print_json(&nodes)
            } else {
                output::print_nodes_table(&nodes);
                Ok(())
            }
        }

        NodeCommands::Delete { id } => {
            let synced = graph.delete_node(&id).await?;
            if json {
                output::print_synced_json(&synced.value, synced.persistence_error.as_ref())?;
            } else {
                println!(
                    "{} {} ({} relationship(s) removed)",
                    "Deleted node".green().bold(),
                    synced.value.node_id.cyan(),
                    synced.value.edges_removed
                );
                output::print_persistence_warning(synced.persistence_error.as_ref());
            }
            Ok(())
        }
    }
}
