//! Edge commands.

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use archgraph_core::architecture::parse_properties;
use archgraph_core::Relationship;
use archgraph_graph::ArchitectureGraph;

use crate::output;

#[derive(Subcommand)]
pub enum EdgeCommands {
    /// Add or overwrite a relationship
    Add {
        /// Source node ID
        from: String,
        /// Relationship (calls, uses, depends_on, part_of, triggers, reads, writes, emits, consumes)
        relationship: String,
        /// Target node ID
        to: String,
        /// Property as key=value (repeatable)
        #[arg(long = "prop")]
        props: Vec<String>,
    },

    /// Delete a relationship
    Delete {
        /// Source node ID
        from: String,
        /// Relationship type
        relationship: String,
        /// Target node ID
        to: String,
    },
}

pub async fn execute(cmd: EdgeCommands, graph: &ArchitectureGraph, json: bool) -> Result<()> {
    match cmd {
        EdgeCommands::Add {
            from,
            relationship,
            to,
            props,
        } => {
            let relationship: Relationship = relationship.parse()?;
            let properties = parse_properties(props.iter().map(String::as_str))?;
            let synced = graph.add_edge(&from, &to, relationship, properties).await?;

            if json {
                output::print_synced_json(&synced.value, synced.persistence_error.as_ref())?;
            } else {
                println!("{} {}", "Saved relationship".green().bold(), output::edge_label(&synced.value));
                output::print_persistence_warning(synced.persistence_error.as_ref());
            }
            Ok(())
        }

        EdgeCommands::Delete {
            from,
            relationship,
            to,
        } => {
            let relationship: Relationship = relationship.parse()?;
            let synced = graph.delete_edge(&from, &to, relationship).await?;

            if json {
                output::print_synced_json(&synced.value, synced.persistence_error.as_ref())?;
            } else {
                println!("{} {}", "Deleted relationship".green().bold(), output::edge_label(&synced.value));
                output::print_persistence_warning(synced.persistence_error.as_ref());
            }
            Ok(())
        }
    }
}
