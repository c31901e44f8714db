//! Command-line interface
//!
//! Thin dispatch layer: parse arguments, open the backend, build the graph
//! when a command needs it, and print pretty JSON to stdout. All analysis
//! logic lives in the library modules.

mod centrality;
mod graph;
mod patterns;
mod query;

pub use centrality::CentralityCommand;
pub use graph::GraphCommand;
pub use patterns::PatternsCommand;
pub use query::QueryCommand;

use crate::config::AnalysisConfig;
use crate::graph::KnowledgeGraph;
use crate::index::IndexBackend;
use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "codeatlas",
    version,
    about = "Knowledge graph analytics over extracted code indexes"
)]
pub struct Cli {
    /// Path to the index artifact
    #[arg(
        long,
        global = true,
        default_value = "PROJECT_INDEX.json",
        env = "CODEATLAS_INDEX"
    )]
    pub index: PathBuf,

    /// Log level filter (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn", env = "CODEATLAS_LOG")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Graph structure and traversal queries
    Graph {
        #[command(subcommand)]
        command: GraphCommand,
    },
    /// Centrality and hotspot analysis
    Centrality {
        #[command(subcommand)]
        command: CentralityCommand,
    },
    /// Architectural smell detection
    Patterns {
        #[command(subcommand)]
        command: PatternsCommand,
    },
    /// Raw index queries without graph construction
    Query {
        #[command(subcommand)]
        command: QueryCommand,
    },
}

pub fn run(cli: Cli) -> Result<()> {
    let config_dir = cli.index.parent().unwrap_or_else(|| Path::new("."));
    let config = AnalysisConfig::load(config_dir);
    let backend = IndexBackend::open(&cli.index, &config.index)?;

    match cli.command {
        Commands::Query { command } => query::handle(&backend, command),
        Commands::Graph { command } => {
            let graph = build_graph(backend)?;
            graph::handle(&graph, command)
        }
        Commands::Centrality { command } => {
            let graph = build_graph(backend)?;
            centrality::handle(&graph, &config, command)
        }
        Commands::Patterns { command } => {
            let graph = build_graph(backend)?;
            patterns::handle(&graph, &config, command)
        }
    }
}

fn build_graph(backend: IndexBackend) -> Result<KnowledgeGraph> {
    let mut graph = KnowledgeGraph::new(backend);
    graph.initialize()?;
    Ok(graph)
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
