//! `codeatlas graph` subcommands

use crate::cli::print_json;
use crate::graph::KnowledgeGraph;
use anyhow::Result;
use clap::{Subcommand, ValueEnum};
use serde_json::json;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PathAlgorithm {
    Bfs,
    Dfs,
    Dijkstra,
}

#[derive(Subcommand)]
pub enum GraphCommand {
    /// Node, edge, and component counts
    Stats,
    /// A path between two functions
    Path {
        from: String,
        to: String,
        #[arg(long, value_enum, default_value = "bfs")]
        algorithm: PathAlgorithm,
        /// Hop bound for breadth-first search
        #[arg(long)]
        max_depth: Option<usize>,
    },
    /// All simple paths between two functions
    Allpaths {
        from: String,
        to: String,
        #[arg(long, default_value_t = 10)]
        max_len: usize,
    },
    /// Nodes within k hops of a function
    Neighborhood {
        node: String,
        #[arg(long, default_value_t = 2)]
        hops: usize,
    },
    /// Cycles in the call graph
    Cycles,
    /// Reachability-based node groupings
    Components,
    /// Files affected when a file changes
    Impact {
        file: String,
        #[arg(long, default_value_t = 3)]
        hops: usize,
    },
    /// Longest acyclic call chain
    Critical,
    /// DOT export, optionally restricted to the named nodes
    Dot { nodes: Vec<String> },
}

pub fn handle(graph: &KnowledgeGraph, command: GraphCommand) -> Result<()> {
    match command {
        GraphCommand::Stats => print_json(&graph.get_stats()),
        GraphCommand::Path {
            from,
            to,
            algorithm,
            max_depth,
        } => {
            let path = match algorithm {
                PathAlgorithm::Bfs => graph.bfs_path(&from, &to, max_depth),
                PathAlgorithm::Dfs => graph.dfs_path(&from, &to),
                PathAlgorithm::Dijkstra => graph.dijkstra(&from, &to),
            };
            print_json(&json!({"from": from, "to": to, "path": path}))
        }
        GraphCommand::Allpaths { from, to, max_len } => {
            let paths = graph.all_paths(&from, &to, max_len);
            print_json(&json!({"from": from, "to": to, "count": paths.len(), "paths": paths}))
        }
        GraphCommand::Neighborhood { node, hops } => print_json(&graph.neighborhood(&node, hops)),
        GraphCommand::Cycles => print_json(&graph.find_cycles()),
        GraphCommand::Components => print_json(&graph.reachability_components()),
        GraphCommand::Impact { file, hops } => {
            let affected = graph.get_impact_radius(&file, hops);
            print_json(&json!({"file": file, "hops": hops, "affected": affected}))
        }
        GraphCommand::Critical => print_json(&json!({"path": graph.critical_path()})),
        GraphCommand::Dot { nodes } => {
            let subgraph = if nodes.is_empty() {
                None
            } else {
                Some(nodes.as_slice())
            };
            println!("{}", graph.to_dot(subgraph));
            Ok(())
        }
    }
}
