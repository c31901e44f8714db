//! `codeatlas centrality` subcommands

use crate::analytics::CentralityAnalyzer;
use crate::cli::print_json;
use crate::config::AnalysisConfig;
use crate::graph::KnowledgeGraph;
use anyhow::Result;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum CentralityCommand {
    /// Full centrality report
    All {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Function-level degree rankings
    Functions {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// File-level dependency rankings
    Files {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Risk-scored hotspots
    Hotspots {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// PageRank scores
    Pagerank,
    /// Sampled betweenness centrality
    Betweenness {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Closeness centrality
    Closeness {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Classified bottlenecks
    Bottlenecks {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Functions nothing calls
    Entrypoints,
}

pub fn handle(
    graph: &KnowledgeGraph,
    config: &AnalysisConfig,
    command: CentralityCommand,
) -> Result<()> {
    let analyzer = CentralityAnalyzer::new(graph, config.thresholds.betweenness_samples);
    match command {
        CentralityCommand::All { limit } => print_json(&analyzer.analyze_all(limit)),
        CentralityCommand::Functions { limit } => {
            print_json(&analyzer.calculate_function_centrality(limit))
        }
        CentralityCommand::Files { limit } => print_json(&analyzer.calculate_file_centrality(limit)),
        CentralityCommand::Hotspots { limit } => print_json(&analyzer.identify_hotspots(limit)),
        CentralityCommand::Pagerank => print_json(&analyzer.calculate_page_rank()),
        CentralityCommand::Betweenness { limit } => {
            print_json(&analyzer.calculate_betweenness(limit))
        }
        CentralityCommand::Closeness { limit } => print_json(&analyzer.calculate_closeness(limit)),
        CentralityCommand::Bottlenecks { limit } => {
            print_json(&analyzer.identify_bottlenecks(limit))
        }
        CentralityCommand::Entrypoints => print_json(&analyzer.find_entry_points()),
    }
}
