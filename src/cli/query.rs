//! `codeatlas query` subcommands
//!
//! Raw index queries that skip graph construction entirely; useful for
//! scripting and quick lookups on large indexes.

use crate::cli::print_json;
use crate::index::IndexBackend;
use anyhow::Result;
use clap::Subcommand;
use serde_json::json;

#[derive(Subcommand)]
pub enum QueryCommand {
    /// All indexed file paths
    Files,
    /// Call edges, or the callers/callees of one function
    Calls {
        /// Show only edges touching this function
        function: Option<String>,
    },
    /// Dependency edges
    Deps,
    /// Functions that call others but are never called
    Dead,
    /// Files with no dependency edges
    Orphans,
    /// Most-called functions and most-consumed files
    Hotspots {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Project statistics embedded in the index
    Stats,
    /// Fuzzy file search
    Fuzzy {
        pattern: String,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Test files importing a source file
    Tests {
        file: String,
        #[arg(long, default_value = "__tests__/")]
        test_prefix: String,
    },
    /// Symbols declared in one file
    Symbols { file: String },
    /// The file declaring a symbol
    Whereis { symbol: String },
    /// Ratio of test-looking files to all files
    Coverage,
}

pub fn handle(backend: &IndexBackend, command: QueryCommand) -> Result<()> {
    match command {
        QueryCommand::Files => print_json(&backend.file_keys()),
        QueryCommand::Calls { function: None } => print_json(&backend.call_edges()),
        QueryCommand::Calls {
            function: Some(name),
        } => print_json(&json!({
            "function": name,
            "callers": backend.callers_of(&name),
            "callees": backend.callees_of(&name),
        })),
        QueryCommand::Deps => print_json(&backend.dependency_edges()),
        QueryCommand::Dead => print_json(&backend.dead_functions()),
        QueryCommand::Orphans => print_json(&backend.orphan_files()),
        QueryCommand::Hotspots { limit } => print_json(&json!({
            "most_called": backend.most_called_functions(limit),
            "dependency_hotspots": backend.dependency_hotspots(limit),
        })),
        QueryCommand::Stats => print_json(&backend.stats()),
        QueryCommand::Fuzzy { pattern, limit } => print_json(&backend.fuzzy_search(&pattern, limit)),
        QueryCommand::Tests { file, test_prefix } => {
            print_json(&backend.tests_for_file(&file, &test_prefix))
        }
        QueryCommand::Symbols { file } => print_json(&backend.symbols_for_file(&file)),
        QueryCommand::Whereis { symbol } => print_json(&json!({
            "symbol": symbol,
            "file": backend.find_file_for_symbol(&symbol),
        })),
        QueryCommand::Coverage => print_json(&backend.test_coverage()),
    }
}
