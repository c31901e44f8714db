//! `codeatlas patterns` subcommands

use crate::cli::print_json;
use crate::config::AnalysisConfig;
use crate::detectors::PatternDetector;
use crate::graph::KnowledgeGraph;
use anyhow::Result;
use clap::Subcommand;
use serde_json::json;

#[derive(Subcommand)]
pub enum PatternsCommand {
    /// Every detector plus the aggregated health summary
    All,
    /// God objects: files and functions that do too much
    God,
    /// Circular dependencies at file and function level
    Circular,
    /// Dead functions and unused exports
    Dead,
    /// Files with no dependency edges
    Orphans,
    /// Source files without associated tests
    Untested,
    /// Tightly coupled files
    Coupling,
}

pub fn handle(
    graph: &KnowledgeGraph,
    config: &AnalysisConfig,
    command: PatternsCommand,
) -> Result<()> {
    let detector = PatternDetector::new(graph, config);
    match command {
        PatternsCommand::All => print_json(&detector.detect_all()),
        PatternsCommand::God => print_json(&detector.detect_god_objects()),
        PatternsCommand::Circular => print_json(&detector.detect_circular_dependencies()),
        PatternsCommand::Dead => print_json(&json!({
            "dead_functions": detector.detect_dead_functions(),
            "unused_exports": detector.detect_unused_exports(),
        })),
        PatternsCommand::Orphans => print_json(&detector.detect_orphan_files()),
        PatternsCommand::Untested => print_json(&detector.detect_missing_tests()),
        PatternsCommand::Coupling => print_json(&detector.detect_tight_coupling()),
    }
}
