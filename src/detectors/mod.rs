//! Architectural smell detection
//!
//! One module per smell family, all reading the same initialized knowledge
//! graph with thresholds supplied by `AnalysisConfig`. `detect_all` runs every
//! family and folds the counts into weighted severity scores, a letter health
//! grade, and prioritized recommendations.

mod circular;
mod coupling;
mod dead_code;
mod god_objects;
mod missing_tests;
mod structure;

pub use circular::{CircularDependencies, FileCycle, FunctionCycle};
pub use coupling::CoupledFile;
pub use dead_code::{DeadFunction, OrphanFile, UnusedExport};
pub use god_objects::{GodFile, GodFunction, GodObjects};
pub use missing_tests::MissingTest;
pub use structure::{DeepCallChain, LongFunction, Singleton};

use crate::config::AnalysisConfig;
use crate::graph::KnowledgeGraph;
use crate::models::{Priority, Recommendation};
use serde::Serialize;
use tracing::debug;

/// Weighted severity per smell category
#[derive(Debug, Clone, Default, Serialize)]
pub struct CategoryScores {
    pub circular: usize,
    pub tight_coupling: usize,
    pub god_objects: usize,
    pub missing_tests: usize,
    pub dead_code: usize,
    pub deep_nesting: usize,
    pub long_functions: usize,
    pub orphans: usize,
    pub unused_exports: usize,
    pub singletons: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub scores: CategoryScores,
    pub total_score: usize,
    pub health_grade: String,
    pub recommendations: Vec<Recommendation>,
}

/// Everything the detector suite found
#[derive(Debug, Clone, Serialize)]
pub struct PatternReport {
    pub god_objects: GodObjects,
    pub circular: CircularDependencies,
    pub dead_functions: Vec<DeadFunction>,
    pub orphan_files: Vec<OrphanFile>,
    pub unused_exports: Vec<UnusedExport>,
    pub long_functions: Vec<LongFunction>,
    pub deep_nesting: Vec<DeepCallChain>,
    pub singletons: Vec<Singleton>,
    pub coupling: Vec<CoupledFile>,
    pub missing_tests: Vec<MissingTest>,
    pub summary: Summary,
}

/// Smell detector suite over an initialized knowledge graph
pub struct PatternDetector<'a> {
    pub(crate) graph: &'a KnowledgeGraph,
    pub(crate) config: &'a AnalysisConfig,
}

impl<'a> PatternDetector<'a> {
    pub fn new(graph: &'a KnowledgeGraph, config: &'a AnalysisConfig) -> Self {
        Self { graph, config }
    }

    /// Run every detector and aggregate the results.
    pub fn detect_all(&self) -> PatternReport {
        debug!("running full pattern detection");
        let god_objects = self.detect_god_objects();
        let circular = self.detect_circular_dependencies();
        let dead_functions = self.detect_dead_functions();
        let orphan_files = self.detect_orphan_files();
        let unused_exports = self.detect_unused_exports();
        let long_functions = self.detect_long_functions();
        let deep_nesting = self.detect_deep_call_chains();
        let singletons = self.detect_singletons();
        let coupling = self.detect_tight_coupling();
        let missing_tests = self.detect_missing_tests();

        let scores = CategoryScores {
            circular: (circular.files.len() + circular.functions.len()) * 5,
            tight_coupling: coupling.len() * 4,
            god_objects: (god_objects.files.len() + god_objects.functions.len()) * 3,
            missing_tests: missing_tests.len() * 3,
            dead_code: dead_functions.len() * 2,
            deep_nesting: deep_nesting.len() * 2,
            long_functions: long_functions.len() * 2,
            orphans: orphan_files.len(),
            unused_exports: unused_exports.len(),
            singletons: singletons.len(),
        };
        let total_score = scores.circular
            + scores.tight_coupling
            + scores.god_objects
            + scores.missing_tests
            + scores.dead_code
            + scores.deep_nesting
            + scores.long_functions
            + scores.orphans
            + scores.unused_exports
            + scores.singletons;

        let recommendations = build_recommendations(
            circular.files.len() + circular.functions.len(),
            god_objects.files.len() + god_objects.functions.len(),
            missing_tests.len(),
            dead_functions.len(),
        );

        PatternReport {
            god_objects,
            circular,
            dead_functions,
            orphan_files,
            unused_exports,
            long_functions,
            deep_nesting,
            singletons,
            coupling,
            missing_tests,
            summary: Summary {
                scores,
                total_score,
                health_grade: health_grade(total_score),
                recommendations,
            },
        }
    }
}

fn health_grade(total: usize) -> String {
    if total < 10 {
        "A - Excellent".to_string()
    } else if total < 25 {
        "B - Good".to_string()
    } else if total < 50 {
        "C - Fair".to_string()
    } else if total < 100 {
        "D - Poor".to_string()
    } else {
        "F - Critical".to_string()
    }
}

fn build_recommendations(
    circular: usize,
    god_objects: usize,
    missing_tests: usize,
    dead_code: usize,
) -> Vec<Recommendation> {
    let mut recs = Vec::new();
    if circular > 0 {
        recs.push(Recommendation {
            priority: Priority::High,
            issue: format!("{} circular dependencies", circular),
            action: "Break cycles by extracting shared code into a separate module".to_string(),
        });
    }
    if god_objects > 15 {
        recs.push(Recommendation {
            priority: Priority::High,
            issue: format!("{} god objects", god_objects),
            action: "Split oversized files and functions along responsibility lines".to_string(),
        });
    }
    if missing_tests > 20 {
        recs.push(Recommendation {
            priority: Priority::Medium,
            issue: format!("{} files without tests", missing_tests),
            action: "Add test coverage, starting with the most-consumed files".to_string(),
        });
    }
    if dead_code > 10 {
        recs.push(Recommendation {
            priority: Priority::Low,
            issue: format!("{} dead functions", dead_code),
            action: "Remove unreferenced functions or wire them into entry points".to_string(),
        });
    }
    recs
}
