//! Circular dependency detection
//!
//! File-level mutual imports found by pairwise comparison, and function-level
//! cycles found by graph traversal.

use crate::detectors::PatternDetector;
use serde::Serialize;

/// Two files importing each other
#[derive(Debug, Clone, Serialize)]
pub struct FileCycle {
    pub a: String,
    pub b: String,
}

/// A cycle in the call graph, closed (first element repeats at the end)
#[derive(Debug, Clone, Serialize)]
pub struct FunctionCycle {
    pub cycle: Vec<String>,
    pub length: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CircularDependencies {
    pub files: Vec<FileCycle>,
    pub functions: Vec<FunctionCycle>,
}

impl PatternDetector<'_> {
    pub fn detect_circular_dependencies(&self) -> CircularDependencies {
        let paths = self.graph.file_paths();
        let mut files = Vec::new();
        // Paths are sorted, so each mutual pair is reported once as (a, b)
        // with a < b.
        for (i, a) in paths.iter().enumerate() {
            let Some(node_a) = self.graph.file(a) else {
                continue;
            };
            for b in paths.iter().skip(i + 1) {
                if node_a.imports.iter().any(|imp| imp == b)
                    && self
                        .graph
                        .file(b)
                        .is_some_and(|node_b| node_b.imports.iter().any(|imp| imp == a))
                {
                    files.push(FileCycle {
                        a: a.to_string(),
                        b: b.to_string(),
                    });
                }
            }
        }

        let functions = self
            .graph
            .find_cycles()
            .into_iter()
            .map(|cycle| FunctionCycle {
                // Closed cycle: hop count is one less than node count.
                length: cycle.len() - 1,
                cycle,
            })
            .collect();

        CircularDependencies { files, functions }
    }
}
