//! Structural smells: long functions, deep call chains, singletons
//!
//! Long functions are estimated from descriptor line numbers (the span
//! between repeated declarations of one name), deep call chains from k-hop
//! neighborhoods,
//! and singletons from a textual heuristic over the raw symbol descriptors.

use crate::detectors::PatternDetector;
use crate::index::SymbolDescriptor;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// A function spanning more lines than the threshold allows (estimated)
#[derive(Debug, Clone, Serialize)]
pub struct LongFunction {
    pub file: String,
    pub name: String,
    /// Span between the first and last declaration line of the same name;
    /// an upper bound on the function body
    pub estimated_lines: u32,
}

/// A node whose forward call chain reaches the configured depth
#[derive(Debug, Clone, Serialize)]
pub struct DeepCallChain {
    pub root: String,
    pub depth: usize,
    /// Number of nodes at exactly that depth
    pub frontier: usize,
}

/// A probable singleton, matched textually
#[derive(Debug, Clone, Serialize)]
pub struct Singleton {
    pub name: String,
    pub file: String,
    pub confidence: String,
}

fn singleton_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"getInstance|[sS]ingleton|INSTANCE").expect("singleton pattern is valid")
    })
}

impl PatternDetector<'_> {
    /// Functions whose estimated line span exceeds the configured threshold.
    ///
    /// The estimate needs the same name declared on more than one line in
    /// one file (overloads, re-declarations); the span between the first and
    /// last occurrence bounds the body. Names declared once are never
    /// flagged, since the descriptor carries no end line.
    pub fn detect_long_functions(&self) -> Vec<LongFunction> {
        let threshold = self.config.thresholds.long_function_lines;
        let mut long = Vec::new();

        for path in self.graph.file_paths() {
            let Some(file) = self.graph.file(path) else {
                continue;
            };
            let mut lines_by_name: BTreeMap<String, Vec<u32>> = BTreeMap::new();
            for raw in &file.symbols {
                let d = SymbolDescriptor::parse(raw);
                if d.line > 0 {
                    lines_by_name.entry(d.name).or_default().push(d.line);
                }
            }

            for (name, lines) in lines_by_name {
                if lines.len() < 2 {
                    continue;
                }
                let first = lines.iter().min().copied().unwrap_or(0);
                let last = lines.iter().max().copied().unwrap_or(0);
                let span = last.saturating_sub(first);
                if span > threshold {
                    long.push(LongFunction {
                        file: path.to_string(),
                        name,
                        estimated_lines: span,
                    });
                }
            }
        }
        long.sort_by(|a, b| {
            b.estimated_lines
                .cmp(&a.estimated_lines)
                .then_with(|| a.name.cmp(&b.name))
        });
        long
    }

    /// Nodes whose forward neighborhood still has members at the configured
    /// depth, top 10 by frontier width.
    pub fn detect_deep_call_chains(&self) -> Vec<DeepCallChain> {
        let depth = self.config.thresholds.deep_nesting_depth;
        let mut chains: Vec<DeepCallChain> = self
            .graph
            .node_names()
            .iter()
            .filter_map(|name| {
                let hood = self.graph.neighborhood(name, depth);
                let frontier = hood.levels.get(depth)?;
                Some(DeepCallChain {
                    root: name.to_string(),
                    depth,
                    frontier: frontier.len(),
                })
            })
            .collect();
        chains.sort_by(|a, b| b.frontier.cmp(&a.frontier).then_with(|| a.root.cmp(&b.root)));
        chains.truncate(10);
        chains
    }

    /// Symbols whose raw descriptor text matches singleton naming patterns.
    /// A pure textual heuristic; confidence is reported as high because the
    /// matched names are rarely anything else.
    pub fn detect_singletons(&self) -> Vec<Singleton> {
        let mut singletons = Vec::new();
        for path in self.graph.file_paths() {
            let Some(file) = self.graph.file(path) else {
                continue;
            };
            for raw in &file.symbols {
                if singleton_regex().is_match(raw) {
                    singletons.push(Singleton {
                        name: SymbolDescriptor::name_of(raw).to_string(),
                        file: path.to_string(),
                        confidence: "high".to_string(),
                    });
                }
            }
        }
        singletons
    }
}

#[cfg(test)]
mod tests {
    use crate::config::AnalysisConfig;
    use crate::detectors::PatternDetector;
    use crate::graph::testutil::graph_from;

    #[test]
    fn test_long_function_span() {
        // "big" is declared at lines 1 and 140; "small" at 150 and 160.
        let (graph, _f) = graph_from(
            &[(
                "lib/a.ts",
                &[
                    "big:1:():void:",
                    "big:140:():void:",
                    "small:150:():void:",
                    "small:160:():void:",
                ],
            )],
            &[],
            &[],
        );
        let config = AnalysisConfig::default();
        let detector = PatternDetector::new(&graph, &config);
        let long = detector.detect_long_functions();

        assert_eq!(long.len(), 1);
        assert_eq!(long[0].name, "big");
        assert_eq!(long[0].estimated_lines, 139);
    }

    #[test]
    fn test_distinct_adjacent_symbols_never_flagged() {
        // Two different names far apart are not a span; the estimate only
        // exists for names declared more than once.
        let (graph, _f) = graph_from(
            &[("lib/a.ts", &["alpha:1:():void:", "beta:150:():void:"])],
            &[],
            &[],
        );
        let config = AnalysisConfig::default();
        let detector = PatternDetector::new(&graph, &config);
        assert!(detector.detect_long_functions().is_empty());
    }

    #[test]
    fn test_single_declaration_never_flagged() {
        let (graph, _f) = graph_from(&[("lib/a.ts", &["only:1:():void:"])], &[], &[]);
        let config = AnalysisConfig::default();
        let detector = PatternDetector::new(&graph, &config);
        assert!(detector.detect_long_functions().is_empty());
    }

    #[test]
    fn test_deep_call_chain_at_threshold_depth() {
        // Chain of 6 nodes: a's neighborhood has a level at depth 5.
        let (graph, _f) = graph_from(
            &[],
            &[("a", "b"), ("b", "c"), ("c", "d"), ("d", "e"), ("e", "f")],
            &[],
        );
        let config = AnalysisConfig::default();
        let detector = PatternDetector::new(&graph, &config);
        let chains = detector.detect_deep_call_chains();

        assert_eq!(chains.len(), 1);
        assert_eq!(chains[0].root, "a");
        assert_eq!(chains[0].depth, 5);
        assert_eq!(chains[0].frontier, 1);
    }

    #[test]
    fn test_singleton_textual_match() {
        let (graph, _f) = graph_from(
            &[(
                "lib/db.ts",
                &["getInstance:3:():Database:", "helper:10:():void:"],
            )],
            &[],
            &[],
        );
        let config = AnalysisConfig::default();
        let detector = PatternDetector::new(&graph, &config);
        let singletons = detector.detect_singletons();

        assert_eq!(singletons.len(), 1);
        assert_eq!(singletons[0].name, "getInstance");
        assert_eq!(singletons[0].confidence, "high");
    }
}
