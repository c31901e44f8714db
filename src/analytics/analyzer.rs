//! Centrality report assembly
//!
//! Read-only passes over an initialized knowledge graph. Every ranking sorts
//! descending by score with name as the tie-break, so reports are stable
//! across runs on the same index.

use crate::graph::KnowledgeGraph;
use crate::models::{NodeScore, Risk};
use serde::Serialize;
use tracing::debug;

const PAGE_RANK_ITERATIONS: usize = 20;
const PAGE_RANK_DAMPING: f64 = 0.85;

/// A function ranked by caller count
#[derive(Debug, Clone, Serialize)]
pub struct MostCalled {
    pub name: String,
    pub callers: usize,
    pub file: Option<String>,
}

/// A function ranked by callee count
#[derive(Debug, Clone, Serialize)]
pub struct MostCalling {
    pub name: String,
    pub calls: usize,
}

/// Combined degree centrality, Euclidean norm of in and out degree
#[derive(Debug, Clone, Serialize)]
pub struct CombinedDegree {
    pub name: String,
    pub in_degree: usize,
    pub out_degree: usize,
    pub combined: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FunctionCentrality {
    pub most_called: Vec<MostCalled>,
    pub most_calling: Vec<MostCalling>,
    pub by_combined: Vec<CombinedDegree>,
}

/// A file ranked by one of the file-level centrality measures
#[derive(Debug, Clone, Serialize)]
pub struct FileScore {
    pub file: String,
    pub score: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileCentrality {
    pub by_imports: Vec<FileScore>,
    pub by_consumers: Vec<FileScore>,
    /// Combined weight: consumers count double since being depended on is
    /// the riskier direction
    pub by_combined: Vec<FileScore>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HotspotKind {
    Function,
    File,
}

/// A high-risk node: heavily used and heavily depending
#[derive(Debug, Clone, Serialize)]
pub struct Hotspot {
    pub kind: HotspotKind,
    pub name: String,
    pub file: Option<String>,
    pub centrality: usize,
    pub dependencies: usize,
    pub risk_score: f64,
    pub risk: Risk,
    pub recommendation: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TraversedPath {
    pub from: String,
    pub to: String,
    pub path: Vec<String>,
    pub length: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CriticalPaths {
    /// Longest acyclic call chain, absent on cyclic graphs
    pub longest: Option<Vec<String>>,
    /// Shortest paths between the most-called functions
    pub most_traversed: Vec<TraversedPath>,
    /// Paths from entry points into the top hotspots
    pub entry_to_hotspot: Vec<TraversedPath>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BottleneckKind {
    /// High betweenness and wide impact: most flows cross here
    CriticalPath,
    /// High betweenness: coordinates otherwise separate flows
    CoordinationPoint,
    /// Wide impact radius without dominating path traffic
    Hub,
    /// On some shortest paths but neither dominant nor wide
    Bridge,
}

#[derive(Debug, Clone, Serialize)]
pub struct Bottleneck {
    pub node: String,
    pub betweenness: f64,
    pub impact_radius: usize,
    pub kind: BottleneckKind,
}

/// The full centrality report
#[derive(Debug, Clone, Serialize)]
pub struct CentralityReport {
    pub functions: FunctionCentrality,
    pub files: FileCentrality,
    pub hotspots: Vec<Hotspot>,
    pub entry_points: Vec<String>,
    pub critical_paths: CriticalPaths,
    pub bottlenecks: Vec<Bottleneck>,
    pub page_rank: Vec<NodeScore>,
    pub betweenness: Vec<NodeScore>,
    pub closeness: Vec<NodeScore>,
}

/// Analytics over an initialized knowledge graph
pub struct CentralityAnalyzer<'a> {
    graph: &'a KnowledgeGraph,
    betweenness_samples: usize,
}

impl<'a> CentralityAnalyzer<'a> {
    pub fn new(graph: &'a KnowledgeGraph, betweenness_samples: usize) -> Self {
        Self {
            graph,
            betweenness_samples,
        }
    }

    /// Function-level degree centrality rankings.
    pub fn calculate_function_centrality(&self, limit: usize) -> FunctionCentrality {
        let most_called = self
            .graph
            .top_by_in_degree(limit)
            .into_iter()
            .filter(|(_, count)| *count > 0)
            .map(|(name, callers)| {
                let file = self.graph.function(&name).and_then(|f| f.file.clone());
                MostCalled {
                    name,
                    callers,
                    file,
                }
            })
            .collect();
        let most_calling = self
            .graph
            .top_by_out_degree(limit)
            .into_iter()
            .filter(|(_, count)| *count > 0)
            .map(|(name, calls)| MostCalling { name, calls })
            .collect();

        let mut by_combined: Vec<CombinedDegree> = self
            .graph
            .node_names()
            .iter()
            .map(|name| {
                let in_degree = self.graph.in_degree(name);
                let out_degree = self.graph.out_degree(name);
                CombinedDegree {
                    name: name.to_string(),
                    in_degree,
                    out_degree,
                    combined: ((in_degree * in_degree + out_degree * out_degree) as f64).sqrt(),
                }
            })
            .collect();
        by_combined.sort_by(|a, b| {
            b.combined
                .partial_cmp(&a.combined)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.name.cmp(&b.name))
        });
        by_combined.truncate(limit);

        FunctionCentrality {
            most_called,
            most_calling,
            by_combined,
        }
    }

    /// File-level centrality rankings by imports, consumers, and a weighted
    /// combination.
    pub fn calculate_file_centrality(&self, limit: usize) -> FileCentrality {
        let files: Vec<&str> = self
            .graph
            .file_paths()
            .into_iter()
            .filter(|f| looks_like_path(f))
            .collect();

        let rank = |score_of: &dyn Fn(&str) -> usize| -> Vec<FileScore> {
            let mut ranked: Vec<FileScore> = files
                .iter()
                .map(|&file| FileScore {
                    file: file.to_string(),
                    score: score_of(file),
                })
                .filter(|fs| fs.score > 0)
                .collect();
            ranked.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.file.cmp(&b.file)));
            ranked.truncate(limit);
            ranked
        };

        let imports_of =
            |file: &str| self.graph.file(file).map(|f| f.imports.len()).unwrap_or(0);
        let consumers_of =
            |file: &str| self.graph.file(file).map(|f| f.consumers.len()).unwrap_or(0);

        FileCentrality {
            by_imports: rank(&imports_of),
            by_consumers: rank(&consumers_of),
            by_combined: rank(&|file| consumers_of(file) * 2 + imports_of(file)),
        }
    }

    /// Risk-scored hotspots across functions and files.
    ///
    /// Risk is 0.7 weighted on normalized centrality and 0.3 on normalized
    /// dependency count, mapped onto a 0-100 scale and banded.
    pub fn identify_hotspots(&self, limit: usize) -> Vec<Hotspot> {
        let mut hotspots = Vec::new();

        for (name, callers) in self.graph.top_by_in_degree(limit) {
            if callers == 0 {
                continue;
            }
            let callees = self.graph.out_degree(&name);
            let (risk_score, risk) = calculate_risk(callers as f64, callees as f64);
            hotspots.push(Hotspot {
                kind: HotspotKind::Function,
                file: self.graph.function(&name).and_then(|f| f.file.clone()),
                recommendation: function_recommendation(callers, callees),
                name,
                centrality: callers,
                dependencies: callees,
                risk_score,
                risk,
            });
        }

        for path in self.graph.file_paths() {
            let Some(file) = self.graph.file(path) else {
                continue;
            };
            let consumers = file.consumers.len();
            if consumers == 0 {
                continue;
            }
            let imports = file.imports.len();
            let (risk_score, risk) = calculate_risk(consumers as f64, imports as f64);
            hotspots.push(Hotspot {
                kind: HotspotKind::File,
                name: path.to_string(),
                file: None,
                centrality: consumers,
                dependencies: imports,
                risk_score,
                risk,
                recommendation: file_recommendation(consumers, imports),
            });
        }

        hotspots.sort_by(|a, b| {
            b.risk_score
                .partial_cmp(&a.risk_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.name.cmp(&b.name))
        });
        hotspots.truncate(limit);
        hotspots
    }

    /// Functions nothing calls but that call others, sorted by name.
    pub fn find_entry_points(&self) -> Vec<String> {
        let mut entries: Vec<String> = self
            .graph
            .node_names()
            .iter()
            .filter(|name| self.graph.in_degree(name) == 0 && self.graph.out_degree(name) > 0)
            .map(|name| name.to_string())
            .collect();
        entries.sort_unstable();
        entries
    }

    /// Structurally important call chains.
    pub fn find_critical_paths(&self) -> CriticalPaths {
        let top: Vec<String> = self
            .graph
            .top_by_in_degree(5)
            .into_iter()
            .map(|(name, _)| name)
            .collect();

        let mut most_traversed = Vec::new();
        for (i, from) in top.iter().enumerate() {
            for to in top.iter().skip(i + 1) {
                if let Some(path) = self.graph.dijkstra(from, to) {
                    if path.len() > 2 {
                        most_traversed.push(TraversedPath {
                            from: from.clone(),
                            to: to.clone(),
                            length: path.len(),
                            path,
                        });
                    }
                }
            }
        }

        let entries = self.find_entry_points();
        let hotspots = self.identify_hotspots(3);
        let mut entry_to_hotspot = Vec::new();
        for entry in entries.iter().take(3) {
            for hotspot in hotspots.iter().filter(|h| h.kind == HotspotKind::Function) {
                if let Some(path) = self.graph.dijkstra(entry, &hotspot.name) {
                    if path.len() > 1 {
                        entry_to_hotspot.push(TraversedPath {
                            from: entry.clone(),
                            to: hotspot.name.clone(),
                            length: path.len(),
                            path,
                        });
                    }
                }
            }
        }

        CriticalPaths {
            longest: self.graph.critical_path(),
            most_traversed,
            entry_to_hotspot,
        }
    }

    /// Classified bottlenecks from the top betweenness nodes.
    pub fn identify_bottlenecks(&self, limit: usize) -> Vec<Bottleneck> {
        self.graph
            .approximate_betweenness(limit, self.betweenness_samples)
            .into_iter()
            .map(|NodeScore { node, score }| {
                // 2-hop neighborhood size, node included; the kind
                // thresholds below are calibrated against this radius.
                let radius = self.graph.neighborhood(&node, 2).nodes.len();
                let kind = if score > 50.0 && radius > 30 {
                    BottleneckKind::CriticalPath
                } else if score > 30.0 {
                    BottleneckKind::CoordinationPoint
                } else if radius > 40 {
                    BottleneckKind::Hub
                } else {
                    BottleneckKind::Bridge
                };
                Bottleneck {
                    node,
                    betweenness: score,
                    impact_radius: radius,
                    kind,
                }
            })
            .collect()
    }

    pub fn calculate_page_rank(&self) -> Vec<NodeScore> {
        self.graph.page_rank(PAGE_RANK_ITERATIONS, PAGE_RANK_DAMPING)
    }

    pub fn calculate_betweenness(&self, limit: usize) -> Vec<NodeScore> {
        self.graph.approximate_betweenness(limit, self.betweenness_samples)
    }

    pub fn calculate_closeness(&self, limit: usize) -> Vec<NodeScore> {
        self.graph.closeness(limit)
    }

    /// Everything at once.
    pub fn analyze_all(&self, limit: usize) -> CentralityReport {
        debug!("running full centrality analysis, limit {}", limit);
        CentralityReport {
            functions: self.calculate_function_centrality(limit),
            files: self.calculate_file_centrality(limit),
            hotspots: self.identify_hotspots(limit),
            entry_points: self.find_entry_points(),
            critical_paths: self.find_critical_paths(),
            bottlenecks: self.identify_bottlenecks(limit),
            page_rank: self.calculate_page_rank(),
            betweenness: self.calculate_betweenness(limit),
            closeness: self.calculate_closeness(limit),
        }
    }
}

/// Filter out index keys that are not file paths (bare symbol aliases and
/// similar artifacts occasionally land in the file map).
fn looks_like_path(name: &str) -> bool {
    name.contains('/') || name.contains('.')
}

/// Combine normalized centrality and dependency pressure into a 0-100 risk
/// score. Centrality saturates at 100 uses, dependencies at 20.
fn calculate_risk(centrality: f64, dependencies: f64) -> (f64, Risk) {
    let score = ((centrality / 100.0).min(1.0) * 0.7 + (dependencies / 20.0).min(1.0) * 0.3) * 100.0;
    (score, Risk::from_score(score))
}

fn function_recommendation(callers: usize, callees: usize) -> String {
    if callers > 20 {
        "Heavily used. Consider a facade to decouple callers from its interface.".to_string()
    } else if callees > 15 {
        "Calls many functions. Refactor to reduce its dependencies.".to_string()
    } else {
        "Monitor for changes; breaking this affects multiple callers.".to_string()
    }
}

fn file_recommendation(consumers: usize, imports: usize) -> String {
    if consumers > 15 {
        "Widely consumed. Keep its interface backward compatible.".to_string()
    } else if imports > 20 {
        "Imports too much. Split this module.".to_string()
    } else {
        "Monitor for changes; downstream files depend on it.".to_string()
    }
}
