//! Centrality metrics over the call graph
//!
//! Degree, PageRank, sampled betweenness, and closeness. Scores are
//! deterministic for a given graph: ties break on node name, and the
//! betweenness sampling stride is fixed.

use crate::graph::knowledge::KnowledgeGraph;
use crate::models::NodeScore;
use petgraph::graph::NodeIndex;
use petgraph::Direction;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use tracing::debug;

/// Node-count bound per pairwise path search in betweenness sampling. Keeps
/// the exhaustive enumeration tractable on dense graphs.
const BETWEENNESS_PATH_LEN: usize = 5;

impl KnowledgeGraph {
    /// Nodes ranked by caller count, descending; ties break on name.
    pub fn top_by_in_degree(&self, limit: usize) -> Vec<(String, usize)> {
        self.top_by_degree(limit, Direction::Incoming)
    }

    /// Nodes ranked by callee count, descending; ties break on name.
    pub fn top_by_out_degree(&self, limit: usize) -> Vec<(String, usize)> {
        self.top_by_degree(limit, Direction::Outgoing)
    }

    fn top_by_degree(&self, limit: usize, dir: Direction) -> Vec<(String, usize)> {
        let mut ranked: Vec<(String, usize)> = self
            .graph
            .node_indices()
            .map(|idx| {
                (
                    self.graph[idx].name.clone(),
                    self.graph.neighbors_directed(idx, dir).count(),
                )
            })
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(limit);
        ranked
    }

    /// Raw PageRank scores before presentation scaling.
    ///
    /// Uniform 1/N initialization, then `iterations` rounds of
    /// `(1-d)/N + d * sum(rank(caller)/out_degree(caller))`. Sink nodes leak
    /// mass, so the scores only sum to 1.0 on graphs without dangling nodes.
    pub fn page_rank_scores(&self, iterations: usize, damping: f64) -> FxHashMap<String, f64> {
        let n = self.graph.node_count();
        if n == 0 {
            return FxHashMap::default();
        }

        let indices: Vec<NodeIndex> = self.graph.node_indices().collect();
        let out_degrees: FxHashMap<NodeIndex, usize> = indices
            .iter()
            .map(|&idx| {
                (
                    idx,
                    self.graph.neighbors_directed(idx, Direction::Outgoing).count(),
                )
            })
            .collect();

        let mut ranks: FxHashMap<NodeIndex, f64> =
            indices.iter().map(|&idx| (idx, 1.0 / n as f64)).collect();
        let base = (1.0 - damping) / n as f64;

        for _ in 0..iterations {
            let mut next: FxHashMap<NodeIndex, f64> =
                indices.iter().map(|&idx| (idx, base)).collect();
            for &idx in &indices {
                let out = out_degrees[&idx];
                if out == 0 {
                    continue;
                }
                let share = damping * ranks[&idx] / out as f64;
                for callee in self.graph.neighbors_directed(idx, Direction::Outgoing) {
                    if let Some(rank) = next.get_mut(&callee) {
                        *rank += share;
                    }
                }
            }
            ranks = next;
        }

        ranks
            .into_iter()
            .map(|(idx, rank)| (self.graph[idx].name.clone(), rank))
            .collect()
    }

    /// Top 20 nodes by PageRank, scaled by 1000 for readability.
    pub fn page_rank(&self, iterations: usize, damping: f64) -> Vec<NodeScore> {
        let mut scored: Vec<NodeScore> = self
            .page_rank_scores(iterations, damping)
            .into_iter()
            .map(|(node, rank)| NodeScore {
                node,
                score: rank * 1000.0,
            })
            .collect();
        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.node.cmp(&b.node))
        });
        scored.truncate(20);
        scored
    }

    /// Approximate betweenness centrality by sampled pairwise path counting.
    ///
    /// Samples up to `sample_size` nodes with an even stride, enumerates
    /// short simple paths between every sampled pair, and credits each
    /// intermediate node 1/sigma per shortest path it sits on. Scores are
    /// normalized so the maximum is 100. This is an approximation: unsampled
    /// pairs contribute nothing, and paths longer than the internal bound are
    /// invisible.
    pub fn approximate_betweenness(&self, limit: usize, sample_size: usize) -> Vec<NodeScore> {
        let indices: Vec<NodeIndex> = self.graph.node_indices().collect();
        if indices.len() < 3 || sample_size == 0 {
            return Vec::new();
        }

        let stride = (indices.len() / sample_size).max(1);
        let samples: Vec<NodeIndex> = indices.iter().copied().step_by(stride).take(sample_size).collect();
        debug!(
            "betweenness sampling {} of {} nodes",
            samples.len(),
            indices.len()
        );

        // Each source runs independently with a private accumulator; the
        // per-source maps merge after the parallel section.
        let partials: Vec<FxHashMap<String, f64>> = samples
            .par_iter()
            .map(|&source| {
                let mut local: FxHashMap<String, f64> = FxHashMap::default();
                let source_name = self.graph[source].name.as_str();
                for &target in &samples {
                    if source == target {
                        continue;
                    }
                    let paths = self.all_paths(
                        source_name,
                        self.graph[target].name.as_str(),
                        BETWEENNESS_PATH_LEN,
                    );
                    let Some(min_len) = paths.iter().map(|p| p.len()).min() else {
                        continue;
                    };
                    let shortest: Vec<&Vec<String>> =
                        paths.iter().filter(|p| p.len() == min_len).collect();
                    let credit = 1.0 / shortest.len() as f64;
                    for path in shortest {
                        for via in &path[1..path.len() - 1] {
                            *local.entry(via.clone()).or_insert(0.0) += credit;
                        }
                    }
                }
                local
            })
            .collect();

        let mut scores: FxHashMap<String, f64> = FxHashMap::default();
        for partial in partials {
            for (node, score) in partial {
                *scores.entry(node).or_insert(0.0) += score;
            }
        }

        let max = scores.values().cloned().fold(0.0_f64, f64::max);
        if max == 0.0 {
            return Vec::new();
        }
        let mut ranked: Vec<NodeScore> = scores
            .into_iter()
            .map(|(node, score)| NodeScore {
                node,
                score: score / max * 100.0,
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.node.cmp(&b.node))
        });
        ranked.truncate(limit);
        ranked
    }

    /// Closeness centrality: reachable-node count divided by total hop
    /// distance, scaled by 100. Nodes reaching nothing score 0.
    pub fn closeness(&self, limit: usize) -> Vec<NodeScore> {
        let mut ranked: Vec<NodeScore> = self
            .graph
            .node_indices()
            .map(|idx| {
                let distances = self.shortest_distances(idx);
                let total: usize = distances.values().sum();
                let reachable = distances.len() - 1; // excluding self at distance 0
                NodeScore {
                    node: self.graph[idx].name.clone(),
                    score: if total == 0 {
                        0.0
                    } else {
                        reachable as f64 / total as f64 * 100.0
                    },
                }
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.node.cmp(&b.node))
        });
        ranked.truncate(limit);
        ranked
    }
}

#[cfg(test)]
mod tests {
    use crate::graph::testutil::call_graph;

    #[test]
    fn test_degree_ranking_with_ties() {
        let (graph, _f) = call_graph(&[("a", "c"), ("b", "c"), ("a", "b"), ("c", "d")]);
        let top = graph.top_by_in_degree(10);
        assert_eq!(top[0], ("c".to_string(), 2));
        // b and d both have in-degree 1; name breaks the tie.
        assert_eq!(top[1], ("b".to_string(), 1));
        assert_eq!(top[2], ("d".to_string(), 1));
        assert_eq!(top[3], ("a".to_string(), 0));
    }

    #[test]
    fn test_page_rank_conserves_mass_on_cycle() {
        // Every node has out-degree 1, so no mass leaks at sinks.
        let (graph, _f) = call_graph(&[("a", "b"), ("b", "c"), ("c", "a")]);
        let scores = graph.page_rank_scores(20, 0.85);
        let total: f64 = scores.values().sum();
        assert!((total - 1.0).abs() < 1e-9, "total was {}", total);
        // Symmetric cycle: all ranks equal.
        let first = scores["a"];
        assert!((scores["b"] - first).abs() < 1e-9);
        assert!((scores["c"] - first).abs() < 1e-9);
    }

    #[test]
    fn test_page_rank_favors_called_nodes() {
        let (graph, _f) = call_graph(&[("a", "hub"), ("b", "hub"), ("c", "hub"), ("hub", "a")]);
        let ranked = graph.page_rank(20, 0.85);
        assert_eq!(ranked[0].node, "hub");
    }

    #[test]
    fn test_betweenness_credits_bridge() {
        // All traffic between the two sides crosses "mid".
        let (graph, _f) = call_graph(&[
            ("a", "mid"),
            ("b", "mid"),
            ("mid", "x"),
            ("mid", "y"),
        ]);
        let ranked = graph.approximate_betweenness(10, 50);
        assert_eq!(ranked[0].node, "mid");
        assert!((ranked[0].score - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_betweenness_empty_on_tiny_graph() {
        let (graph, _f) = call_graph(&[("a", "b")]);
        assert!(graph.approximate_betweenness(10, 50).is_empty());
    }

    #[test]
    fn test_closeness_prefers_central_nodes() {
        // a reaches 3 nodes at distances 1,2,3; b reaches 2 at 1,2.
        let (graph, _f) = call_graph(&[("a", "b"), ("b", "c"), ("c", "d")]);
        let ranked = graph.closeness(10);
        let score_of = |name: &str| {
            ranked
                .iter()
                .find(|s| s.node == name)
                .map(|s| s.score)
                .unwrap()
        };
        assert!((score_of("c") - 100.0).abs() < f64::EPSILON);
        assert!((score_of("a") - 50.0).abs() < f64::EPSILON);
        assert!((score_of("d") - 0.0).abs() < f64::EPSILON);
    }
}
