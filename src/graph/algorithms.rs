//! Graph traversal and path algorithms
//!
//! All traversals are iterative with explicit stacks or queues; none recurse,
//! so deep call chains cannot overflow the stack. Operations on absent nodes
//! return empty results rather than failing.

use crate::graph::knowledge::KnowledgeGraph;
use petgraph::graph::NodeIndex;
use petgraph::Direction;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use std::collections::VecDeque;

/// Default expansion budget for exhaustive path enumeration. Bounds worst-case
/// work on dense graphs where the number of simple paths is exponential.
pub const DEFAULT_PATH_BUDGET: usize = 250_000;

/// K-hop forward neighborhood of a node
#[derive(Debug, Clone, Serialize)]
pub struct Neighborhood {
    /// All nodes within k hops, including the origin
    pub nodes: Vec<String>,
    /// Nodes grouped by exact hop distance; `levels[0]` is the origin
    pub levels: Vec<Vec<String>>,
}

const WHITE: u8 = 0;
const GRAY: u8 = 1;
const BLACK: u8 = 2;

impl KnowledgeGraph {
    fn node(&self, name: &str) -> Option<NodeIndex> {
        self.node_ids.get(name).copied()
    }

    fn name_at(&self, idx: NodeIndex) -> &str {
        self.graph[idx].name.as_str()
    }

    /// All nodes reachable from `start` (including `start`), optionally
    /// bounded to `max_depth` hops. Sorted. Empty when `start` is unknown.
    pub fn reachable_from(&self, start: &str, max_depth: Option<usize>) -> Vec<String> {
        let Some(origin) = self.node(start) else {
            return Vec::new();
        };
        let mut visited: FxHashSet<NodeIndex> = FxHashSet::default();
        visited.insert(origin);
        let mut queue = VecDeque::new();
        queue.push_back((origin, 0usize));

        while let Some((current, depth)) = queue.pop_front() {
            if max_depth.is_some_and(|limit| depth >= limit) {
                continue;
            }
            for next in self.graph.neighbors_directed(current, Direction::Outgoing) {
                if visited.insert(next) {
                    queue.push_back((next, depth + 1));
                }
            }
        }

        let mut names: Vec<String> = visited
            .into_iter()
            .map(|idx| self.name_at(idx).to_string())
            .collect();
        names.sort_unstable();
        names
    }

    /// Minimal-hop path from `start` to `target` by level-order search,
    /// optionally bounded to `max_depth` hops.
    pub fn bfs_path(
        &self,
        start: &str,
        target: &str,
        max_depth: Option<usize>,
    ) -> Option<Vec<String>> {
        let origin = self.node(start)?;
        let goal = self.node(target)?;
        if origin == goal {
            return Some(vec![start.to_string()]);
        }

        let mut prev: FxHashMap<NodeIndex, NodeIndex> = FxHashMap::default();
        let mut visited: FxHashSet<NodeIndex> = FxHashSet::default();
        visited.insert(origin);
        let mut queue = VecDeque::new();
        queue.push_back((origin, 0usize));

        while let Some((current, depth)) = queue.pop_front() {
            if max_depth.is_some_and(|limit| depth >= limit) {
                continue;
            }
            for next in self.graph.neighbors_directed(current, Direction::Outgoing) {
                if !visited.insert(next) {
                    continue;
                }
                prev.insert(next, current);
                if next == goal {
                    return Some(self.rebuild_path(&prev, origin, goal));
                }
                queue.push_back((next, depth + 1));
            }
        }
        None
    }

    /// First path found by depth-first search. The result depends on
    /// adjacency order, so it carries no shortest-path guarantee.
    pub fn dfs_path(&self, start: &str, target: &str) -> Option<Vec<String>> {
        let origin = self.node(start)?;
        let goal = self.node(target)?;

        let mut visited: FxHashSet<NodeIndex> = FxHashSet::default();
        visited.insert(origin);
        let mut path = vec![origin];
        let mut stack = vec![self.graph.neighbors_directed(origin, Direction::Outgoing)];

        if origin == goal {
            return Some(vec![start.to_string()]);
        }
        loop {
            let step = match stack.last_mut() {
                Some(iter) => iter.next(),
                None => return None,
            };
            match step {
                Some(next) if visited.contains(&next) => {}
                Some(next) => {
                    path.push(next);
                    if next == goal {
                        return Some(path.iter().map(|&n| self.name_at(n).to_string()).collect());
                    }
                    visited.insert(next);
                    stack.push(self.graph.neighbors_directed(next, Direction::Outgoing));
                }
                None => {
                    path.pop();
                    stack.pop();
                }
            }
        }
    }

    /// Shortest path under uniform edge weight 1, with early exit once the
    /// target is settled. `None` exactly when `target` is unreachable.
    pub fn dijkstra(&self, start: &str, target: &str) -> Option<Vec<String>> {
        let origin = self.node(start)?;
        let goal = self.node(target)?;

        let mut dist: FxHashMap<NodeIndex, usize> = FxHashMap::default();
        let mut prev: FxHashMap<NodeIndex, NodeIndex> = FxHashMap::default();
        let mut unsettled: FxHashSet<NodeIndex> = self.graph.node_indices().collect();
        dist.insert(origin, 0);

        while !unsettled.is_empty() {
            let Some(&current) = unsettled
                .iter()
                .filter(|idx| dist.contains_key(idx))
                .min_by_key(|idx| dist[idx])
            else {
                // Nothing left with a finite distance.
                break;
            };
            unsettled.remove(&current);
            if current == goal {
                return Some(self.rebuild_path(&prev, origin, goal));
            }
            let next_dist = dist[&current] + 1;
            for next in self.graph.neighbors_directed(current, Direction::Outgoing) {
                if dist.get(&next).is_none_or(|&d| next_dist < d) {
                    dist.insert(next, next_dist);
                    prev.insert(next, current);
                }
            }
        }
        None
    }

    /// Hop distances from `start` to every reachable node, including
    /// `start` at distance 0.
    pub(crate) fn shortest_distances(&self, start: NodeIndex) -> FxHashMap<NodeIndex, usize> {
        let mut dist: FxHashMap<NodeIndex, usize> = FxHashMap::default();
        dist.insert(start, 0);
        let mut queue = VecDeque::new();
        queue.push_back(start);
        while let Some(current) = queue.pop_front() {
            let next_dist = dist[&current] + 1;
            for next in self.graph.neighbors_directed(current, Direction::Outgoing) {
                if !dist.contains_key(&next) {
                    dist.insert(next, next_dist);
                    queue.push_back(next);
                }
            }
        }
        dist
    }

    /// All simple paths from `start` to `target` up to `max_len` nodes,
    /// under the default expansion budget.
    pub fn all_paths(&self, start: &str, target: &str, max_len: usize) -> Vec<Vec<String>> {
        self.all_paths_bounded(start, target, max_len, DEFAULT_PATH_BUDGET)
    }

    /// Simple-path enumeration with an explicit expansion budget. Once the
    /// budget is exhausted the result is truncated, not an error.
    pub fn all_paths_bounded(
        &self,
        start: &str,
        target: &str,
        max_len: usize,
        budget: usize,
    ) -> Vec<Vec<String>> {
        let (Some(origin), Some(goal)) = (self.node(start), self.node(target)) else {
            return Vec::new();
        };

        let mut paths = Vec::new();
        let mut stack: Vec<Vec<NodeIndex>> = vec![vec![origin]];
        let mut expansions = 0usize;

        while let Some(path) = stack.pop() {
            expansions += 1;
            if expansions > budget {
                break;
            }
            let last = path[path.len() - 1];
            if last == goal {
                paths.push(path.iter().map(|&n| self.name_at(n).to_string()).collect());
                continue;
            }
            if path.len() >= max_len {
                continue;
            }
            for next in self.graph.neighbors_directed(last, Direction::Outgoing) {
                if path.contains(&next) {
                    continue;
                }
                let mut extended = path.clone();
                extended.push(next);
                stack.push(extended);
            }
        }
        paths
    }

    /// Forward neighborhood of `node` out to `k` hops, with per-hop levels.
    pub fn neighborhood(&self, node: &str, k: usize) -> Neighborhood {
        let Some(origin) = self.node(node) else {
            return Neighborhood {
                nodes: Vec::new(),
                levels: Vec::new(),
            };
        };

        let mut visited: FxHashSet<NodeIndex> = FxHashSet::default();
        visited.insert(origin);
        let mut levels: Vec<Vec<String>> = vec![vec![node.to_string()]];
        let mut frontier = vec![origin];

        for _ in 0..k {
            let mut next_frontier = Vec::new();
            for &current in &frontier {
                for next in self.graph.neighbors_directed(current, Direction::Outgoing) {
                    if visited.insert(next) {
                        next_frontier.push(next);
                    }
                }
            }
            if next_frontier.is_empty() {
                break;
            }
            let mut level: Vec<String> = next_frontier
                .iter()
                .map(|&n| self.name_at(n).to_string())
                .collect();
            level.sort_unstable();
            levels.push(level);
            frontier = next_frontier;
        }

        let mut nodes: Vec<String> = levels.iter().flatten().cloned().collect();
        nodes.sort_unstable();
        Neighborhood { nodes, levels }
    }

    /// Reachability-based node grouping.
    ///
    /// Groups each unvisited node with its full forward closure. This
    /// over-merges compared to strongly connected components (one shared
    /// downstream node fuses two otherwise unrelated groups) but is what the
    /// cluster reports are defined over. Singleton groups are dropped.
    pub fn reachability_components(&self) -> Vec<Vec<String>> {
        let mut visited: FxHashSet<NodeIndex> = FxHashSet::default();
        let mut components = Vec::new();

        for seed in self.graph.node_indices() {
            if visited.contains(&seed) {
                continue;
            }
            let mut component = Vec::new();
            let mut queue = VecDeque::new();
            visited.insert(seed);
            queue.push_back(seed);
            while let Some(current) = queue.pop_front() {
                component.push(self.name_at(current).to_string());
                for next in self.graph.neighbors_directed(current, Direction::Outgoing) {
                    if visited.insert(next) {
                        queue.push_back(next);
                    }
                }
            }
            if component.len() > 1 {
                component.sort_unstable();
                components.push(component);
            }
        }
        components.sort();
        components
    }

    /// Cycles in the call graph, one per back-edge found in the outer DFS
    /// loop. Each cycle is closed: first and last element are the same node.
    pub fn find_cycles(&self) -> Vec<Vec<String>> {
        let mut color = vec![WHITE; self.graph.node_count()];
        let mut cycles = Vec::new();

        for root in self.graph.node_indices() {
            if color[root.index()] != WHITE {
                continue;
            }
            let mut path = vec![root];
            let mut stack = vec![self.graph.neighbors_directed(root, Direction::Outgoing)];
            color[root.index()] = GRAY;
            let mut found = false;

            loop {
                let step = match stack.last_mut() {
                    Some(iter) => iter.next(),
                    None => break,
                };
                match step {
                    Some(next) if color[next.index()] == WHITE => {
                        color[next.index()] = GRAY;
                        path.push(next);
                        stack.push(self.graph.neighbors_directed(next, Direction::Outgoing));
                    }
                    Some(next) if color[next.index()] == GRAY && !found => {
                        if let Some(pos) = path.iter().position(|&n| n == next) {
                            let mut cycle: Vec<String> = path[pos..]
                                .iter()
                                .map(|&n| self.name_at(n).to_string())
                                .collect();
                            cycle.push(self.name_at(next).to_string());
                            cycles.push(cycle);
                            found = true;
                        }
                    }
                    Some(_) => {}
                    None => {
                        if let Some(done) = path.pop() {
                            color[done.index()] = BLACK;
                        }
                        stack.pop();
                    }
                }
            }
        }
        cycles
    }

    /// Topological order of the call graph, or `None` when a cycle exists.
    pub fn topological_sort(&self) -> Option<Vec<String>> {
        self.topo_indices()
            .map(|order| order.iter().map(|&n| self.name_at(n).to_string()).collect())
    }

    fn topo_indices(&self) -> Option<Vec<NodeIndex>> {
        let mut color = vec![WHITE; self.graph.node_count()];
        let mut postorder = Vec::with_capacity(self.graph.node_count());

        for root in self.graph.node_indices() {
            if color[root.index()] != WHITE {
                continue;
            }
            let mut stack = vec![(root, self.graph.neighbors_directed(root, Direction::Outgoing))];
            color[root.index()] = GRAY;

            loop {
                let step = match stack.last_mut() {
                    Some((_, iter)) => iter.next(),
                    None => break,
                };
                match step {
                    Some(next) if color[next.index()] == WHITE => {
                        color[next.index()] = GRAY;
                        stack.push((next, self.graph.neighbors_directed(next, Direction::Outgoing)));
                    }
                    // Back-edge: the graph is cyclic.
                    Some(next) if color[next.index()] == GRAY => return None,
                    Some(_) => {}
                    None => {
                        if let Some((done, _)) = stack.pop() {
                            color[done.index()] = BLACK;
                            postorder.push(done);
                        }
                    }
                }
            }
        }
        postorder.reverse();
        Some(postorder)
    }

    /// Longest path through the call graph by topological relaxation.
    /// `None` on cyclic graphs, where longest path is undefined.
    pub fn critical_path(&self) -> Option<Vec<String>> {
        let order = self.topo_indices()?;
        let mut dist: FxHashMap<NodeIndex, usize> = FxHashMap::default();
        let mut prev: FxHashMap<NodeIndex, NodeIndex> = FxHashMap::default();

        for &node in &order {
            let here = dist.get(&node).copied().unwrap_or(0);
            for next in self.graph.neighbors_directed(node, Direction::Outgoing) {
                if dist.get(&next).is_none_or(|&d| here + 1 > d) {
                    dist.insert(next, here + 1);
                    prev.insert(next, node);
                }
            }
        }

        let (&end, _) = dist.iter().max_by_key(|(_, &d)| d)?;
        let mut path = vec![end];
        let mut current = end;
        while let Some(&p) = prev.get(&current) {
            path.push(p);
            current = p;
        }
        path.reverse();
        Some(path.iter().map(|&n| self.name_at(n).to_string()).collect())
    }

    fn rebuild_path(
        &self,
        prev: &FxHashMap<NodeIndex, NodeIndex>,
        origin: NodeIndex,
        goal: NodeIndex,
    ) -> Vec<String> {
        let mut path = vec![goal];
        let mut current = goal;
        while current != origin {
            match prev.get(&current) {
                Some(&p) => {
                    path.push(p);
                    current = p;
                }
                None => break,
            }
        }
        path.reverse();
        path.iter().map(|&n| self.name_at(n).to_string()).collect()
    }
}
