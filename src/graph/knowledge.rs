//! Knowledge graph builder
//!
//! Assembles the call graph and file dependency map from the index backend in
//! four passes: file nodes, call edges, dependency edges, then symbol-to-file
//! resolution folded into edge ingestion. Malformed records are skipped with a
//! diagnostic; a build only fails if the backend itself cannot serve the core
//! queries.

use crate::index::{IndexBackend, SymbolDescriptor};
use crate::models::GraphStats;
use anyhow::Result;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::collections::VecDeque;
use tracing::{debug, info};

/// A function in the call graph
#[derive(Debug, Clone, Serialize)]
pub struct FunctionNode {
    pub name: String,
    /// Declaring file, when a descriptor with this name exists
    pub file: Option<String>,
}

/// A file and its dependency relationships
#[derive(Debug, Clone, Default, Serialize)]
pub struct FileNode {
    pub path: String,
    /// Files this file imports
    pub imports: Vec<String>,
    /// Files that import this file
    pub consumers: Vec<String>,
    /// Names of exported symbols
    pub exports: Vec<String>,
    /// Raw symbol descriptors declared in this file
    pub symbols: Vec<String>,
}

/// The assembled knowledge graph.
///
/// Function calls live in a `DiGraph` with a name index for O(1) lookup;
/// file relationships live in a flat map keyed by path. Immutable after
/// `initialize`.
pub struct KnowledgeGraph {
    backend: IndexBackend,
    pub(crate) graph: DiGraph<FunctionNode, ()>,
    pub(crate) node_ids: FxHashMap<String, NodeIndex>,
    files: FxHashMap<String, FileNode>,
    initialized: bool,
}

impl KnowledgeGraph {
    pub fn new(backend: IndexBackend) -> Self {
        Self {
            backend,
            graph: DiGraph::new(),
            node_ids: FxHashMap::default(),
            files: FxHashMap::default(),
            initialized: false,
        }
    }

    /// Build the graph from the backend. Idempotent: a second call is a no-op.
    pub fn initialize(&mut self) -> Result<()> {
        if self.initialized {
            return Ok(());
        }

        // Pass 1: file nodes with their symbols and export names.
        for path in self.backend.file_keys() {
            self.files.insert(
                path.clone(),
                FileNode {
                    path,
                    ..Default::default()
                },
            );
        }
        let mut symbol_files: FxHashMap<String, String> = FxHashMap::default();
        for (file, raw) in self.backend.file_symbols() {
            let name = SymbolDescriptor::name_of(&raw).to_string();
            // First declaring file wins for symbol resolution.
            symbol_files.entry(name.clone()).or_insert_with(|| file.clone());
            if let Some(node) = self.files.get_mut(&file) {
                if raw.starts_with("export") || raw.starts_with("default") {
                    node.exports.push(name);
                }
                node.symbols.push(raw);
            } else {
                debug!("symbol {} references unknown file {}", raw, file);
            }
        }

        // Pass 2: call edges with lazy function-node creation. Duplicate
        // edges collapse to one.
        for (caller, callee) in self.backend.call_edges() {
            let from = self.intern(&caller, &symbol_files);
            let to = self.intern(&callee, &symbol_files);
            self.graph.update_edge(from, to, ());
        }

        // Pass 3: dependency edges recorded symmetrically on both files.
        for (from, to) in self.backend.dependency_edges() {
            if !self.files.contains_key(&from) || !self.files.contains_key(&to) {
                debug!("skipping dependency edge with unknown endpoint: {} -> {}", from, to);
                continue;
            }
            let importer = self.files.get_mut(&from).filter(|f| !f.imports.contains(&to));
            if let Some(f) = importer {
                f.imports.push(to.clone());
            }
            let consumer = self.files.get_mut(&to).filter(|f| !f.consumers.contains(&from));
            if let Some(f) = consumer {
                f.consumers.push(from);
            }
        }

        self.initialized = true;
        info!(
            "knowledge graph built: {} functions, {} calls, {} files",
            self.graph.node_count(),
            self.graph.edge_count(),
            self.files.len()
        );
        Ok(())
    }

    fn intern(&mut self, name: &str, symbol_files: &FxHashMap<String, String>) -> NodeIndex {
        if let Some(&idx) = self.node_ids.get(name) {
            return idx;
        }
        let idx = self.graph.add_node(FunctionNode {
            name: name.to_string(),
            file: symbol_files.get(name).cloned(),
        });
        self.node_ids.insert(name.to_string(), idx);
        idx
    }

    pub fn contains(&self, name: &str) -> bool {
        self.node_ids.contains_key(name)
    }

    pub fn function(&self, name: &str) -> Option<&FunctionNode> {
        self.node_ids.get(name).map(|&idx| &self.graph[idx])
    }

    pub fn file(&self, path: &str) -> Option<&FileNode> {
        self.files.get(path)
    }

    /// All file paths, sorted.
    pub fn file_paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.files.keys().map(|s| s.as_str()).collect();
        paths.sort_unstable();
        paths
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// All function names, in node insertion order.
    pub fn node_names(&self) -> Vec<&str> {
        self.graph
            .node_indices()
            .map(|idx| self.graph[idx].name.as_str())
            .collect()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn backend(&self) -> &IndexBackend {
        &self.backend
    }

    /// Functions called by `name`, sorted.
    pub fn callees(&self, name: &str) -> Vec<&str> {
        self.neighbors_sorted(name, Direction::Outgoing)
    }

    /// Functions calling `name`, sorted.
    pub fn callers(&self, name: &str) -> Vec<&str> {
        self.neighbors_sorted(name, Direction::Incoming)
    }

    fn neighbors_sorted(&self, name: &str, dir: Direction) -> Vec<&str> {
        let Some(&idx) = self.node_ids.get(name) else {
            return Vec::new();
        };
        let mut out: Vec<&str> = self
            .graph
            .neighbors_directed(idx, dir)
            .map(|n| self.graph[n].name.as_str())
            .collect();
        out.sort_unstable();
        out
    }

    pub fn in_degree(&self, name: &str) -> usize {
        self.node_ids
            .get(name)
            .map(|&idx| self.graph.neighbors_directed(idx, Direction::Incoming).count())
            .unwrap_or(0)
    }

    pub fn out_degree(&self, name: &str) -> usize {
        self.node_ids
            .get(name)
            .map(|&idx| self.graph.neighbors_directed(idx, Direction::Outgoing).count())
            .unwrap_or(0)
    }

    /// Files transitively affected if `file` changes, following consumer
    /// edges up to `max_hops` away. The starting file is not included.
    pub fn get_impact_radius(&self, file: &str, max_hops: usize) -> Vec<String> {
        let mut affected = Vec::new();
        if !self.files.contains_key(file) {
            return affected;
        }
        let mut visited: FxHashMap<&str, ()> = FxHashMap::default();
        visited.insert(file, ());
        let mut queue: VecDeque<(&str, usize)> = VecDeque::new();
        queue.push_back((file, 0));

        while let Some((current, hops)) = queue.pop_front() {
            if hops >= max_hops {
                continue;
            }
            let Some(node) = self.files.get(current) else {
                continue;
            };
            for consumer in &node.consumers {
                if visited.insert(consumer.as_str(), ()).is_none() {
                    affected.push(consumer.clone());
                    queue.push_back((consumer.as_str(), hops + 1));
                }
            }
        }
        affected.sort_unstable();
        affected
    }

    /// Aggregate graph statistics.
    pub fn get_stats(&self) -> GraphStats {
        let node_count = self.graph.node_count();
        let edge_count = self.graph.edge_count();
        let mut max_in = 0;
        let mut max_out = 0;
        for idx in self.graph.node_indices() {
            max_in = max_in.max(self.graph.neighbors_directed(idx, Direction::Incoming).count());
            max_out = max_out.max(self.graph.neighbors_directed(idx, Direction::Outgoing).count());
        }
        GraphStats {
            node_count,
            edge_count,
            file_count: self.files.len(),
            // In-degree plus out-degree per node, so every edge counts twice.
            avg_degree: if node_count == 0 {
                0.0
            } else {
                (edge_count * 2) as f64 / node_count as f64
            },
            max_in_degree: max_in,
            max_out_degree: max_out,
            component_count: self.reachability_components().len(),
            cycle_count: self.find_cycles().len(),
        }
    }

    /// DOT export of the call graph, optionally restricted to the induced
    /// subgraph of the given node names.
    pub fn to_dot(&self, subgraph: Option<&[String]>) -> String {
        let keep = |name: &str| match subgraph {
            Some(nodes) => nodes.iter().any(|n| n == name),
            None => true,
        };

        let mut out = String::from("digraph calls {\n  rankdir=LR;\n  node [shape=box];\n");
        let mut names: Vec<&str> = self
            .graph
            .node_indices()
            .map(|idx| self.graph[idx].name.as_str())
            .filter(|n| keep(n))
            .collect();
        names.sort_unstable();
        for name in &names {
            out.push_str(&format!("  \"{}\";\n", name));
        }
        let mut edges: Vec<(&str, &str)> = self
            .graph
            .edge_indices()
            .filter_map(|e| self.graph.edge_endpoints(e))
            .map(|(a, b)| (self.graph[a].name.as_str(), self.graph[b].name.as_str()))
            .filter(|(a, b)| keep(a) && keep(b))
            .collect();
        edges.sort_unstable();
        for (a, b) in edges {
            out.push_str(&format!("  \"{}\" -> \"{}\";\n", a, b));
        }
        out.push_str("}\n");
        out
    }
}
