//! Query backend for the extracted index artifact
//!
//! Evaluates named query expressions against `PROJECT_INDEX.json` and caches
//! the raw newline-delimited results. The artifact layout:
//!
//! - `.f`     — file path -> symbol list (two duck-typed shapes, see
//!              [`symbol_strings`])
//! - `.g`     — call graph as `[caller, callee]` pairs
//! - `.deps`  — file path -> ordered list of imported file paths
//! - `.stats` — free-form project statistics
//!
//! Failure policy: a missing artifact is fatal at construction; everything
//! past that degrades to `None` ("no data") with a logged diagnostic. Query
//! results are raw strings; per-record decoding happens in the typed helpers
//! which skip malformed lines.

use crate::config::IndexConfig;
use crate::index::cache::{Clock, QueryCache, SystemClock};
use crate::index::descriptor::SymbolDescriptor;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that terminate a top-level invocation.
///
/// Everything else in this module is recovered locally.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("index artifact not found at {0}; run the extractor to generate it")]
    NotFound(PathBuf),
    #[error("failed to stat index artifact {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A named query expression over the index artifact.
///
/// The `Display` form doubles as the cache key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexExpr {
    /// All file keys, one per line
    FileKeys,
    /// All call edges as `[caller, callee]` JSON lines
    CallEdges,
    /// All dependency edges as `{"from", "to"}` JSON lines
    DependencyEdges,
    /// All `{"file", "symbol"}` pairs as JSON lines
    FileSymbols,
    /// Callee names grouped by caller count, descending, as JSON lines
    MostCalled(usize),
    /// Files grouped by consumer count, descending, as JSON lines
    DependencyHotspots(usize),
    /// The raw project statistics object
    Stats,
}

impl fmt::Display for IndexExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexExpr::FileKeys => write!(f, "files"),
            IndexExpr::CallEdges => write!(f, "calls"),
            IndexExpr::DependencyEdges => write!(f, "deps"),
            IndexExpr::FileSymbols => write!(f, "symbols"),
            IndexExpr::MostCalled(limit) => write!(f, "most_called:{limit}"),
            IndexExpr::DependencyHotspots(limit) => write!(f, "dep_hotspots:{limit}"),
            IndexExpr::Stats => write!(f, "stats"),
        }
    }
}

/// Test linkage summary
#[derive(Debug, Clone, Default, Serialize)]
pub struct TestCoverage {
    pub coverage: u32,
    pub tested: usize,
    pub total: usize,
}

/// Resolve the duck-typed symbol list of one `.f` entry.
///
/// A file's value is either an array whose second element is the symbol
/// list, or an object carrying the list under `.t`. Anything else means no
/// symbols. This is the only place that knows about both shapes.
fn symbol_strings(value: &Value) -> Vec<String> {
    let list = match value {
        Value::Array(items) => match items.get(1) {
            Some(Value::Array(symbols)) => symbols,
            _ => return Vec::new(),
        },
        Value::Object(map) => match map.get("t") {
            Some(Value::Array(symbols)) => symbols,
            _ => return Vec::new(),
        },
        _ => return Vec::new(),
    };
    list.iter()
        .filter_map(|s| s.as_str())
        .map(|s| s.to_string())
        .collect()
}

/// Blocking query interface over the index artifact.
///
/// The artifact is re-read on every cache miss, so the TTL cache is what
/// keeps repeated queries cheap within one invocation.
pub struct IndexBackend {
    index_path: PathBuf,
    cache: QueryCache,
}

impl IndexBackend {
    /// Open a backend over the artifact at `path`.
    ///
    /// Fails if the artifact does not exist (the only fatal startup error).
    /// Oversized artifacts log a warning but still work.
    pub fn open(path: &Path, config: &IndexConfig) -> Result<Self, IndexError> {
        Self::open_with_clock(path, config, Box::new(SystemClock))
    }

    /// Open with an injected clock, for deterministic TTL tests.
    pub fn open_with_clock(
        path: &Path,
        config: &IndexConfig,
        clock: Box<dyn Clock>,
    ) -> Result<Self, IndexError> {
        if !path.exists() {
            return Err(IndexError::NotFound(path.to_path_buf()));
        }
        let meta = std::fs::metadata(path).map_err(|source| IndexError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        if meta.len() > config.max_index_bytes {
            warn!(
                "Large index detected ({:.2}MB at {}). Queries may be slower.",
                meta.len() as f64 / 1024.0 / 1024.0,
                path.display()
            );
        }

        Ok(Self {
            index_path: path.to_path_buf(),
            cache: QueryCache::new(Duration::from_secs(config.cache_ttl_secs), clock),
        })
    }

    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    /// Evaluate a query expression with caching.
    ///
    /// Returns `None` on any evaluation failure; callers treat that as "no
    /// matching data". Never panics past the construction boundary.
    pub fn query(&self, expr: &IndexExpr, use_cache: bool) -> Option<String> {
        let key = expr.to_string();
        if use_cache {
            if let Some(hit) = self.cache.get(&key) {
                return Some(hit);
            }
        }

        let result = self.evaluate(expr)?;
        self.cache.insert(key, result.clone());
        Some(result)
    }

    /// Drop all cached results.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    fn evaluate(&self, expr: &IndexExpr) -> Option<String> {
        let contents = match std::fs::read_to_string(&self.index_path) {
            Ok(c) => c,
            Err(e) => {
                warn!("query failed: cannot read {}: {}", self.index_path.display(), e);
                return None;
            }
        };
        let doc: Value = match serde_json::from_str(&contents) {
            Ok(v) => v,
            Err(e) => {
                warn!("query failed: malformed index {}: {}", self.index_path.display(), e);
                return None;
            }
        };

        let output = match expr {
            IndexExpr::FileKeys => doc
                .get("f")
                .and_then(Value::as_object)
                .map(|map| map.keys().cloned().collect::<Vec<_>>().join("\n"))
                .unwrap_or_default(),
            IndexExpr::CallEdges => {
                let mut lines = Vec::new();
                if let Some(edges) = doc.get("g").and_then(Value::as_array) {
                    for edge in edges {
                        match (
                            edge.get(0).and_then(Value::as_str),
                            edge.get(1).and_then(Value::as_str),
                        ) {
                            (Some(caller), Some(callee)) => {
                                lines.push(format!(
                                    "{}",
                                    serde_json::json!([caller, callee])
                                ));
                            }
                            _ => debug!("skipping malformed call edge: {}", edge),
                        }
                    }
                }
                lines.join("\n")
            }
            IndexExpr::DependencyEdges => {
                let mut lines = Vec::new();
                if let Some(deps) = doc.get("deps").and_then(Value::as_object) {
                    for (from, targets) in deps {
                        let Some(targets) = targets.as_array() else {
                            debug!("skipping malformed dependency list for {}", from);
                            continue;
                        };
                        for to in targets.iter().filter_map(Value::as_str) {
                            lines.push(format!(
                                "{}",
                                serde_json::json!({"from": from, "to": to})
                            ));
                        }
                    }
                }
                lines.join("\n")
            }
            IndexExpr::FileSymbols => {
                let mut lines = Vec::new();
                if let Some(files) = doc.get("f").and_then(Value::as_object) {
                    for (file, value) in files {
                        for symbol in symbol_strings(value) {
                            lines.push(format!(
                                "{}",
                                serde_json::json!({"file": file, "symbol": symbol})
                            ));
                        }
                    }
                }
                lines.join("\n")
            }
            IndexExpr::MostCalled(limit) => {
                let mut counts: Vec<(String, usize)> = {
                    let mut by_callee = std::collections::BTreeMap::new();
                    if let Some(edges) = doc.get("g").and_then(Value::as_array) {
                        for edge in edges {
                            if let Some(callee) = edge.get(1).and_then(Value::as_str) {
                                *by_callee.entry(callee.to_string()).or_insert(0) += 1;
                            }
                        }
                    }
                    by_callee.into_iter().collect()
                };
                counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
                counts
                    .into_iter()
                    .take(*limit)
                    .map(|(name, callers)| {
                        format!("{}", serde_json::json!({"fn": name, "callers": callers}))
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            }
            IndexExpr::DependencyHotspots(limit) => {
                let mut counts: Vec<(String, usize)> = {
                    let mut by_target = std::collections::BTreeMap::new();
                    if let Some(deps) = doc.get("deps").and_then(Value::as_object) {
                        for targets in deps.values().filter_map(Value::as_array) {
                            for to in targets.iter().filter_map(Value::as_str) {
                                *by_target.entry(to.to_string()).or_insert(0) += 1;
                            }
                        }
                    }
                    by_target.into_iter().collect()
                };
                counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
                counts
                    .into_iter()
                    .take(*limit)
                    .map(|(file, consumers)| {
                        format!("{}", serde_json::json!({"file": file, "consumers": consumers}))
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            }
            IndexExpr::Stats => doc
                .get("stats")
                .map(|stats| stats.to_string())
                .unwrap_or_default(),
        };

        Some(output)
    }

    // ------------------------------------------------------------------
    // Typed helpers over the raw query surface. All of them treat `None`
    // and empty strings as "no data".
    // ------------------------------------------------------------------

    /// All file paths present in the index.
    pub fn file_keys(&self) -> Vec<String> {
        self.lines(&IndexExpr::FileKeys)
    }

    /// All `(caller, callee)` pairs from the call graph.
    pub fn call_edges(&self) -> Vec<(String, String)> {
        self.lines(&IndexExpr::CallEdges)
            .iter()
            .filter_map(|line| {
                let pair: Vec<String> = serde_json::from_str(line).ok()?;
                let mut it = pair.into_iter();
                Some((it.next()?, it.next()?))
            })
            .collect()
    }

    /// All `(file, imported_file)` pairs from the dependency map.
    pub fn dependency_edges(&self) -> Vec<(String, String)> {
        #[derive(serde::Deserialize)]
        struct Dep {
            from: String,
            to: String,
        }
        self.lines(&IndexExpr::DependencyEdges)
            .iter()
            .filter_map(|line| {
                let dep: Dep = serde_json::from_str(line).ok()?;
                Some((dep.from, dep.to))
            })
            .collect()
    }

    /// All `(file, raw_symbol)` pairs, in index order.
    pub fn file_symbols(&self) -> Vec<(String, String)> {
        #[derive(serde::Deserialize)]
        struct Sym {
            file: String,
            symbol: String,
        }
        self.lines(&IndexExpr::FileSymbols)
            .iter()
            .filter_map(|line| {
                let sym: Sym = serde_json::from_str(line).ok()?;
                Some((sym.file, sym.symbol))
            })
            .collect()
    }

    /// Callee names ranked by caller count.
    pub fn most_called_functions(&self, limit: usize) -> Vec<(String, usize)> {
        #[derive(serde::Deserialize)]
        struct Entry {
            #[serde(rename = "fn")]
            name: String,
            callers: usize,
        }
        self.lines(&IndexExpr::MostCalled(limit))
            .iter()
            .filter_map(|line| {
                let e: Entry = serde_json::from_str(line).ok()?;
                Some((e.name, e.callers))
            })
            .collect()
    }

    /// Files ranked by how many other files import them.
    pub fn dependency_hotspots(&self, limit: usize) -> Vec<(String, usize)> {
        #[derive(serde::Deserialize)]
        struct Entry {
            file: String,
            consumers: usize,
        }
        self.lines(&IndexExpr::DependencyHotspots(limit))
            .iter()
            .filter_map(|line| {
                let e: Entry = serde_json::from_str(line).ok()?;
                Some((e.file, e.consumers))
            })
            .collect()
    }

    /// Functions calling `name`.
    pub fn callers_of(&self, name: &str) -> Vec<String> {
        self.call_edges()
            .into_iter()
            .filter(|(_, callee)| callee == name)
            .map(|(caller, _)| caller)
            .collect()
    }

    /// Functions called by `name`.
    pub fn callees_of(&self, name: &str) -> Vec<String> {
        self.call_edges()
            .into_iter()
            .filter(|(caller, _)| caller == name)
            .map(|(_, callee)| callee)
            .collect()
    }

    /// Raw symbol descriptors declared in one file.
    pub fn symbols_for_file(&self, file: &str) -> Vec<String> {
        self.file_symbols()
            .into_iter()
            .filter(|(f, _)| f == file)
            .map(|(_, raw)| raw)
            .collect()
    }

    /// Files with no dependency edge in either direction.
    pub fn orphan_files(&self) -> Vec<String> {
        let edges = self.dependency_edges();
        self.file_keys()
            .into_iter()
            .filter(|file| {
                !edges
                    .iter()
                    .any(|(from, to)| from == file || to == file)
            })
            .collect()
    }

    /// Functions that appear as callers but are themselves never called.
    pub fn dead_functions(&self) -> Vec<String> {
        let edges = self.call_edges();
        let called: std::collections::BTreeSet<&str> =
            edges.iter().map(|(_, callee)| callee.as_str()).collect();
        let mut dead: Vec<String> = edges
            .iter()
            .map(|(caller, _)| caller.as_str())
            .filter(|caller| !called.contains(caller))
            .map(|s| s.to_string())
            .collect();
        dead.sort();
        dead.dedup();
        dead
    }

    /// Test files whose dependency list includes `file`.
    pub fn tests_for_file(&self, file: &str, test_prefix: &str) -> Vec<String> {
        self.dependency_edges()
            .into_iter()
            .filter(|(from, to)| to == file && from.starts_with(test_prefix))
            .map(|(from, _)| from)
            .collect()
    }

    /// Ratio of test-looking files to all files.
    pub fn test_coverage(&self) -> TestCoverage {
        let files = self.file_keys();
        if files.is_empty() {
            return TestCoverage::default();
        }
        let tested = files
            .iter()
            .filter(|f| f.contains("test") || f.contains("spec"))
            .count();
        TestCoverage {
            coverage: ((tested as f64 / files.len() as f64) * 100.0).round() as u32,
            tested,
            total: files.len(),
        }
    }

    /// Subsequence match over file keys, case-insensitive.
    pub fn fuzzy_search(&self, pattern: &str, limit: usize) -> Vec<String> {
        let term = pattern.trim();
        let files = self.file_keys();
        if term.is_empty() {
            return files.into_iter().take(limit).collect();
        }
        let fuzzy: String = term
            .to_lowercase()
            .chars()
            .map(|c| regex::escape(&c.to_string()))
            .collect::<Vec<_>>()
            .join(".*");
        let Ok(re) = regex::RegexBuilder::new(&fuzzy).case_insensitive(true).build() else {
            return Vec::new();
        };
        files
            .into_iter()
            .filter(|f| re.is_match(f))
            .take(limit)
            .collect()
    }

    /// Resolve a symbol name to the file declaring it.
    ///
    /// Matches on the name prefix of the colon-delimited descriptor; the
    /// first declaring file in index order wins.
    pub fn find_file_for_symbol(&self, symbol: &str) -> Option<String> {
        let name = SymbolDescriptor::name_of(symbol);
        self.file_symbols()
            .into_iter()
            .find(|(_, raw)| SymbolDescriptor::name_of(raw) == name)
            .map(|(file, _)| file)
    }

    /// Free-form project statistics, if the index carries them.
    pub fn stats(&self) -> Option<Value> {
        let raw = self.query(&IndexExpr::Stats, true)?;
        if raw.is_empty() {
            return None;
        }
        serde_json::from_str(&raw).ok()
    }

    /// Number of files in the index.
    pub fn file_count(&self) -> usize {
        self.file_keys().len()
    }

    fn lines(&self, expr: &IndexExpr) -> Vec<String> {
        match self.query(expr, true) {
            Some(raw) if !raw.is_empty() => raw.lines().map(|l| l.to_string()).collect(),
            _ => Vec::new(),
        }
    }
}
