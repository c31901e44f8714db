//! Project-level configuration support
//!
//! Loads per-project configuration from a `codeatlas.toml` file next to the
//! index artifact. Every detector threshold has a documented default, so a
//! missing or partial config file is always usable.
//!
//! # Configuration Format
//!
//! ```toml
//! # codeatlas.toml
//!
//! [thresholds]
//! god_object_imports = 15
//! long_function_lines = 100
//! coupling_ratio = 0.3
//!
//! [tests]
//! source_extensions = ["ts", "tsx", "js", "jsx"]
//! test_patterns = ["**/*.ts", "**/*.tsx"]
//! excluded_roots = [".claude/"]
//!
//! [framework]
//! root = "app/"
//! managed_pattern = '(page|layout|template|loading|error|route)\.(ts|tsx|js|jsx)$'
//! ```

use regex::Regex;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, warn};

/// Index backend tuning
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Soft size warning threshold for the index artifact, in bytes
    pub max_index_bytes: u64,
    /// Query cache time-to-live, in seconds
    pub cache_ttl_secs: u64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            max_index_bytes: 5 * 1024 * 1024,
            cache_ttl_secs: 60,
        }
    }
}

/// Thresholds for structural smell detection
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Import count above which a file is a god object (strictly greater)
    pub god_object_imports: usize,
    /// Estimated line span above which a function is flagged as long
    pub long_function_lines: u32,
    /// Coupling score above which a file is flagged as tightly coupled
    pub coupling_ratio: f64,
    /// Minimum imports AND consumers before coupling is scored at all
    pub coupling_fan: usize,
    /// Call-chain depth probed by the deep nesting detector
    pub deep_nesting_depth: usize,
    /// Maximum nodes sampled for approximate betweenness centrality
    pub betweenness_samples: usize,
    /// Default hop bound for simple-path enumeration
    pub max_path_length: usize,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            god_object_imports: 15,
            long_function_lines: 100,
            coupling_ratio: 0.3,
            coupling_fan: 5,
            deep_nesting_depth: 5,
            betweenness_samples: 50,
            max_path_length: 10,
        }
    }
}

/// Test coverage linkage settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TestConfig {
    /// Extensions of files that should have associated tests
    pub source_extensions: Vec<String>,
    /// Glob patterns selecting files tracked for test coverage
    pub test_patterns: Vec<String>,
    /// Directory prefix where test files live
    pub test_dir_prefix: String,
    /// Path prefixes excluded from coverage tracking entirely
    pub excluded_roots: Vec<String>,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            source_extensions: ["ts", "tsx", "js", "jsx"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            test_patterns: ["**/*.ts", "**/*.tsx", "**/*.js", "**/*.jsx"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            test_dir_prefix: "__tests__/".to_string(),
            excluded_roots: vec![".claude/".to_string()],
        }
    }
}

/// Framework-managed file detection (e.g. Next.js route conventions).
///
/// Files matching these rules are orphans by construction: the framework
/// loads them by convention, so no other file imports them.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FrameworkConfig {
    /// Path prefix under which framework conventions apply
    pub root: String,
    /// Filename pattern for framework-managed files
    pub managed_pattern: String,
}

impl Default for FrameworkConfig {
    fn default() -> Self {
        Self {
            root: "app/".to_string(),
            managed_pattern: r"(page|layout|template|loading|error|route)\.(ts|tsx|js|jsx)$"
                .to_string(),
        }
    }
}

/// Complete analysis configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub index: IndexConfig,
    pub thresholds: ThresholdConfig,
    pub tests: TestConfig,
    pub framework: FrameworkConfig,
}

impl AnalysisConfig {
    /// Load configuration from `codeatlas.toml` in the given directory.
    ///
    /// A missing file yields defaults; a malformed file logs a warning and
    /// yields defaults rather than aborting the run.
    pub fn load(dir: &Path) -> Self {
        let path = dir.join("codeatlas.toml");
        if !path.exists() {
            debug!("No codeatlas.toml found at {}, using defaults", dir.display());
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    debug!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    warn!("Failed to parse {}: {}, using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read {}: {}, using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    /// Whether a file is managed by a framework convention.
    pub fn is_framework_managed(&self, file: &str) -> bool {
        if file.is_empty() || !file.starts_with(&self.framework.root) {
            return false;
        }
        match Regex::new(&self.framework.managed_pattern) {
            Ok(re) => re.is_match(file),
            Err(_) => false,
        }
    }

    /// Whether a file should be tracked for test coverage.
    pub fn tracks_test_coverage(&self, file: &str) -> bool {
        if file.is_empty() {
            return false;
        }
        if self
            .tests
            .excluded_roots
            .iter()
            .any(|root| file.starts_with(root.as_str()))
        {
            return false;
        }
        self.tests
            .test_patterns
            .iter()
            .filter_map(|pat| Regex::new(&glob_to_regex(pat)).ok())
            .any(|re| re.is_match(file))
    }
}

/// Convert a glob pattern to an anchored regex string.
///
/// Naive conversion: `**` matches across separators, `*` within one path
/// segment. Sufficient for the test-pattern matching done here; complex
/// globs belong in a real glob library.
pub fn glob_to_regex(pattern: &str) -> String {
    let mut escaped = String::with_capacity(pattern.len() * 2);
    for c in pattern.chars() {
        match c {
            '-' | '/' | '\\' | '^' | '$' | '+' | '?' | '.' | '(' | ')' | '|' | '[' | ']' | '{'
            | '}' => {
                escaped.push('\\');
                escaped.push(c);
            }
            _ => escaped.push(c),
        }
    }
    let body = escaped.replace("**", "\u{0}").replace('*', "[^/]*");
    format!("^{}$", body.replace('\u{0}', ".*"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.thresholds.god_object_imports, 15);
        assert_eq!(config.thresholds.long_function_lines, 100);
        assert!((config.thresholds.coupling_ratio - 0.3).abs() < f64::EPSILON);
        assert_eq!(config.index.cache_ttl_secs, 60);
    }

    #[test]
    fn test_glob_to_regex() {
        let re = Regex::new(&glob_to_regex("**/*.ts")).unwrap();
        assert!(re.is_match("app/lib/util.ts"));
        assert!(re.is_match("x/y.ts"));
        assert!(!re.is_match("x/y.tsx"));

        let re = Regex::new(&glob_to_regex("lib/*.js")).unwrap();
        assert!(re.is_match("lib/a.js"));
        assert!(!re.is_match("lib/sub/a.js"));
    }

    #[test]
    fn test_framework_managed() {
        let config = AnalysisConfig::default();
        assert!(config.is_framework_managed("app/dashboard/page.tsx"));
        assert!(config.is_framework_managed("app/api/users/route.ts"));
        assert!(!config.is_framework_managed("lib/page.tsx")); // wrong root
        assert!(!config.is_framework_managed("app/util.ts"));
    }

    #[test]
    fn test_tracks_test_coverage() {
        let config = AnalysisConfig::default();
        assert!(config.tracks_test_coverage("lib/util.ts"));
        assert!(!config.tracks_test_coverage(".claude/agent.ts"));
        assert!(!config.tracks_test_coverage("README.md"));
    }

    #[test]
    fn test_partial_toml_merges_with_defaults() {
        let parsed: AnalysisConfig =
            toml::from_str("[thresholds]\ngod_object_imports = 20\n").unwrap();
        assert_eq!(parsed.thresholds.god_object_imports, 20);
        // Unspecified sections keep their defaults.
        assert_eq!(parsed.thresholds.long_function_lines, 100);
        assert_eq!(parsed.framework.root, "app/");
    }
}
