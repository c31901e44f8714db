//! Missing test detection
//!
//! A source file "has tests" when at least one file under the test directory
//! imports it. Coverage tracking is scoped by the configured source
//! extensions, excluded roots, and glob patterns.

use crate::detectors::PatternDetector;
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// A tracked source file with no importing test file
#[derive(Debug, Clone, Serialize)]
pub struct MissingTest {
    pub file: String,
    pub suggested_test_path: String,
}

fn source_root_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(app|lib|components)/").expect("root pattern is valid"))
}

fn extension_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\.(ts|tsx|js|jsx)$").expect("extension pattern is valid"))
}

impl PatternDetector<'_> {
    /// Coverage-tracked source files that no test file imports.
    pub fn detect_missing_tests(&self) -> Vec<MissingTest> {
        let prefix = &self.config.tests.test_dir_prefix;
        self.graph
            .file_paths()
            .into_iter()
            .filter(|path| self.is_testable_source(path))
            .filter(|path| {
                let has_test = self
                    .graph
                    .file(path)
                    .map(|f| f.consumers.iter().any(|c| c.starts_with(prefix.as_str())))
                    .unwrap_or(false);
                !has_test
            })
            .map(|path| MissingTest {
                file: path.to_string(),
                suggested_test_path: suggest_test_path(path),
            })
            .collect()
    }

    fn is_testable_source(&self, path: &str) -> bool {
        let has_source_ext = self
            .config
            .tests
            .source_extensions
            .iter()
            .any(|ext| path.ends_with(&format!(".{ext}")));
        if !has_source_ext {
            return false;
        }
        if path.contains("test")
            || path.contains("spec")
            || path.contains("__tests__")
            || path.contains("node_modules")
        {
            return false;
        }
        self.config.tracks_test_coverage(path)
    }
}

/// Mirror the source path under the test directory with a `.test.` infix.
fn suggest_test_path(file: &str) -> String {
    let rooted = source_root_regex().replace(file, "__tests__/$1/");
    extension_regex().replace(&rooted, ".test.$1").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::detectors::PatternDetector;
    use crate::graph::testutil::graph_from;

    #[test]
    fn test_suggest_test_path() {
        assert_eq!(
            suggest_test_path("lib/util.ts"),
            "__tests__/lib/util.test.ts"
        );
        assert_eq!(
            suggest_test_path("components/Button.tsx"),
            "__tests__/components/Button.test.tsx"
        );
        assert_eq!(suggest_test_path("core/engine.js"), "core/engine.test.js");
    }

    #[test]
    fn test_tested_file_not_flagged() {
        let (graph, _f) = graph_from(
            &[
                ("lib/covered.ts", &[]),
                ("lib/bare.ts", &[]),
                ("__tests__/lib/covered.test.ts", &[]),
            ],
            &[],
            &[("__tests__/lib/covered.test.ts", &["lib/covered.ts"])],
        );
        let config = AnalysisConfig::default();
        let detector = PatternDetector::new(&graph, &config);
        let missing = detector.detect_missing_tests();

        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].file, "lib/bare.ts");
        assert_eq!(missing[0].suggested_test_path, "__tests__/lib/bare.test.ts");
    }

    #[test]
    fn test_non_source_and_excluded_files_skipped() {
        let (graph, _f) = graph_from(
            &[("README.md", &[]), (".claude/agent.ts", &[])],
            &[],
            &[],
        );
        let config = AnalysisConfig::default();
        let detector = PatternDetector::new(&graph, &config);
        assert!(detector.detect_missing_tests().is_empty());
    }
}
