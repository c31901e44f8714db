//! Dead and unreachable code detection
//!
//! Three related smells: functions that call others but are never called
//! themselves, files with no dependency edges in either direction, and
//! exported symbols nothing references.

use crate::detectors::PatternDetector;
use crate::index::SymbolDescriptor;
use serde::Serialize;

/// A function that appears only as a caller
#[derive(Debug, Clone, Serialize)]
pub struct DeadFunction {
    pub name: String,
    pub file: Option<String>,
}

/// A file no other file imports or is imported by
#[derive(Debug, Clone, Serialize)]
pub struct OrphanFile {
    pub file: String,
    pub file_type: String,
    pub suggestion: String,
}

/// An exported symbol with no callers
#[derive(Debug, Clone, Serialize)]
pub struct UnusedExport {
    pub file: String,
    pub symbol: String,
}

impl PatternDetector<'_> {
    /// Functions with outgoing calls but zero callers. Entry points land
    /// here too; the caller decides which are intentional.
    pub fn detect_dead_functions(&self) -> Vec<DeadFunction> {
        self.graph
            .backend()
            .dead_functions()
            .into_iter()
            .map(|name| {
                let file = self.graph.function(&name).and_then(|f| f.file.clone());
                DeadFunction { name, file }
            })
            .collect()
    }

    /// Files with zero inbound and zero outbound dependency edges.
    ///
    /// Framework-managed files (loaded by convention, never imported) and
    /// test files are excluded.
    pub fn detect_orphan_files(&self) -> Vec<OrphanFile> {
        self.graph
            .file_paths()
            .into_iter()
            .filter_map(|path| {
                let file = self.graph.file(path)?;
                if !file.imports.is_empty() || !file.consumers.is_empty() {
                    return None;
                }
                if self.config.is_framework_managed(path) || is_test_file(path) {
                    return None;
                }
                let file_type = classify_file_type(path);
                Some(OrphanFile {
                    file: path.to_string(),
                    suggestion: suggest_orphan_fix(&file_type),
                    file_type,
                })
            })
            .collect()
    }

    /// Export-marked symbols that nothing in the call graph references.
    pub fn detect_unused_exports(&self) -> Vec<UnusedExport> {
        let mut unused = Vec::new();
        for path in self.graph.file_paths() {
            let Some(file) = self.graph.file(path) else {
                continue;
            };
            for export in &file.exports {
                let name = export
                    .strip_prefix("export ")
                    .or_else(|| export.strip_prefix("default "))
                    .unwrap_or(export);
                let name = SymbolDescriptor::name_of(name);
                if !self.graph.contains(name) || self.graph.in_degree(name) == 0 {
                    unused.push(UnusedExport {
                        file: path.to_string(),
                        symbol: name.to_string(),
                    });
                }
            }
        }
        unused
    }
}

fn is_test_file(path: &str) -> bool {
    path.contains("test") || path.contains("spec") || path.contains("__tests__")
}

fn classify_file_type(path: &str) -> String {
    if path.starts_with("components/") || path.ends_with(".tsx") || path.ends_with(".jsx") {
        "component"
    } else if path.starts_with("lib/") || path.contains("util") {
        "utility"
    } else if path.contains("config") || path.contains("rc.") {
        "config"
    } else if path.starts_with("scripts/") {
        "script"
    } else {
        "module"
    }
    .to_string()
}

fn suggest_orphan_fix(file_type: &str) -> String {
    match file_type {
        "component" => "Import it from a page or parent component, or delete it",
        "utility" => "Wire it into the modules that need it, or delete it",
        "config" => "Likely loaded by tooling; verify before removing",
        "script" => "Likely run directly; verify before removing",
        _ => "No imports in either direction; integrate or delete it",
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::detectors::PatternDetector;
    use crate::graph::testutil::graph_from;

    #[test]
    fn test_dead_functions_carry_file() {
        let (graph, _f) = graph_from(
            &[("lib/a.ts", &["orphanCaller:1:():void:helper"])],
            &[("orphanCaller", "helper")],
            &[],
        );
        let config = AnalysisConfig::default();
        let detector = PatternDetector::new(&graph, &config);
        let dead = detector.detect_dead_functions();

        assert_eq!(dead.len(), 1);
        assert_eq!(dead[0].name, "orphanCaller");
        assert_eq!(dead[0].file.as_deref(), Some("lib/a.ts"));
    }

    #[test]
    fn test_orphan_requires_no_edges_either_direction() {
        let (graph, _f) = graph_from(
            &[("lonely.ts", &[]), ("a.ts", &[]), ("b.ts", &[])],
            &[],
            &[("a.ts", &["b.ts"])],
        );
        let config = AnalysisConfig::default();
        let detector = PatternDetector::new(&graph, &config);
        let orphans = detector.detect_orphan_files();

        assert_eq!(orphans.len(), 1);
        assert_eq!(orphans[0].file, "lonely.ts");
    }

    #[test]
    fn test_framework_managed_not_orphans() {
        let (graph, _f) = graph_from(
            &[("app/dashboard/page.tsx", &[]), ("lonely.ts", &[])],
            &[],
            &[],
        );
        let config = AnalysisConfig::default();
        let detector = PatternDetector::new(&graph, &config);
        let orphans = detector.detect_orphan_files();

        assert_eq!(orphans.len(), 1);
        assert_eq!(orphans[0].file, "lonely.ts");
    }

    #[test]
    fn test_test_files_not_orphans() {
        let (graph, _f) = graph_from(&[("__tests__/a.test.ts", &[])], &[], &[]);
        let config = AnalysisConfig::default();
        let detector = PatternDetector::new(&graph, &config);
        assert!(detector.detect_orphan_files().is_empty());
    }

    #[test]
    fn test_unused_exports() {
        let (graph, _f) = graph_from(
            &[(
                "lib/a.ts",
                &["export used:1:():void:", "export unused:5:():void:"],
            )],
            &[("main", "used")],
            &[],
        );
        let config = AnalysisConfig::default();
        let detector = PatternDetector::new(&graph, &config);
        let unused = detector.detect_unused_exports();

        assert_eq!(unused.len(), 1);
        assert_eq!(unused[0].symbol, "unused");
    }

    #[test]
    fn test_classify_file_type() {
        assert_eq!(classify_file_type("components/Button.tsx"), "component");
        assert_eq!(classify_file_type("lib/math.ts"), "utility");
        assert_eq!(classify_file_type("scripts/migrate.ts"), "script");
        assert_eq!(classify_file_type("core/engine.ts"), "module");
    }
}
