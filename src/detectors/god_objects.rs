//! God object detection
//!
//! Files that import too much and functions that call too much, against the
//! configured import threshold.

use crate::detectors::PatternDetector;
use serde::Serialize;

/// A file importing more than the threshold allows
#[derive(Debug, Clone, Serialize)]
pub struct GodFile {
    pub file: String,
    pub imports: usize,
    /// First few imports, for orientation
    pub sample_imports: Vec<String>,
}

/// A function calling more distinct functions than the threshold allows
#[derive(Debug, Clone, Serialize)]
pub struct GodFunction {
    pub name: String,
    pub calls: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct GodObjects {
    pub files: Vec<GodFile>,
    pub functions: Vec<GodFunction>,
}

impl PatternDetector<'_> {
    /// Files and functions exceeding the god-object import threshold
    /// (strictly greater than).
    pub fn detect_god_objects(&self) -> GodObjects {
        let threshold = self.config.thresholds.god_object_imports;

        let mut files: Vec<GodFile> = self
            .graph
            .file_paths()
            .into_iter()
            .filter_map(|path| {
                let file = self.graph.file(path)?;
                if file.imports.len() <= threshold {
                    return None;
                }
                Some(GodFile {
                    file: path.to_string(),
                    imports: file.imports.len(),
                    sample_imports: file.imports.iter().take(5).cloned().collect(),
                })
            })
            .collect();
        files.sort_by(|a, b| b.imports.cmp(&a.imports).then_with(|| a.file.cmp(&b.file)));

        let mut functions: Vec<GodFunction> = self
            .graph
            .node_names()
            .iter()
            .filter_map(|name| {
                let calls = self.graph.out_degree(name);
                if calls <= threshold {
                    return None;
                }
                Some(GodFunction {
                    name: name.to_string(),
                    calls,
                })
            })
            .collect();
        functions.sort_by(|a, b| b.calls.cmp(&a.calls).then_with(|| a.name.cmp(&b.name)));

        GodObjects { files, functions }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::AnalysisConfig;
    use crate::detectors::PatternDetector;
    use crate::graph::testutil::graph_from;

    #[test]
    fn test_threshold_is_strictly_greater() {
        // One file with 16 imports (flagged), one with exactly 15 (not).
        let over: Vec<String> = (0..16).map(|i| format!("dep{i:02}.ts")).collect();
        let at: Vec<String> = (0..15).map(|i| format!("dep{i:02}.ts")).collect();
        let mut files: Vec<(&str, &[&str])> = vec![("over.ts", &[]), ("at.ts", &[])];
        let dep_names: Vec<&str> = over.iter().map(String::as_str).collect();
        let at_names: Vec<&str> = at.iter().map(String::as_str).collect();
        for &dep in &dep_names {
            files.push((dep, &[]));
        }
        let deps: Vec<(&str, &[&str])> = vec![("over.ts", &dep_names), ("at.ts", &at_names)];

        let (graph, _f) = graph_from(&files, &[], &deps);
        let config = AnalysisConfig::default();
        let detector = PatternDetector::new(&graph, &config);
        let found = detector.detect_god_objects();

        assert_eq!(found.files.len(), 1);
        assert_eq!(found.files[0].file, "over.ts");
        assert_eq!(found.files[0].imports, 16);
        assert_eq!(found.files[0].sample_imports.len(), 5);
    }

    #[test]
    fn test_god_function_by_out_degree() {
        let calls: Vec<(String, String)> = (0..16).map(|i| ("big".to_string(), format!("f{i}"))).collect();
        let call_refs: Vec<(&str, &str)> = calls
            .iter()
            .map(|(a, b)| (a.as_str(), b.as_str()))
            .collect();
        let (graph, _f) = graph_from(&[], &call_refs, &[]);
        let config = AnalysisConfig::default();
        let detector = PatternDetector::new(&graph, &config);
        let found = detector.detect_god_objects();

        assert_eq!(found.functions.len(), 1);
        assert_eq!(found.functions[0].name, "big");
        assert_eq!(found.functions[0].calls, 16);
    }
}
