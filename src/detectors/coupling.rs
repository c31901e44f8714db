//! Tight coupling detection
//!
//! Flags files that both import widely and are widely imported. The score is
//! the product of the two fan counts normalized by project size, so a small
//! project with one busy file scores higher than a large one with the same
//! absolute counts.

use crate::detectors::PatternDetector;
use serde::Serialize;

/// A file coupled in both directions
#[derive(Debug, Clone, Serialize)]
pub struct CoupledFile {
    pub file: String,
    pub imports: usize,
    pub consumers: usize,
    pub score: f64,
}

impl PatternDetector<'_> {
    /// Files whose import and consumer fans both exceed the fan threshold
    /// and whose normalized coupling score exceeds the ratio threshold.
    pub fn detect_tight_coupling(&self) -> Vec<CoupledFile> {
        let fan = self.config.thresholds.coupling_fan;
        let ratio = self.config.thresholds.coupling_ratio;
        let total_files = self.graph.file_count();
        if total_files == 0 {
            return Vec::new();
        }

        let mut coupled: Vec<CoupledFile> = self
            .graph
            .file_paths()
            .into_iter()
            .filter_map(|path| {
                let file = self.graph.file(path)?;
                let imports = file.imports.len();
                let consumers = file.consumers.len();
                if imports <= fan || consumers <= fan {
                    return None;
                }
                let score = (imports * consumers) as f64 / (total_files * 2) as f64;
                if score <= ratio {
                    return None;
                }
                Some(CoupledFile {
                    file: path.to_string(),
                    imports,
                    consumers,
                    score,
                })
            })
            .collect();
        coupled.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.file.cmp(&b.file))
        });
        coupled
    }
}

#[cfg(test)]
mod tests {
    use crate::config::AnalysisConfig;
    use crate::detectors::PatternDetector;
    use crate::graph::testutil::graph_from;

    #[test]
    fn test_coupling_requires_both_fans() {
        // hub.ts imports 6 files and is imported by 6 others; side.ts only
        // imports.
        let imports: Vec<String> = (0..6).map(|i| format!("imp{i}.ts")).collect();
        let consumers: Vec<String> = (0..6).map(|i| format!("con{i}.ts")).collect();

        let mut files: Vec<(&str, &[&str])> = vec![("hub.ts", &[]), ("side.ts", &[])];
        for name in imports.iter().chain(consumers.iter()) {
            files.push((name.as_str(), &[]));
        }

        let import_refs: Vec<&str> = imports.iter().map(String::as_str).collect();
        let mut deps: Vec<(&str, &[&str])> = vec![("hub.ts", &import_refs)];
        let hub: &[&str] = &["hub.ts"];
        for consumer in &consumers {
            deps.push((consumer.as_str(), hub));
        }
        deps.push(("side.ts", &import_refs));

        let (graph, _f) = graph_from(&files, &[], &deps);
        let config = AnalysisConfig::default();
        let detector = PatternDetector::new(&graph, &config);
        let coupled = detector.detect_tight_coupling();

        // 14 files total: score = 36 / 28 = 1.29 > 0.3.
        assert_eq!(coupled.len(), 1);
        assert_eq!(coupled[0].file, "hub.ts");
        assert_eq!(coupled[0].imports, 6);
        assert_eq!(coupled[0].consumers, 6);
        assert!(coupled[0].score > 1.0);
    }

    #[test]
    fn test_no_files_no_coupling() {
        let (graph, _f) = graph_from(&[], &[("a", "b")], &[]);
        let config = AnalysisConfig::default();
        let detector = PatternDetector::new(&graph, &config);
        assert!(detector.detect_tight_coupling().is_empty());
    }
}
