//! End-to-end pipeline tests
//!
//! Each test writes a real index artifact to disk, opens the backend against
//! it, builds the knowledge graph, and drives the analytics or detector
//! layers on top.

use codeatlas::analytics::CentralityAnalyzer;
use codeatlas::config::{AnalysisConfig, IndexConfig};
use codeatlas::detectors::PatternDetector;
use codeatlas::graph::KnowledgeGraph;
use codeatlas::index::{Clock, IndexBackend, IndexExpr, ManualClock};
use codeatlas::models::Risk;
use std::io::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};

fn write_index(doc: &serde_json::Value) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}", doc).unwrap();
    file.flush().unwrap();
    file
}

/// A small web-app shaped index: an entry point, a service layer, a shared
/// utility everything leans on, and one file nobody references.
fn webapp_index() -> serde_json::Value {
    serde_json::json!({
        "f": {
            "app/page.tsx": ["tsx", ["render:1:():JSX:fetchUsers,formatDate"]],
            "lib/api.ts": ["ts", [
                "export fetchUsers:5:():Promise:request,parseJson",
                "request:30:(url):Promise:retry",
                "retry:80:(fn):Promise:"
            ]],
            "lib/format.ts": ["ts", ["export formatDate:3:(d):string:pad", "pad:20:(n):string:"]],
            "lib/unused.ts": ["ts", ["export leftover:1:():void:"]],
            "__tests__/lib/api.test.ts": ["ts", ["testFetch:1:():void:fetchUsers"]]
        },
        "g": [
            ["render", "fetchUsers"],
            ["render", "formatDate"],
            ["fetchUsers", "request"],
            ["fetchUsers", "parseJson"],
            ["request", "retry"],
            ["formatDate", "pad"],
            ["testFetch", "fetchUsers"]
        ],
        "deps": {
            "app/page.tsx": ["lib/api.ts", "lib/format.ts"],
            "lib/api.ts": [],
            "lib/format.ts": [],
            "__tests__/lib/api.test.ts": ["lib/api.ts"]
        },
        "stats": {"files": 5, "functions": 8}
    })
}

fn build_graph(doc: &serde_json::Value) -> (KnowledgeGraph, tempfile::NamedTempFile) {
    let file = write_index(doc);
    let backend = IndexBackend::open(file.path(), &IndexConfig::default()).unwrap();
    let mut graph = KnowledgeGraph::new(backend);
    graph.initialize().unwrap();
    (graph, file)
}

#[test]
fn full_pipeline_on_webapp_index() {
    let (graph, _file) = build_graph(&webapp_index());

    let stats = graph.get_stats();
    assert_eq!(stats.file_count, 5);
    assert_eq!(stats.edge_count, 7);
    assert_eq!(stats.cycle_count, 0);

    // Symbol resolution ties call-graph nodes back to declaring files.
    assert_eq!(
        graph.function("request").unwrap().file.as_deref(),
        Some("lib/api.ts")
    );

    let config = AnalysisConfig::default();
    let analyzer = CentralityAnalyzer::new(&graph, config.thresholds.betweenness_samples);
    let report = analyzer.analyze_all(10);

    // fetchUsers has the most callers (render and testFetch).
    assert_eq!(report.functions.most_called[0].name, "fetchUsers");
    assert!(report.entry_points.contains(&"render".to_string()));
    assert!(report.critical_paths.longest.is_some());

    // The whole report serializes cleanly.
    let json = serde_json::to_string_pretty(&report).unwrap();
    assert!(json.contains("fetchUsers"));
}

#[test]
fn initialize_is_idempotent() {
    let file = write_index(&webapp_index());
    let backend = IndexBackend::open(file.path(), &IndexConfig::default()).unwrap();
    let mut graph = KnowledgeGraph::new(backend);
    graph.initialize().unwrap();
    let (nodes, edges) = (graph.node_count(), graph.edge_count());
    graph.initialize().unwrap();
    assert_eq!(graph.node_count(), nodes);
    assert_eq!(graph.edge_count(), edges);
    // Imports were not appended twice either.
    assert_eq!(graph.file("app/page.tsx").unwrap().imports.len(), 2);
}

#[test]
fn detectors_on_webapp_index() {
    let (graph, _file) = build_graph(&webapp_index());
    let config = AnalysisConfig::default();
    let detector = PatternDetector::new(&graph, &config);
    let report = detector.detect_all();

    // lib/unused.ts has no dependency edges in either direction.
    assert!(report.orphan_files.iter().any(|o| o.file == "lib/unused.ts"));
    // leftover is exported but never called.
    assert!(report.unused_exports.iter().any(|u| u.symbol == "leftover"));
    // lib/api.ts is imported by a test file; lib/format.ts is not.
    assert!(report.missing_tests.iter().all(|m| m.file != "lib/api.ts"));
    assert!(report.missing_tests.iter().any(|m| m.file == "lib/format.ts"));
    // No cycles in this index.
    assert!(report.circular.files.is_empty());
    assert!(report.circular.functions.is_empty());
}

#[test]
fn cyclic_index_trips_the_acyclicity_gate() {
    let (graph, _file) = build_graph(&serde_json::json!({
        "f": {},
        "g": [["a", "b"], ["b", "c"], ["c", "a"]],
        "deps": {}
    }));

    assert_eq!(graph.find_cycles().len(), 1);
    assert!(graph.topological_sort().is_none());
    assert!(graph.critical_path().is_none());

    // PageRank still conserves mass here: every node has out-degree 1.
    let total: f64 = graph.page_rank_scores(20, 0.85).values().sum();
    assert!((total - 1.0).abs() < 1e-9);
}

#[test]
fn god_object_threshold_end_to_end() {
    let mut f = serde_json::Map::new();
    let mut deps = serde_json::Map::new();
    let over: Vec<String> = (0..16).map(|i| format!("lib/dep{i:02}.ts")).collect();
    for dep in &over {
        f.insert(dep.clone(), serde_json::json!(["ts", []]));
        deps.insert(dep.clone(), serde_json::json!([]));
    }
    f.insert("lib/over.ts".into(), serde_json::json!(["ts", []]));
    f.insert("lib/at.ts".into(), serde_json::json!(["ts", []]));
    deps.insert("lib/over.ts".into(), serde_json::json!(over));
    deps.insert("lib/at.ts".into(), serde_json::json!(over[..15]));

    let (graph, _file) = build_graph(&serde_json::json!({"f": f, "g": [], "deps": deps}));
    let config = AnalysisConfig::default();
    let detector = PatternDetector::new(&graph, &config);
    let found = detector.detect_god_objects();

    // 16 imports is over the threshold of 15; exactly 15 is not.
    assert_eq!(found.files.len(), 1);
    assert_eq!(found.files[0].file, "lib/over.ts");
}

#[test]
fn hotspot_risk_bands() {
    // 30 callers on one function.
    let calls: Vec<serde_json::Value> = (0..30)
        .map(|i| serde_json::json!([format!("caller{i:02}"), "hub"]))
        .collect();
    let (graph, _file) = build_graph(&serde_json::json!({"f": {}, "g": calls, "deps": {}}));
    let analyzer = CentralityAnalyzer::new(&graph, 50);
    let hotspots = analyzer.identify_hotspots(5);

    assert_eq!(hotspots[0].name, "hub");
    // 30 callers, 0 callees: risk = 0.3 * 0.7 * 100 = 21, a LOW band score.
    assert_eq!(hotspots[0].risk, Risk::Low);
    assert!(hotspots[0]
        .recommendation
        .to_lowercase()
        .contains("facade"));
}

#[test]
fn cache_ttl_governs_rereads() {
    struct Shared(Arc<ManualClock>);
    impl Clock for Shared {
        fn now(&self) -> Instant {
            self.0.now()
        }
    }

    let file = write_index(&webapp_index());
    let clock = Arc::new(ManualClock::new());
    let backend = IndexBackend::open_with_clock(
        file.path(),
        &IndexConfig::default(),
        Box::new(Shared(clock.clone())),
    )
    .unwrap();

    let first = backend.query(&IndexExpr::FileKeys, true).unwrap();

    // Replace the artifact on disk. Within the TTL the cached result wins.
    std::fs::write(
        file.path(),
        serde_json::json!({"f": {"new.ts": ["ts", []]}, "g": [], "deps": {}}).to_string(),
    )
    .unwrap();
    assert_eq!(backend.query(&IndexExpr::FileKeys, true).unwrap(), first);

    // Past the TTL the artifact is re-read and re-parsed.
    clock.advance(Duration::from_secs(61));
    assert_eq!(backend.query(&IndexExpr::FileKeys, true).unwrap(), "new.ts");
}

#[test]
fn config_file_overrides_thresholds() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("codeatlas.toml"),
        "[thresholds]\ngod_object_imports = 2\n",
    )
    .unwrap();
    let config = AnalysisConfig::load(dir.path());
    assert_eq!(config.thresholds.god_object_imports, 2);
    // Untouched settings keep defaults.
    assert_eq!(config.index.cache_ttl_secs, 60);

    // The lowered threshold changes detection results.
    let (graph, _file) = build_graph(&serde_json::json!({
        "f": {"a.ts": ["ts", []], "b.ts": ["ts", []], "c.ts": ["ts", []], "d.ts": ["ts", []]},
        "g": [],
        "deps": {"a.ts": ["b.ts", "c.ts", "d.ts"]}
    }));
    let detector = PatternDetector::new(&graph, &config);
    assert_eq!(detector.detect_god_objects().files.len(), 1);
}

#[test]
fn dot_export_for_visualization() {
    let (graph, _file) = build_graph(&webapp_index());
    let dot = graph.to_dot(None);
    assert!(dot.starts_with("digraph calls {"));
    assert!(dot.contains("\"render\" -> \"fetchUsers\""));
}

#[test]
fn missing_index_is_fatal() {
    let err = IndexBackend::open(
        std::path::Path::new("/nonexistent/PROJECT_INDEX.json"),
        &IndexConfig::default(),
    );
    assert!(err.is_err());
}
