//! Centrality analytics
//!
//! Composes raw graph metrics into ranked reports: function and file
//! centrality, hotspots with risk bands, entry points, critical paths, and
//! bottleneck classification.

mod analyzer;

pub use analyzer::{
    Bottleneck, BottleneckKind, CentralityAnalyzer, CentralityReport, CombinedDegree,
    CriticalPaths, FileCentrality, FileScore, FunctionCentrality, Hotspot, HotspotKind,
    MostCalled, MostCalling, TraversedPath,
};
