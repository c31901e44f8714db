//! codeatlas: knowledge graph analytics over extracted code indexes
//!
//! Takes a pre-built index artifact (`PROJECT_INDEX.json`) describing a
//! codebase's files, symbols, call edges, and import relationships, and turns
//! it into an in-memory knowledge graph with traversal algorithms, centrality
//! analytics, and architectural smell detection on top.
//!
//! The layers, bottom up:
//! - [`index`]: the only I/O boundary; queries the artifact with a TTL cache
//! - [`graph`]: graph construction, traversal, and centrality metrics
//! - [`analytics`]: ranked centrality reports, hotspots, bottlenecks
//! - [`detectors`]: smell detection and health grading
//! - [`cli`]: thin command dispatch printing JSON

pub mod analytics;
pub mod cli;
pub mod config;
pub mod detectors;
pub mod graph;
pub mod index;
pub mod models;
