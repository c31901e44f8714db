//! Knowledge graph construction and traversal
//!
//! Builds an in-memory call graph and file dependency map from the index
//! backend, then layers graph algorithms and centrality metrics on top. The
//! graph is immutable after `initialize`; every analysis pass is read-only.

mod algorithms;
mod centrality;
mod knowledge;

pub use algorithms::{Neighborhood, DEFAULT_PATH_BUDGET};
pub use knowledge::{FileNode, FunctionNode, KnowledgeGraph};
