//! Configuration module for codeatlas
//!
//! This module handles:
//! - Project-level configuration (codeatlas.toml)
//! - Detector threshold overrides
//! - Test-pattern and framework-managed-file matching

mod project_config;

pub use project_config::{
    glob_to_regex, AnalysisConfig, FrameworkConfig, IndexConfig, TestConfig, ThresholdConfig,
};
