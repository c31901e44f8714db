//! Core data models for codeatlas
//!
//! Shared types used across the analytics and detector layers for
//! representing scores, risk bands, and recommendations.

use serde::{Deserialize, Serialize};

/// Risk bands for hotspot prioritization.
///
/// Bands are half-open: a score belongs to a band when it is strictly
/// below the band's upper bound, and `Critical` captures everything at
/// or above 80.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Risk {
    Minimal,
    Low,
    Medium,
    High,
    Critical,
}

impl Risk {
    /// Map a 0-100 risk score to its band.
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            Risk::Critical
        } else if score >= 60.0 {
            Risk::High
        } else if score >= 40.0 {
            Risk::Medium
        } else if score >= 20.0 {
            Risk::Low
        } else {
            Risk::Minimal
        }
    }
}

impl std::fmt::Display for Risk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Risk::Minimal => write!(f, "MINIMAL"),
            Risk::Low => write!(f, "LOW"),
            Risk::Medium => write!(f, "MEDIUM"),
            Risk::High => write!(f, "HIGH"),
            Risk::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Priority levels for recommendations
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// A prioritized remediation suggestion produced by the smell aggregator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub priority: Priority,
    pub issue: String,
    pub action: String,
}

/// A node paired with a centrality score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeScore {
    pub node: String,
    pub score: f64,
}

/// Aggregate statistics for a built knowledge graph
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub file_count: usize,
    pub avg_degree: f64,
    pub max_in_degree: usize,
    pub max_out_degree: usize,
    pub component_count: usize,
    pub cycle_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_band_boundaries() {
        // Band upper bounds are exclusive; 80 and above is critical.
        assert_eq!(Risk::from_score(0.0), Risk::Minimal);
        assert_eq!(Risk::from_score(19.9), Risk::Minimal);
        assert_eq!(Risk::from_score(20.0), Risk::Low);
        assert_eq!(Risk::from_score(40.0), Risk::Medium);
        assert_eq!(Risk::from_score(60.0), Risk::High);
        assert_eq!(Risk::from_score(79.9), Risk::High);
        assert_eq!(Risk::from_score(80.0), Risk::Critical);
        assert_eq!(Risk::from_score(100.0), Risk::Critical);
    }

    #[test]
    fn test_priority_ordering() {
        assert!(Priority::High > Priority::Medium);
        assert!(Priority::Medium > Priority::Low);
    }
}
