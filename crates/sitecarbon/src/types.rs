//! Core data types produced by an analysis.

use crate::grade::Grade;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Page metrics as reported by a metrics provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metrics {
    /// Total transferred bytes.
    pub byte_size: u64,
    pub request_count: u32,
    pub load_time_ms: u64,
    /// Served from a renewable-energy-attributed host.
    pub is_green_hosting: bool,
}

/// One model's estimate for a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelEstimate {
    pub model: String,
    pub grams: f64,
    pub grade: Grade,
}

/// Immutable outcome of analyzing one URL.
///
/// `estimates` holds exactly one entry per model registered with the analyzer
/// that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub url: String,
    pub metrics: Metrics,
    pub estimates: BTreeMap<String, ModelEstimate>,
}

impl AnalysisResult {
    pub fn estimate(&self, model: &str) -> Option<&ModelEstimate> {
        self.estimates.get(model)
    }

    pub fn grams(&self, model: &str) -> Option<f64> {
        self.estimate(model).map(|e| e.grams)
    }

    pub fn grade(&self, model: &str) -> Option<Grade> {
        self.estimate(model).map(|e| e.grade)
    }
}
