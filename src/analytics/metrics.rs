//! Response-time statistics and the composite performance score.
//!
//! # Performance score
//!
//! | Component | Definition |
//! |-----------|-----------|
//! | Active score | `100 − active_count × active_penalty` |
//! | Response score | `100 − (avg_response − target) × response_penalty`, or 100 with no data |
//! | Overall | `active_weight × active + response_weight × response` |
//!
//! Each component is clamped to [0, 100] and rounded to one decimal.

use serde::Serialize;

use crate::config::AnalyticsConfig;

/// Summary of resolution times in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ResponseMetrics {
    pub avg: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

impl ResponseMetrics {
    /// Computes metrics over `samples`. All zeros when empty.
    pub fn calculate(samples: impl IntoIterator<Item = f64>) -> Self {
        let mut count = 0usize;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;

        for x in samples {
            count += 1;
            sum += x;
            min = min.min(x);
            max = max.max(x);
        }

        if count == 0 {
            return Self::default();
        }
        Self {
            avg: sum / count as f64,
            min,
            max,
            count,
        }
    }
}

/// Composite 0–100 operational score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PerformanceScore {
    pub overall: f64,
    pub active_score: f64,
    pub response_score: f64,
}

impl PerformanceScore {
    /// Scores the current load and average response time.
    ///
    /// A non-positive `avg_response` counts as no data.
    pub fn calculate(active_count: usize, avg_response: f64, config: &AnalyticsConfig) -> Self {
        let active_score = clamp_score(100.0 - active_count as f64 * config.active_penalty);
        let response_score = if avg_response > 0.0 {
            clamp_score(
                100.0 - (avg_response - config.target_response_minutes) * config.response_penalty,
            )
        } else {
            100.0
        };
        let overall = clamp_score(
            active_score * config.active_weight + response_score * config.response_weight,
        );

        Self {
            overall: round1(overall),
            active_score: round1(active_score),
            response_score: round1(response_score),
        }
    }

    /// Whether the overall score reaches `threshold`.
    pub fn meets(&self, threshold: f64) -> bool {
        self.overall >= threshold
    }
}

fn clamp_score(x: f64) -> f64 {
    x.clamp(0.0, 100.0)
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}
