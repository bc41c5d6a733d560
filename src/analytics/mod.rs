//! Derived views: trends, hotspots, response metrics, predictions, scores.
//!
//! Predictions are frequency counts over a lookback window, not trained
//! models. Confidence grows linearly with sample count and saturates at 1.
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 1.2: Performance Measures

mod engine;
mod metrics;

pub use engine::{AnalyticsEngine, Distribution, Hotspot, Prediction, TrendReport, WeeklySummary};
pub use metrics::{PerformanceScore, ResponseMetrics};
