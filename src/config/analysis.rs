//! Stock classification and insight tuning.
//!
//! Pure data containers with validation; the rules that consume them live
//! in `crate::analytics`.

use serde::{Deserialize, Serialize};

/// Quantity boundaries between stock levels.
///
/// `0` is out of stock, `1..low` is low, `low..medium` is medium and
/// anything from `medium` up is high.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockThresholds {
    #[serde(default = "default_low_threshold")]
    pub low: u64,
    #[serde(default = "default_medium_threshold")]
    pub medium: u64,
}

pub fn default_low_threshold() -> u64 {
    5
}

pub fn default_medium_threshold() -> u64 {
    20
}

impl Default for StockThresholds {
    fn default() -> Self {
        Self {
            low: default_low_threshold(),
            medium: default_medium_threshold(),
        }
    }
}

impl StockThresholds {
    pub fn validate(&self) -> Result<(), String> {
        if self.low == 0 {
            return Err("thresholds.low must be > 0".to_string());
        }
        if self.medium <= self.low {
            return Err(format!(
                "thresholds.medium ({}) must be greater than thresholds.low ({})",
                self.medium, self.low
            ));
        }
        Ok(())
    }
}

/// Insight rule tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightConfig {
    /// Share of total items above which one collection dominates
    #[serde(default = "default_diversify_share")]
    pub diversify_share: f64,
    /// Days of cover below which a selling line should be reordered
    #[serde(default = "default_cover_days_warning")]
    pub cover_days_warning: f64,
    /// Number of best-selling lines to report
    #[serde(default = "default_top_sellers")]
    pub top_sellers: usize,
}

pub fn default_diversify_share() -> f64 {
    0.5
}

pub fn default_cover_days_warning() -> f64 {
    14.0
}

pub fn default_top_sellers() -> usize {
    10
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            diversify_share: default_diversify_share(),
            cover_days_warning: default_cover_days_warning(),
            top_sellers: default_top_sellers(),
        }
    }
}

impl InsightConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !(self.diversify_share > 0.0 && self.diversify_share < 1.0) {
            return Err(format!(
                "insights.diversify_share {} must be between 0 and 1",
                self.diversify_share
            ));
        }
        if self.cover_days_warning.is_nan() || self.cover_days_warning < 0.0 {
            return Err("insights.cover_days_warning must be >= 0".to_string());
        }
        Ok(())
    }
}
