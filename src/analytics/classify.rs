//! Stock level classification and distributions.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::config::StockThresholds;

/// Stock level of one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StockLevel {
    Out,
    Low,
    Medium,
    High,
}

impl StockLevel {
    pub const ALL: [StockLevel; 4] = [
        StockLevel::Out,
        StockLevel::Low,
        StockLevel::Medium,
        StockLevel::High,
    ];

    /// Stable machine key, used by filters.
    pub fn key(&self) -> &'static str {
        match self {
            StockLevel::Out => "out",
            StockLevel::Low => "low",
            StockLevel::Medium => "medium",
            StockLevel::High => "high",
        }
    }

    /// Label shown in reports and exports.
    pub fn label(&self) -> &'static str {
        match self {
            StockLevel::Out => "Slut i lager",
            StockLevel::Low => "Lågt lager",
            StockLevel::Medium => "Medium lager",
            StockLevel::High => "Högt lager",
        }
    }
}

impl fmt::Display for StockLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for StockLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StockLevel::ALL
            .into_iter()
            .find(|level| level.key() == s)
            .ok_or_else(|| format!("Unknown stock level '{}'. Valid: out, low, medium, high", s))
    }
}

impl StockThresholds {
    pub fn classify(&self, quantity: u64) -> StockLevel {
        if quantity == 0 {
            StockLevel::Out
        } else if quantity < self.low {
            StockLevel::Low
        } else if quantity < self.medium {
            StockLevel::Medium
        } else {
            StockLevel::High
        }
    }
}

/// Stock lines per level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StockDistribution {
    pub out: usize,
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

impl StockDistribution {
    pub fn record(&mut self, level: StockLevel) {
        match level {
            StockLevel::Out => self.out += 1,
            StockLevel::Low => self.low += 1,
            StockLevel::Medium => self.medium += 1,
            StockLevel::High => self.high += 1,
        }
    }

    pub fn count(&self, level: StockLevel) -> usize {
        match level {
            StockLevel::Out => self.out,
            StockLevel::Low => self.low,
            StockLevel::Medium => self.medium,
            StockLevel::High => self.high,
        }
    }

    pub fn total(&self) -> usize {
        self.out + self.low + self.medium + self.high
    }

    /// Share of each level in percent, one decimal.
    pub fn shares(&self) -> BTreeMap<StockLevel, f64> {
        let total = self.total();
        StockLevel::ALL
            .into_iter()
            .map(|level| (level, percent(self.count(level), total)))
            .collect()
    }
}

/// `part / total` in percent rounded to one decimal, 0 for an empty total.
pub fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round1(part as f64 / total as f64 * 100.0)
}

pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
