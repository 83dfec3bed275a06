//! Rule-based insights over computed aggregates.
//!
//! Every rule is a free function from [`InsightInputs`] to an optional
//! [`Insight`]. [`evaluate`] runs them in [`RULES`] order, so the output
//! order is fixed regardless of input.

use serde::Serialize;

use super::classify::StockDistribution;
use crate::config::InsightConfig;

/// Which rule produced an insight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum InsightKind {
    OutOfStock,
    LowStock,
    Diversify,
    ReorderSoon,
    SlowMovers,
}

impl InsightKind {
    pub fn id(&self) -> &'static str {
        match self {
            InsightKind::OutOfStock => "out-of-stock",
            InsightKind::LowStock => "low-stock",
            InsightKind::Diversify => "diversify",
            InsightKind::ReorderSoon => "reorder-soon",
            InsightKind::SlowMovers => "slow-movers",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insight {
    pub kind: InsightKind,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    pub recommendation: String,
}

/// Aggregates the rules look at.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InsightInputs {
    pub distribution: StockDistribution,
    pub largest_collection: Option<String>,
    /// Fraction (0..=1) of stock lines in the largest collection
    pub largest_collection_share: f64,
    /// Whether a sales period is selected
    pub period_active: bool,
    /// Lines with positive stock and days of cover under the warning level
    pub reorder_candidates: usize,
    /// High-stock lines that sold nothing in the period
    pub slow_movers: usize,
}

pub type Rule = fn(&InsightInputs, &InsightConfig) -> Option<Insight>;

/// All rules in evaluation order.
pub const RULES: [Rule; 5] = [
    out_of_stock,
    low_stock,
    diversify,
    reorder_soon,
    slow_movers,
];

pub fn evaluate(inputs: &InsightInputs, config: &InsightConfig) -> Vec<Insight> {
    RULES.iter().filter_map(|rule| rule(inputs, config)).collect()
}

pub fn out_of_stock(inputs: &InsightInputs, _config: &InsightConfig) -> Option<Insight> {
    let out = inputs.distribution.out;
    if out == 0 {
        return None;
    }
    Some(Insight {
        kind: InsightKind::OutOfStock,
        severity: Severity::Critical,
        title: "Produkter slut i lager".to_string(),
        description: format!("{} lagerrader har slut i lager.", out),
        recommendation: "Beställ påfyllning för de slutsålda produkterna.".to_string(),
    })
}

pub fn low_stock(inputs: &InsightInputs, _config: &InsightConfig) -> Option<Insight> {
    let low = inputs.distribution.low;
    if low == 0 {
        return None;
    }
    Some(Insight {
        kind: InsightKind::LowStock,
        severity: Severity::Warning,
        title: "Lågt lager".to_string(),
        description: format!("{} lagerrader har lågt lager.", low),
        recommendation: "Planera påfyllning innan produkterna tar slut.".to_string(),
    })
}

pub fn diversify(inputs: &InsightInputs, config: &InsightConfig) -> Option<Insight> {
    let name = inputs.largest_collection.as_deref()?;
    if inputs.largest_collection_share <= config.diversify_share {
        return None;
    }
    Some(Insight {
        kind: InsightKind::Diversify,
        severity: Severity::Info,
        title: "Koncentrerat sortiment".to_string(),
        description: format!(
            "Kollektionen {} står för {:.1}% av lagerraderna.",
            name,
            inputs.largest_collection_share * 100.0
        ),
        recommendation: "Överväg att bredda sortimentet med fler kollektioner.".to_string(),
    })
}

pub fn reorder_soon(inputs: &InsightInputs, config: &InsightConfig) -> Option<Insight> {
    if !inputs.period_active || inputs.reorder_candidates == 0 {
        return None;
    }
    Some(Insight {
        kind: InsightKind::ReorderSoon,
        severity: Severity::Warning,
        title: "Snart slut".to_string(),
        description: format!(
            "{} lagerrader räcker mindre än {} dagar med nuvarande försäljningstakt.",
            inputs.reorder_candidates, config.cover_days_warning
        ),
        recommendation: "Lägg beställning på de snabbast säljande produkterna.".to_string(),
    })
}

pub fn slow_movers(inputs: &InsightInputs, _config: &InsightConfig) -> Option<Insight> {
    if !inputs.period_active || inputs.slow_movers == 0 {
        return None;
    }
    Some(Insight {
        kind: InsightKind::SlowMovers,
        severity: Severity::Info,
        title: "Trögsålda produkter".to_string(),
        description: format!(
            "{} lagerrader med högt lager har inte sålt något under perioden.",
            inputs.slow_movers
        ),
        recommendation: "Överväg kampanjer eller minskade inköp.".to_string(),
    })
}
