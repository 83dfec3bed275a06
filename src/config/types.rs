//! Configuration type definitions and defaults

use serde::{Deserialize, Serialize};

use super::analysis::{InsightConfig, StockThresholds};
use crate::export::ExportFormat;
use crate::pagination::{DriverConfig, DEFAULT_MAX_PAGES, DEFAULT_PAGE_SIZE};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub pagination: PaginationConfig,
    #[serde(default)]
    pub stock: StockConfig,
    #[serde(default)]
    pub thresholds: StockThresholds,
    #[serde(default)]
    pub sales: SalesConfig,
    #[serde(default)]
    pub currency: CurrencyConfig,
    #[serde(default)]
    pub insights: InsightConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

/// Paging against the query service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Safety bound on pages per run
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
}

pub fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

pub fn default_max_pages() -> usize {
    DEFAULT_MAX_PAGES
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            max_pages: default_max_pages(),
        }
    }
}

impl PaginationConfig {
    pub fn driver(&self) -> DriverConfig {
        DriverConfig {
            page_size: self.page_size,
            max_pages: self.max_pages,
        }
    }
}

/// Stock resource selection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockConfig {
    /// Warehouse name; the first warehouse when unset
    #[serde(default)]
    pub warehouse: Option<String>,
}

/// Sales period selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesConfig {
    /// Periods, in days, offered for selection
    #[serde(default = "default_period_choices")]
    pub period_choices: Vec<u32>,
    /// Period selected when a session starts; none by default
    #[serde(default)]
    pub default_period: Option<u32>,
}

pub fn default_period_choices() -> Vec<u32> {
    vec![30, 160, 360]
}

impl Default for SalesConfig {
    fn default() -> Self {
        Self {
            period_choices: default_period_choices(),
            default_period: None,
        }
    }
}

/// Currency used for valuation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyConfig {
    #[serde(default = "default_home_currency")]
    pub home: String,
}

pub fn default_home_currency() -> String {
    "SEK".to_string()
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            home: default_home_currency(),
        }
    }
}

/// Report export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Filename prefix, followed by `_<date>.<ext>`
    #[serde(default = "default_filename_prefix")]
    pub filename_prefix: String,
    #[serde(default)]
    pub format: ExportFormat,
}

pub fn default_filename_prefix() -> String {
    "lageranalys".to_string()
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            filename_prefix: default_filename_prefix(),
            format: ExportFormat::default(),
        }
    }
}
