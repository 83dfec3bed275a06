//! Configuration management for Lageranalys

mod analysis;
mod io;
mod types;

pub use analysis::*;
pub use types::*;

use anyhow::Result;
use std::path::{Path, PathBuf};

impl Config {
    /// Get the config file path (~/.config/lageranalys/config.toml)
    pub fn config_path() -> Result<PathBuf> {
        io::config_path()
    }

    /// Get the config directory path (~/.config/lageranalys)
    pub fn config_dir() -> Result<PathBuf> {
        io::config_dir()
    }

    /// Load configuration from file, or return defaults if not found
    pub fn load() -> Result<Self> {
        io::load_from(&io::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        io::load_from(path)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        io::save_to(self, &io::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        io::save_to(self, path)
    }

    /// Validate all sections.
    ///
    /// Returns an error describing the first invalid value found.
    pub fn validate(&self) -> Result<(), String> {
        if self.pagination.page_size == 0 {
            return Err("pagination.page_size must be > 0".to_string());
        }
        if self.pagination.max_pages == 0 {
            return Err("pagination.max_pages must be > 0".to_string());
        }
        self.thresholds.validate()?;
        self.insights.validate()?;
        if self.sales.period_choices.is_empty() {
            return Err("sales.period_choices must not be empty".to_string());
        }
        if self.sales.period_choices.contains(&0) {
            return Err("sales.period_choices must be > 0".to_string());
        }
        if let Some(days) = self.sales.default_period {
            if !self.sales.period_choices.contains(&days) {
                return Err(format!(
                    "sales.default_period {} is not one of sales.period_choices",
                    days
                ));
            }
        }
        if self.currency.home.trim().is_empty() {
            return Err("currency.home must not be empty".to_string());
        }
        if self.export.filename_prefix.trim().is_empty() {
            return Err("export.filename_prefix must not be empty".to_string());
        }
        Ok(())
    }

    /// True when `days` is one of the configured sales periods
    pub fn is_period_choice(&self, days: u32) -> bool {
        self.sales.period_choices.contains(&days)
    }
}
