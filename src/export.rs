//! Tabular export of the merged stock.
//!
//! One row per stock line, in store order. CSV columns and labels are a
//! fixed external contract:
//!
//! `Produkt,Kollektion,Variant,Storlek,Lagernivå,Status,Pris (<currency>),Totalt värde`
//!
//! Fields are quoted only when they contain a separator, quote or newline.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::analytics::StockLevel;
use crate::config::StockThresholds;
use crate::model::StockRecord;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to write JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to flush export: {0}")]
    Io(#[from] std::io::Error),

    #[error("Export produced invalid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// One exported stock line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRow {
    pub product: String,
    pub collection: String,
    pub variant: String,
    pub size: String,
    pub quantity: u64,
    pub level: StockLevel,
    /// Level label, e.g. "Lågt lager"
    pub status: &'static str,
    pub price: f64,
    pub currency: Option<String>,
    pub total_value: f64,
}

/// A finished export, ready to be written or downloaded.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportDocument {
    pub filename: String,
    pub format: ExportFormat,
    pub content: String,
    pub rows: usize,
}

/// Default export filename: `<prefix>_<YYYY-MM-DD>.<ext>`.
pub fn export_filename(prefix: &str, date: NaiveDate, format: ExportFormat) -> String {
    format!(
        "{}_{}.{}",
        prefix,
        date.format("%Y-%m-%d"),
        format.extension()
    )
}

pub struct ExportEncoder {
    thresholds: StockThresholds,
    home_currency: String,
}

impl ExportEncoder {
    pub fn new(thresholds: StockThresholds, home_currency: &str) -> Self {
        Self {
            thresholds,
            home_currency: home_currency.to_string(),
        }
    }

    pub fn rows(&self, records: &[StockRecord]) -> Vec<ExportRow> {
        records
            .iter()
            .map(|record| {
                let level = self.thresholds.classify(record.quantity);
                let price = record.resolve_price(&self.home_currency);
                let unit_price = price.map(|p| p.amount).unwrap_or(0.0);
                ExportRow {
                    product: record.product_name.clone(),
                    collection: record.collection().to_string(),
                    variant: record.variant_name.clone(),
                    size: record.size_name.clone(),
                    quantity: record.quantity,
                    level,
                    status: level.label(),
                    price: unit_price,
                    currency: price.map(|p| p.currency.clone()),
                    total_value: record.quantity as f64 * unit_price,
                }
            })
            .collect()
    }

    pub fn header(&self) -> [String; 8] {
        [
            "Produkt".to_string(),
            "Kollektion".to_string(),
            "Variant".to_string(),
            "Storlek".to_string(),
            "Lagernivå".to_string(),
            "Status".to_string(),
            format!("Pris ({})", self.home_currency),
            "Totalt värde".to_string(),
        ]
    }

    pub fn encode_csv(&self, records: &[StockRecord]) -> Result<String, ExportError> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        writer.write_record(self.header())?;
        for row in self.rows(records) {
            writer.write_record([
                row.product,
                row.collection,
                row.variant,
                row.size,
                row.quantity.to_string(),
                row.status.to_string(),
                format!("{:.2}", row.price),
                format!("{:.2}", row.total_value),
            ])?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| std::io::Error::new(e.error().kind(), e.error().to_string()))?;
        Ok(String::from_utf8(bytes)?)
    }

    pub fn encode_json(&self, records: &[StockRecord]) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(&self.rows(records))?)
    }

    pub fn encode(&self, records: &[StockRecord], format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => self.encode_csv(records),
            ExportFormat::Json => self.encode_json(records),
        }
    }

    pub fn document(
        &self,
        records: &[StockRecord],
        format: ExportFormat,
        prefix: &str,
        date: NaiveDate,
    ) -> Result<ExportDocument, ExportError> {
        Ok(ExportDocument {
            filename: export_filename(prefix, date, format),
            format,
            content: self.encode(records, format)?,
            rows: records.len(),
        })
    }
}
