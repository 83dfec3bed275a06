//! Records delivered by the stock and sales resources

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::store::Identified;

/// Collection name used for products that belong to no collection.
pub const NO_COLLECTION: &str = "Ingen kollektion";

/// Size name used for lines without a size.
pub const NO_SIZE: &str = "N/A";

/// The two independently paginated resources of the query service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Stock,
    Sales,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Stock => "stock",
            ResourceKind::Sales => "sales",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One price of a variant in a given currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceEntry {
    pub amount: f64,
    pub currency: String,
}

impl PriceEntry {
    pub fn new(amount: f64, currency: &str) -> Self {
        Self {
            amount,
            currency: currency.to_string(),
        }
    }
}

/// Identity of a stock line, also the join key for sales.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StockKey {
    pub product_id: u64,
    pub size_name: String,
}

impl StockKey {
    pub fn new(product_id: u64, size_name: &str) -> Self {
        Self {
            product_id,
            size_name: size_name.to_string(),
        }
    }
}

impl fmt::Display for StockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.product_id, self.size_name)
    }
}

/// One (product, variant, size) stock line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockRecord {
    pub product_id: u64,
    pub product_name: String,
    pub product_number: String,
    pub status: String,
    pub collection_name: Option<String>,
    pub variant_name: String,
    pub size_name: String,
    pub quantity: u64,
    /// Variant prices, in the order the service lists them
    pub prices: Vec<PriceEntry>,
}

impl StockRecord {
    pub fn key(&self) -> StockKey {
        StockKey::new(self.product_id, &self.size_name)
    }

    /// Collection name, or [`NO_COLLECTION`] when the product has none.
    pub fn collection(&self) -> &str {
        self.collection_name.as_deref().unwrap_or(NO_COLLECTION)
    }

    /// Price entry in the home currency, falling back to the first entry.
    pub fn resolve_price(&self, home_currency: &str) -> Option<&PriceEntry> {
        self.prices
            .iter()
            .find(|p| p.currency == home_currency)
            .or_else(|| self.prices.first())
    }

    /// Resolved unit price, 0 when the variant has no price at all.
    pub fn unit_price(&self, home_currency: &str) -> f64 {
        self.resolve_price(home_currency)
            .map(|p| p.amount)
            .unwrap_or(0.0)
    }

    /// Quantity times resolved unit price.
    pub fn line_value(&self, home_currency: &str) -> f64 {
        self.quantity as f64 * self.unit_price(home_currency)
    }
}

impl Identified for StockRecord {
    type Id = StockKey;

    fn identity(&self) -> StockKey {
        self.key()
    }
}

/// One order line: units of a (product, size) sold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesLine {
    pub product_id: u64,
    pub product_name: String,
    pub size_name: String,
    pub quantity: u64,
}

impl SalesLine {
    /// Key of the stock line this sale draws from.
    pub fn stock_key(&self) -> StockKey {
        StockKey::new(self.product_id, &self.size_name)
    }
}

/// One order inside the active sales window.
///
/// The sales resource pages over orders, so the order is the unit the
/// store deduplicates and the driver counts against the page size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesOrder {
    pub order_id: String,
    pub order_date: NaiveDate,
    pub lines: Vec<SalesLine>,
}

impl SalesOrder {
    pub fn units(&self) -> u64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }
}

impl Identified for SalesOrder {
    type Id = String;

    fn identity(&self) -> String {
        self.order_id.clone()
    }
}

/// Filter for the stock resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockFilter {
    /// Warehouse to paginate, by name; `None` selects the first warehouse
    pub warehouse: Option<String>,
}

/// The selected sales period as an inclusive date window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesWindow {
    pub days: u32,
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl SalesWindow {
    /// Window covering the last `days` days up to and including `today`.
    pub fn last_days(days: u32, today: NaiveDate) -> Self {
        let from = today
            .checked_sub_days(Days::new(u64::from(days)))
            .unwrap_or(NaiveDate::MIN);
        Self {
            days,
            from,
            to: today,
        }
    }

    /// Start of the window as an RFC 3339 UTC timestamp.
    pub fn from_timestamp(&self) -> String {
        format!("{}T00:00:00Z", self.from.format("%Y-%m-%d"))
    }

    /// End of the window as an RFC 3339 UTC timestamp.
    pub fn to_timestamp(&self) -> String {
        format!("{}T23:59:59Z", self.to.format("%Y-%m-%d"))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.from && date <= self.to
    }
}
