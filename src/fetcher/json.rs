//! JSON response decoding for the query service.
//!
//! [`JsonPageFetcher`] adapts a raw [`QueryTransport`] (HTTP client, proxy,
//! recorded fixtures) into a [`PageFetcher`]. Response bodies are decoded
//! into typed records here; any shape violation becomes
//! [`FetchError::MalformedPage`] so the driver can stop the run without
//! merging anything from that page.

use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{FetchError, FetchResult, PageFetcher};
use crate::model::{
    PriceEntry, ResourceKind, SalesLine, SalesOrder, SalesWindow, StockFilter, StockRecord,
    NO_SIZE,
};

/// Query document for one page of warehouse stock.
pub const STOCK_QUERY: &str = r#"query WarehouseStock($limit: Int!, $page: Int!) {
  warehouses {
    name
    stock(limit: $limit, page: $page) {
      productSize {
        quantity
        size { name }
        productVariant {
          name
          prices { value currency { code } }
          product { id name status productNumber collection { name } }
        }
      }
    }
  }
}"#;

/// Query document for one page of orders inside a date window.
pub const SALES_QUERY: &str = r#"query SalesOrders($from: DateTimeTz!, $to: DateTimeTz!, $page: Int!, $limit: Int!) {
  orders(limit: $limit, page: $page, where: { orderDate: { from: $from, to: $to } }) {
    number
    orderDate
    lines {
      productVariant { product { id name } }
      size
      quantity
    }
  }
}"#;

/// A request handed to the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    pub kind: ResourceKind,
    pub query: &'static str,
    pub variables: Value,
}

/// Raw transport for the query service.
///
/// Returns the response body as JSON. Authentication, retries and timeouts
/// are the transport's business.
pub trait QueryTransport: Send + Sync {
    fn execute(&self, request: &QueryRequest) -> FetchResult<Value>;
}

/// [`PageFetcher`] over a JSON [`QueryTransport`].
pub struct JsonPageFetcher<T> {
    transport: T,
}

impl<T: QueryTransport> JsonPageFetcher<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

impl<T: QueryTransport> PageFetcher for JsonPageFetcher<T> {
    fn name(&self) -> &'static str {
        "json"
    }

    fn fetch_stock_page(
        &self,
        filter: &StockFilter,
        page: usize,
        limit: usize,
    ) -> FetchResult<Vec<StockRecord>> {
        let request = QueryRequest {
            kind: ResourceKind::Stock,
            query: STOCK_QUERY,
            variables: json!({ "limit": limit, "page": page }),
        };
        let body = self.transport.execute(&request)?;
        decode_stock_page(&body, filter)
    }

    fn fetch_sales_page(
        &self,
        window: &SalesWindow,
        page: usize,
        limit: usize,
    ) -> FetchResult<Vec<SalesOrder>> {
        let request = QueryRequest {
            kind: ResourceKind::Sales,
            query: SALES_QUERY,
            variables: json!({
                "from": window.from_timestamp(),
                "to": window.to_timestamp(),
                "page": page,
                "limit": limit,
            }),
        };
        let body = self.transport.execute(&request)?;
        decode_sales_page(&body)
    }
}

/// Decode one stock page for the warehouse selected by `filter`.
pub fn decode_stock_page(body: &Value, filter: &StockFilter) -> FetchResult<Vec<StockRecord>> {
    let data = StockData::deserialize(payload(body)?).map_err(malformed)?;

    let warehouse = match &filter.warehouse {
        Some(name) => data
            .warehouses
            .into_iter()
            .find(|w| w.name.as_deref() == Some(name.as_str()))
            .ok_or_else(|| FetchError::MalformedPage(format!("unknown warehouse '{}'", name)))?,
        None => match data.warehouses.into_iter().next() {
            Some(w) => w,
            None => return Ok(Vec::new()),
        },
    };

    warehouse
        .stock
        .into_iter()
        .map(StockItemDto::into_record)
        .collect::<Result<Vec<_>, String>>()
        .map_err(FetchError::MalformedPage)
}

/// Decode one page of orders.
pub fn decode_sales_page(body: &Value) -> FetchResult<Vec<SalesOrder>> {
    let data = SalesData::deserialize(payload(body)?).map_err(malformed)?;

    data.orders
        .into_iter()
        .map(OrderDto::into_order)
        .collect::<Result<Vec<_>, String>>()
        .map_err(FetchError::MalformedPage)
}

/// Unwrap the `data` envelope, surfacing service-level `errors`.
fn payload(body: &Value) -> FetchResult<&Value> {
    if let Some(errors) = body.get("errors").and_then(Value::as_array) {
        if let Some(first) = errors.first() {
            let message = first
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("query failed");
            return Err(FetchError::Transport(message.to_string()));
        }
    }
    Ok(body.get("data").unwrap_or(body))
}

fn malformed(e: serde_json::Error) -> FetchError {
    FetchError::MalformedPage(e.to_string())
}

fn parse_order_date(raw: &str) -> Result<NaiveDate, String> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.date_naive());
    }
    NaiveDate::parse_from_str(raw.get(..10).unwrap_or(raw), "%Y-%m-%d")
        .map_err(|_| format!("invalid orderDate '{}'", raw))
}

// Numbers and ids arrive as JSON numbers or strings depending on the field.

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberDto {
    Int(i64),
    Float(f64),
    Text(String),
}

impl NumberDto {
    fn as_f64(&self) -> Result<f64, String> {
        match self {
            NumberDto::Int(n) => Ok(*n as f64),
            NumberDto::Float(f) => Ok(*f),
            NumberDto::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| format!("invalid number '{}'", s)),
        }
    }

    fn as_quantity(&self) -> Result<u64, String> {
        let n = match self {
            NumberDto::Int(n) => *n,
            NumberDto::Float(f) if f.fract() == 0.0 => *f as i64,
            NumberDto::Float(f) => return Err(format!("fractional quantity {}", f)),
            NumberDto::Text(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| format!("invalid quantity '{}'", s))?,
        };
        u64::try_from(n).map_err(|_| format!("negative quantity {}", n))
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IdDto {
    Int(u64),
    Text(String),
}

impl IdDto {
    fn as_u64(&self) -> Result<u64, String> {
        match self {
            IdDto::Int(n) => Ok(*n),
            IdDto::Text(s) => s
                .trim()
                .parse::<u64>()
                .map_err(|_| format!("invalid product id '{}'", s)),
        }
    }

    fn into_string(self) -> String {
        match self {
            IdDto::Int(n) => n.to_string(),
            IdDto::Text(s) => s,
        }
    }
}

#[derive(Debug, Deserialize)]
struct NamedDto {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StockData {
    warehouses: Vec<WarehouseDto>,
}

#[derive(Debug, Deserialize)]
struct WarehouseDto {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    stock: Vec<StockItemDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StockItemDto {
    product_size: ProductSizeDto,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductSizeDto {
    #[serde(default)]
    quantity: Option<NumberDto>,
    #[serde(default)]
    size: Option<NamedDto>,
    product_variant: VariantDto,
}

#[derive(Debug, Deserialize)]
struct VariantDto {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    prices: Vec<PriceDto>,
    product: ProductDto,
}

#[derive(Debug, Deserialize)]
struct PriceDto {
    value: NumberDto,
    currency: CurrencyDto,
}

#[derive(Debug, Deserialize)]
struct CurrencyDto {
    code: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductDto {
    id: IdDto,
    name: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    product_number: Option<String>,
    #[serde(default)]
    collection: Option<NamedDto>,
}

impl StockItemDto {
    fn into_record(self) -> Result<StockRecord, String> {
        let size = self.product_size;
        let variant = size.product_variant;
        let product = variant.product;

        let quantity = match &size.quantity {
            Some(q) => q.as_quantity()?,
            None => 0,
        };
        let prices = variant
            .prices
            .iter()
            .map(|p| Ok(PriceEntry::new(p.value.as_f64()?, &p.currency.code)))
            .collect::<Result<Vec<_>, String>>()?;

        Ok(StockRecord {
            product_id: product.id.as_u64()?,
            product_name: product.name,
            product_number: product.product_number.unwrap_or_default(),
            status: product.status.unwrap_or_default(),
            collection_name: product.collection.and_then(|c| c.name),
            variant_name: variant.name.unwrap_or_default(),
            size_name: size
                .size
                .and_then(|s| s.name)
                .unwrap_or_else(|| NO_SIZE.to_string()),
            quantity,
            prices,
        })
    }
}

#[derive(Debug, Deserialize)]
struct SalesData {
    orders: Vec<OrderDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderDto {
    number: IdDto,
    order_date: String,
    #[serde(default)]
    lines: Vec<LineDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LineDto {
    product_variant: LineVariantDto,
    #[serde(default)]
    size: Option<String>,
    quantity: NumberDto,
}

#[derive(Debug, Deserialize)]
struct LineVariantDto {
    product: LineProductDto,
}

#[derive(Debug, Deserialize)]
struct LineProductDto {
    id: IdDto,
    #[serde(default)]
    name: Option<String>,
}

impl OrderDto {
    fn into_order(self) -> Result<SalesOrder, String> {
        let order_date = parse_order_date(&self.order_date)?;
        let lines = self
            .lines
            .into_iter()
            .map(|line| {
                Ok(SalesLine {
                    product_id: line.product_variant.product.id.as_u64()?,
                    product_name: line.product_variant.product.name.unwrap_or_default(),
                    size_name: line
                        .size
                        .filter(|s| !s.is_empty())
                        .unwrap_or_else(|| NO_SIZE.to_string()),
                    quantity: line.quantity.as_quantity()?,
                })
            })
            .collect::<Result<Vec<_>, String>>()?;

        Ok(SalesOrder {
            order_id: self.number.into_string(),
            order_date,
            lines,
        })
    }
}
