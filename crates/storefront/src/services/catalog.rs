//! Catalog loading for the shop and the stock lookup page.
//!
//! The shop reads the catalog spreadsheet (a CSV export). The stock page
//! reads either the same spreadsheet or the Airtable stock table. Loaded
//! catalogs are cached with `moka` for the configured TTL.

use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use moka::future::Cache;
use nexus_core::catalog::{LOW_STOCK_THRESHOLD, sample_catalog};
use nexus_core::{Availability, CatalogItem, Money, StockRecord, ToolId};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::config::{CatalogConfig, StockSource};
use crate::services::airtable::{AirtableClient, AirtableError};

/// Errors that can occur while loading a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The spreadsheet could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The spreadsheet is not valid CSV.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The spreadsheet has a header but no data rows.
    #[error("Catalog spreadsheet has no data rows")]
    Empty,

    /// The stock table could not be fetched.
    #[error("Airtable error: {0}")]
    Airtable(#[from] AirtableError),
}

/// What to do with rows whose Tool ID cell is blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingIds {
    /// Leave them out (the shop).
    Skip,
    /// Give them a `T001`-style id from their row position (the stock page).
    AssignByRow,
}

/// Result of parsing a spreadsheet.
#[derive(Debug, Clone, Default)]
pub struct ParsedCatalog {
    pub items: Vec<CatalogItem>,
    /// Rows dropped for having no Tool ID.
    pub skipped_rows: usize,
}

/// One spreadsheet row, every cell as text.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Row {
    #[serde(rename = "Tool ID")]
    tool_id: String,
    #[serde(rename = "Tool Name")]
    name: String,
    #[serde(rename = "Brand")]
    brand: String,
    #[serde(rename = "Tool Type")]
    tool_type: String,
    #[serde(rename = "Material")]
    material: String,
    #[serde(rename = "Coating")]
    coating: String,
    #[serde(rename = "Cutting Dia (mm)")]
    cutting_dia: String,
    #[serde(rename = "Shank Dia (mm)")]
    shank_dia: String,
    #[serde(rename = "Overall Length (mm)")]
    overall_length: String,
    #[serde(rename = "Insert Size")]
    insert_size: String,
    #[serde(rename = "Workpiece Material")]
    workpiece_material: String,
    #[serde(rename = "Quantity")]
    quantity: String,
    #[serde(rename = "Unit Price (₹)")]
    price: String,
    #[serde(rename = "Min Order Qty")]
    min_order_qty: String,
    #[serde(rename = "Application Notes")]
    application_notes: String,
}

impl Row {
    fn into_item(self, id: ToolId) -> CatalogItem {
        CatalogItem {
            id,
            name: self.name,
            brand: self.brand,
            tool_type: self.tool_type,
            material: self.material,
            coating: self.coating,
            cutting_dia: self.cutting_dia,
            shank_dia: self.shank_dia,
            overall_length: self.overall_length,
            insert_size: self.insert_size,
            workpiece_material: self.workpiece_material,
            quantity: parse_count(&self.quantity).unwrap_or(0),
            price: Money::new(parse_amount(&self.price).unwrap_or(Decimal::ZERO)),
            min_order_qty: parse_count(&self.min_order_qty)
                .filter(|qty| *qty > 0)
                .unwrap_or(1),
            application_notes: self.application_notes,
        }
    }
}

/// Numeric cell text with grouping commas and the rupee sign removed.
fn parse_amount(cell: &str) -> Option<Decimal> {
    let cleaned: String = cell
        .chars()
        .filter(|c| !matches!(c, ',' | '₹' | ' '))
        .collect();
    cleaned
        .parse::<Decimal>()
        .ok()
        .filter(|amount| amount.is_sign_positive())
}

fn parse_count(cell: &str) -> Option<u32> {
    parse_amount(cell).and_then(|amount| amount.trunc().to_u32())
}

/// Parse a catalog spreadsheet.
///
/// Non-numeric quantities and prices read as zero.
///
/// # Errors
///
/// Returns error if the CSV is malformed or has no data rows.
pub fn parse_catalog(reader: impl Read, missing_ids: MissingIds) -> Result<ParsedCatalog, CatalogError> {
    let mut csv = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut parsed = ParsedCatalog::default();
    let mut rows = 0;

    for (index, row) in csv.deserialize::<Row>().enumerate() {
        let row = row?;
        rows += 1;

        let id = if row.tool_id.is_empty() {
            match missing_ids {
                MissingIds::Skip => {
                    parsed.skipped_rows += 1;
                    continue;
                }
                MissingIds::AssignByRow => ToolId::for_row(index),
            }
        } else {
            ToolId::new(&row.tool_id)
        };
        parsed.items.push(row.into_item(id));
    }

    if rows == 0 {
        return Err(CatalogError::Empty);
    }
    Ok(parsed)
}

/// Read and parse a catalog spreadsheet from disk.
///
/// # Errors
///
/// Returns error if the file cannot be read or parsed.
pub async fn load_catalog(path: &Path, missing_ids: MissingIds) -> Result<ParsedCatalog, CatalogError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_catalog(bytes.as_slice(), missing_ids)
}

/// Items for the stock page along with their low-stock thresholds.
#[derive(Debug, Clone)]
pub struct StockListing {
    pub items: Vec<CatalogItem>,
    pub source: StockSource,
    /// Per-item minimum stock from the stock table.
    min_stock: HashMap<ToolId, u32>,
}

impl StockListing {
    /// Listing whose items all use the fixed spreadsheet threshold.
    #[must_use]
    pub fn from_spreadsheet(items: Vec<CatalogItem>) -> Self {
        Self {
            items,
            source: StockSource::Spreadsheet,
            min_stock: HashMap::new(),
        }
    }

    /// Listing built from stock table rows.
    #[must_use]
    pub fn from_records(records: &[StockRecord]) -> Self {
        Self {
            items: records.iter().map(StockRecord::to_catalog_item).collect(),
            source: StockSource::Airtable,
            min_stock: records
                .iter()
                .map(|record| (record.id.clone(), record.min_stock))
                .collect(),
        }
    }

    /// Availability of one item of this listing.
    #[must_use]
    pub fn availability(&self, item: &CatalogItem) -> Availability {
        let low_stock_at = self
            .min_stock
            .get(&item.id)
            .copied()
            .unwrap_or(LOW_STOCK_THRESHOLD);
        Availability::classify(item.quantity, low_stock_at)
    }
}

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
enum CacheKey {
    Shop,
    Stock,
}

#[derive(Debug, Clone)]
enum CacheValue {
    Shop(Arc<Vec<CatalogItem>>),
    Stock(Arc<StockListing>),
}

/// Loads and caches catalogs.
#[derive(Clone)]
pub struct CatalogService {
    inner: Arc<CatalogServiceInner>,
}

struct CatalogServiceInner {
    spreadsheet_path: PathBuf,
    stock_source: StockSource,
    airtable: Option<AirtableClient>,
    cache: Cache<CacheKey, CacheValue>,
}

impl CatalogService {
    #[must_use]
    pub fn new(config: &CatalogConfig, airtable: Option<AirtableClient>) -> Self {
        let cache = Cache::builder()
            .max_capacity(4)
            .time_to_live(config.cache_ttl)
            .build();

        Self {
            inner: Arc::new(CatalogServiceInner {
                spreadsheet_path: config.spreadsheet_path.clone(),
                stock_source: config.stock_source,
                airtable,
                cache,
            }),
        }
    }

    /// Items offered in the shop.
    ///
    /// Falls back to the built-in sample catalog when the spreadsheet
    /// cannot be loaded.
    #[instrument(skip(self))]
    pub async fn shop_items(&self) -> Arc<Vec<CatalogItem>> {
        if let Some(CacheValue::Shop(items)) = self.inner.cache.get(&CacheKey::Shop).await {
            debug!("Cache hit for shop catalog");
            return items;
        }

        let items = match load_catalog(&self.inner.spreadsheet_path, MissingIds::Skip).await {
            Ok(parsed) => {
                debug!(
                    count = parsed.items.len(),
                    skipped = parsed.skipped_rows,
                    "Loaded shop catalog"
                );
                parsed.items
            }
            Err(e) => {
                warn!(error = %e, "Catalog spreadsheet unavailable, using sample catalog");
                sample_catalog()
            }
        };

        let items = Arc::new(items);
        self.inner
            .cache
            .insert(CacheKey::Shop, CacheValue::Shop(Arc::clone(&items)))
            .await;
        items
    }

    /// Look up one shop item.
    pub async fn find(&self, id: &ToolId) -> Option<CatalogItem> {
        self.shop_items()
            .await
            .iter()
            .find(|item| &item.id == id)
            .cloned()
    }

    /// Items for the stock lookup page from the configured source.
    ///
    /// # Errors
    ///
    /// Returns error if the spreadsheet or stock table cannot be loaded.
    #[instrument(skip(self))]
    pub async fn stock_listing(&self) -> Result<Arc<StockListing>, CatalogError> {
        if let Some(CacheValue::Stock(listing)) = self.inner.cache.get(&CacheKey::Stock).await {
            debug!("Cache hit for stock listing");
            return Ok(listing);
        }

        let listing = match (&self.inner.airtable, self.inner.stock_source) {
            (Some(airtable), StockSource::Airtable) => {
                StockListing::from_records(&airtable.list_stock().await?)
            }
            _ => {
                let parsed =
                    load_catalog(&self.inner.spreadsheet_path, MissingIds::AssignByRow).await?;
                StockListing::from_spreadsheet(parsed.items)
            }
        };

        let listing = Arc::new(listing);
        self.inner
            .cache
            .insert(CacheKey::Stock, CacheValue::Stock(Arc::clone(&listing)))
            .await;
        Ok(listing)
    }

    /// Drop cached catalogs so the next request reloads them.
    pub async fn invalidate(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }
}
