//! Airtable REST client for the hosted stock table.
//!
//! Rows are read with `GET /{base}/{table}` (following `offset` pagination),
//! looked up with `filterByFormula`, and updated with `PATCH`.

use chrono::NaiveDate;
use nexus_core::{Money, StockRecord, ToolId};
use reqwest::header::{HeaderMap, HeaderValue};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use crate::config::AirtableConfig;

/// Most rows returned by one listing.
const MAX_RECORDS: &str = "1000";

/// View whose ordering the stock page follows.
const VIEW: &str = "Grid view";

/// Errors that can occur when talking to Airtable.
#[derive(Debug, Error)]
pub enum AirtableError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// No row carries the requested tool id.
    #[error("Stock record not found for tool: {0}")]
    RecordNotFound(ToolId),

    /// Failed to build a request or parse a response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Client for one Airtable table.
#[derive(Clone)]
pub struct AirtableClient {
    client: reqwest::Client,
    table_url: Url,
}

impl AirtableClient {
    /// Create a new Airtable client.
    ///
    /// # Errors
    ///
    /// Returns error if the API URL is invalid or the HTTP client fails to build.
    pub fn new(config: &AirtableConfig) -> Result<Self, AirtableError> {
        let mut headers = HeaderMap::new();

        let auth_value = format!("Bearer {}", config.api_key.expose_secret());
        headers.insert(
            "Authorization",
            HeaderValue::from_str(&auth_value)
                .map_err(|e| AirtableError::Parse(format!("Invalid API key format: {e}")))?,
        );
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        let mut table_url = Url::parse(config.api_url.trim_end_matches('/'))
            .map_err(|e| AirtableError::Parse(format!("Invalid API URL: {e}")))?;
        table_url
            .path_segments_mut()
            .map_err(|()| AirtableError::Parse("API URL cannot be a base".to_string()))?
            .push(&config.base_id)
            .push(&config.table);

        Ok(Self { client, table_url })
    }

    /// Fetch every row of the stock table.
    ///
    /// # Errors
    ///
    /// Returns error if any page request fails.
    #[instrument(skip(self))]
    pub async fn list_stock(&self) -> Result<Vec<StockRecord>, AirtableError> {
        let mut records = Vec::new();
        let mut offset: Option<String> = None;

        loop {
            let mut url = self.table_url.clone();
            {
                let mut query = url.query_pairs_mut();
                query.append_pair("maxRecords", MAX_RECORDS);
                query.append_pair("view", VIEW);
                if let Some(offset) = &offset {
                    query.append_pair("offset", offset);
                }
            }

            let page: ListResponse = self.get_json(url).await?;
            records.extend(page.records.into_iter().map(Record::into_stock_record));

            match page.offset {
                Some(next) if !next.is_empty() => offset = Some(next),
                _ => break,
            }
        }

        debug!(count = records.len(), "Fetched stock records");
        Ok(records)
    }

    /// Find the row for one tool id.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self), fields(tool_id = %tool_id))]
    pub async fn find_by_tool_id(
        &self,
        tool_id: &ToolId,
    ) -> Result<Option<StockRecord>, AirtableError> {
        let mut url = self.table_url.clone();
        url.query_pairs_mut()
            .append_pair("filterByFormula", &id_formula(tool_id))
            .append_pair("maxRecords", "1");

        let page: ListResponse = self.get_json(url).await?;
        Ok(page
            .records
            .into_iter()
            .next()
            .map(Record::into_stock_record))
    }

    /// Set the quantity of a tool and stamp `lastUpdated` with `today`.
    ///
    /// # Errors
    ///
    /// Returns `RecordNotFound` if no row has this tool id, or an error if
    /// either request fails.
    #[instrument(skip(self), fields(tool_id = %tool_id))]
    pub async fn update_quantity(
        &self,
        tool_id: &ToolId,
        quantity: u32,
        today: NaiveDate,
    ) -> Result<StockRecord, AirtableError> {
        let existing = self
            .find_by_tool_id(tool_id)
            .await?
            .ok_or_else(|| AirtableError::RecordNotFound(tool_id.clone()))?;

        let mut url = self.table_url.clone();
        url.path_segments_mut()
            .map_err(|()| AirtableError::Parse("API URL cannot be a base".to_string()))?
            .push(&existing.record_id);

        let body = serde_json::json!({
            "fields": {
                "quantity": quantity,
                "lastUpdated": today.format("%Y-%m-%d").to_string(),
            }
        });

        let response = self.client.patch(url).json(&body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AirtableError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let record: Record = response
            .json()
            .await
            .map_err(|e| AirtableError::Parse(e.to_string()))?;

        Ok(record.into_stock_record())
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T, AirtableError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AirtableError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| AirtableError::Parse(e.to_string()))
    }
}

/// `{id}='T001'` with single quotes escaped.
fn id_formula(tool_id: &ToolId) -> String {
    format!("{{id}}='{}'", tool_id.as_str().replace('\'', "\\'"))
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Deserialize)]
struct ListResponse {
    records: Vec<Record>,
    #[serde(default)]
    offset: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Record {
    id: String,
    #[serde(default)]
    fields: Fields,
}

/// Table columns. Numbers may arrive as JSON numbers or text.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Fields {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    brand: Option<String>,
    #[serde(default)]
    quantity: Option<serde_json::Value>,
    #[serde(default)]
    min_stock: Option<serde_json::Value>,
    #[serde(default)]
    price: Option<serde_json::Value>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    last_updated: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

impl Record {
    fn into_stock_record(self) -> StockRecord {
        let fields = self.fields;
        StockRecord {
            record_id: self.id,
            id: ToolId::new(fields.id.unwrap_or_default()),
            name: fields.name.unwrap_or_default(),
            category: fields.category.unwrap_or_default(),
            brand: fields.brand.unwrap_or_default(),
            quantity: count_value(fields.quantity.as_ref()),
            min_stock: count_value(fields.min_stock.as_ref()),
            price: Money::new(decimal_value(fields.price.as_ref())),
            location: fields.location.unwrap_or_default(),
            last_updated: fields.last_updated.as_deref().and_then(parse_date),
            description: fields.description.unwrap_or_default(),
        }
    }
}

/// `YYYY-MM-DD`, ignoring any time part.
fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.get(..10).unwrap_or(value), "%Y-%m-%d").ok()
}

/// Whole, non-negative count from a number or numeric text; anything else is 0.
fn count_value(value: Option<&serde_json::Value>) -> u32 {
    decimal_value(value).trunc().to_u32().unwrap_or(0)
}

/// Non-negative decimal from a number or numeric text; anything else is 0.
fn decimal_value(value: Option<&serde_json::Value>) -> Decimal {
    let parsed = match value {
        Some(serde_json::Value::Number(n)) => n.to_string().parse::<Decimal>().ok(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<Decimal>().ok(),
        _ => None,
    };
    parsed
        .filter(|amount| amount.is_sign_positive())
        .unwrap_or(Decimal::ZERO)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn config() -> AirtableConfig {
        AirtableConfig {
            api_url: "https://api.airtable.com/v0/".to_string(),
            base_id: "appNexus".to_string(),
            table: "Stock".to_string(),
            api_key: SecretString::from("patQ8f2LkM1xZ9.b7c4e1a9f03d52c8"),
        }
    }

    #[test]
    fn test_table_url() {
        let client = AirtableClient::new(&config()).unwrap();
        assert_eq!(
            client.table_url.as_str(),
            "https://api.airtable.com/v0/appNexus/Stock"
        );
    }

    #[test]
    fn test_table_name_is_escaped() {
        let mut config = config();
        config.table = "Tool Stock".to_string();
        let client = AirtableClient::new(&config).unwrap();
        assert!(client.table_url.as_str().ends_with("/appNexus/Tool%20Stock"));
    }

    #[test]
    fn test_id_formula() {
        assert_eq!(id_formula(&ToolId::new("T001")), "{id}='T001'");
        assert_eq!(id_formula(&ToolId::new("T'1")), "{id}='T\\'1'");
    }

    #[test]
    fn test_record_conversion() {
        let json = serde_json::json!({
            "id": "recA1",
            "createdTime": "2024-05-01T10:00:00.000Z",
            "fields": {
                "id": "T010",
                "name": "Face Mill 63",
                "category": "Milling",
                "brand": "ISCAR",
                "quantity": 12,
                "minStock": "5",
                "price": 18500.5,
                "location": "Rack B2",
                "lastUpdated": "2024-06-01",
                "description": "Shoulder milling"
            }
        });
        let record: Record = serde_json::from_value(json).unwrap();
        let stock = record.into_stock_record();

        assert_eq!(stock.record_id, "recA1");
        assert_eq!(stock.id.as_str(), "T010");
        assert_eq!(stock.quantity, 12);
        assert_eq!(stock.min_stock, 5);
        assert_eq!(stock.price, Money::new(Decimal::new(185_005, 1)));
        assert_eq!(stock.last_updated, NaiveDate::from_ymd_opt(2024, 6, 1));
    }

    #[test]
    fn test_missing_and_garbage_fields_default() {
        let json = serde_json::json!({
            "id": "recB2",
            "fields": { "quantity": "lots", "price": -4, "minStock": 7.9 }
        });
        let record: Record = serde_json::from_value(json).unwrap();
        let stock = record.into_stock_record();

        assert_eq!(stock.id.as_str(), "");
        assert_eq!(stock.name, "");
        assert_eq!(stock.quantity, 0);
        assert_eq!(stock.min_stock, 7);
        assert_eq!(stock.price, Money::ZERO);
        assert_eq!(stock.last_updated, None);
    }
}
