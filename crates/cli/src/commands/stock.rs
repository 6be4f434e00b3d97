//! Hosted stock table commands.

use chrono::Local;
use nexus_core::ToolId;
use nexus_storefront::config::AirtableConfig;
use nexus_storefront::services::AirtableClient;
use tracing::info;

fn client() -> Result<AirtableClient, Box<dyn std::error::Error>> {
    let config = AirtableConfig::from_env()?
        .ok_or("AIRTABLE_BASE_ID and AIRTABLE_API_KEY must be set")?;
    Ok(AirtableClient::new(&config)?)
}

/// List every row of the stock table.
///
/// # Errors
///
/// Returns an error if Airtable is not configured or the request fails.
pub async fn list() -> Result<(), Box<dyn std::error::Error>> {
    let records = client()?.list_stock().await?;

    info!("{} stock record(s)", records.len());
    for record in &records {
        let updated = record
            .last_updated
            .map_or_else(|| "never".to_string(), |date| date.to_string());
        info!(
            "  {:<12} {:<40} qty {:>5} (min {}) {} [{}] updated {}",
            record.id.as_str(),
            record.name,
            record.quantity,
            record.min_stock,
            record.price,
            record.location,
            updated
        );
    }

    Ok(())
}

/// Set the quantity of one tool and stamp today's date.
///
/// # Errors
///
/// Returns an error if Airtable is not configured, the tool has no row, or
/// the update fails.
pub async fn set(tool_id: &str, quantity: u32) -> Result<(), Box<dyn std::error::Error>> {
    let tool_id = ToolId::new(tool_id);
    let today = Local::now().date_naive();

    let record = client()?.update_quantity(&tool_id, quantity, today).await?;

    info!(
        tool_id = %record.id,
        quantity = record.quantity,
        "Stock updated"
    );
    Ok(())
}
