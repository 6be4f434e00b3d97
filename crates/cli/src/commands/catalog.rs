//! Catalog spreadsheet checks.

use std::path::Path;

use nexus_core::catalog::{LOW_STOCK_THRESHOLD, total_units};
use nexus_core::{Availability, CatalogItem, FacetOptions};
use nexus_storefront::services::{MissingIds, load_catalog};
use tracing::{info, warn};

/// Parse a catalog spreadsheet and report what the storefront would see.
///
/// Reports item and unit counts, the facet values offered by the shop
/// filters, and every item at or below the low-stock threshold.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid catalog.
pub async fn check(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    info!(path = %path.display(), "Checking catalog spreadsheet");

    let parsed = load_catalog(path, MissingIds::Skip).await?;
    let items = &parsed.items;

    info!("Items: {}", items.len());
    info!("Units on hand: {}", total_units(items));
    if parsed.skipped_rows > 0 {
        warn!(
            "{} row(s) have no Tool ID and are hidden from the shop",
            parsed.skipped_rows
        );
    }

    let duplicates = duplicate_ids(items);
    for id in &duplicates {
        warn!("Duplicate Tool ID: {id}");
    }

    let facets = FacetOptions::collect(items);
    info!("Tool types: {}", facets.tool_types.join(", "));
    info!("Brands: {}", facets.brands.join(", "));
    info!("Materials: {}", facets.materials.join(", "));
    info!("Coatings: {}", facets.coatings.join(", "));
    info!("Workpieces: {}", facets.workpieces.join(", "));
    if let Some((lowest, highest)) = facets.price_range {
        info!("Price range: {lowest} - {highest}");
    }

    let short: Vec<&CatalogItem> = items
        .iter()
        .filter(|item| item.availability() != Availability::InStock)
        .collect();
    if short.is_empty() {
        info!("No items at or below {LOW_STOCK_THRESHOLD} units");
    } else {
        info!("Low or out of stock ({}):", short.len());
        for item in short {
            info!("  {} {} ({} units)", item.id, item.name, item.quantity);
        }
    }

    Ok(())
}

fn duplicate_ids(items: &[CatalogItem]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut duplicates = Vec::new();
    for item in items {
        let id = item.id.as_str();
        if !seen.insert(id) && !duplicates.iter().any(|dup| dup == id) {
            duplicates.push(id.to_string());
        }
    }
    duplicates
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use nexus_storefront::services::parse_catalog;

    use super::*;

    #[test]
    fn test_duplicate_ids_reported_once() {
        let text = "Tool ID,Tool Name,Quantity,Unit Price (₹)\n\
                    T1,Drill,5,100\n\
                    T2,Tap,5,100\n\
                    T1,Drill again,5,100\n\
                    T1,Drill thrice,5,100";
        let parsed = parse_catalog(text.as_bytes(), MissingIds::Skip).unwrap();

        assert_eq!(duplicate_ids(&parsed.items), vec!["T1".to_string()]);
    }

    #[tokio::test]
    async fn test_check_missing_file() {
        let result = check(Path::new("does/not/exist.csv")).await;
        assert!(result.is_err());
    }
}
