//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `catalog` - Spreadsheet parsing and cached catalog/stock loading
//! - `airtable` - Airtable stock table client
//! - `email` - EmailJS client for contact, order and quote emails

pub mod airtable;
pub mod catalog;
pub mod email;

pub use airtable::{AirtableClient, AirtableError};
pub use catalog::{
    CatalogError, CatalogService, MissingIds, ParsedCatalog, StockListing, load_catalog, parse_catalog,
};
pub use email::{ContactMessage, EmailClient, EmailError};
