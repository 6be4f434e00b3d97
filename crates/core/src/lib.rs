//! Nexus Core - Shared domain library for the Nexus Automation storefront.
//!
//! This crate provides the domain types used across all components:
//! - `storefront` - Public marketing site, stock lookup and shop
//! - `cli` - Operator tools for the catalog spreadsheet and stock table
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no HTTP
//! clients, no templates. Everything here can be unit tested in isolation.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, money and email addresses
//! - [`catalog`] - Catalog items, availability and facet options
//! - [`query`] - Search, facet filtering, sorting and pagination
//! - [`cart`] - Cart lines with stock and minimum-order clamping
//! - [`pricing`] - Tax and shipping policy, cart totals
//! - [`order`] - Checkout customer details, order drafts and receipts
//! - [`quote`] - Quote requests sent to the sales team
//! - [`stock`] - Stock records from the hosted stock table

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod order;
pub mod pricing;
pub mod query;
pub mod quote;
pub mod stock;
pub mod types;

pub use cart::{Cart, CartError, CartLine};
pub use catalog::{Availability, CatalogItem, FacetOptions};
pub use order::{CustomerInfo, FieldErrors, OrderDraft, OrderReceipt, PaymentMethod};
pub use pricing::{CartTotals, PricingPolicy};
pub use query::{CatalogQuery, Direction, EmptyFilterPolicy, Facet, Page, SearchScope, Sort, SortField};
pub use quote::{QuoteKind, QuoteRequest};
pub use stock::StockRecord;
pub use types::*;
