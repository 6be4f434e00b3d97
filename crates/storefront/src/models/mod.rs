//! Storefront-side models.
//!
//! Domain types live in `nexus-core`; this module holds what the storefront
//! keeps per visitor.

pub mod session;

pub use session::{VisitorSession, keys};
