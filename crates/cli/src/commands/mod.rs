//! Subcommand implementations.

pub mod catalog;
pub mod stock;
