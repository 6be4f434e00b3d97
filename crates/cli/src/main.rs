//! Nexus Automation CLI - catalog checks and stock table management.
//!
//! # Usage
//!
//! ```bash
//! # Validate the catalog spreadsheet
//! nexus catalog check crates/storefront/data/cutting_tools_catalog.csv
//!
//! # List the hosted stock table
//! nexus stock list
//!
//! # Set the quantity of one tool
//! nexus stock set NX-EM-1001 42
//! ```
//!
//! # Commands
//!
//! - `catalog check` - Parse a spreadsheet and report counts, facets and low stock
//! - `stock list` - List rows of the Airtable stock table
//! - `stock set` - Update one tool's quantity

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "nexus")]
#[command(author, version, about = "Nexus Automation CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect catalog spreadsheets
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
    /// Manage the hosted stock table
    Stock {
        #[command(subcommand)]
        action: StockAction,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// Parse a spreadsheet and report counts, facets and low-stock items
    Check {
        /// Path to the catalog CSV export
        path: PathBuf,
    },
}

#[derive(Subcommand)]
enum StockAction {
    /// List every stock record
    List,
    /// Set a tool's quantity and stamp today's date
    Set {
        /// Tool ID as shown on the stock page
        tool_id: String,

        /// New quantity on hand
        quantity: u32,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Catalog { action } => match action {
            CatalogAction::Check { path } => commands::catalog::check(&path).await?,
        },
        Commands::Stock { action } => match action {
            StockAction::List => commands::stock::list().await?,
            StockAction::Set { tool_id, quantity } => {
                commands::stock::set(&tool_id, quantity).await?;
            }
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_stock_set() {
        let cli = Cli::try_parse_from(["nexus", "stock", "set", "NX-1", "12"]);
        assert!(matches!(
            cli.map(|cli| cli.command),
            Ok(Commands::Stock {
                action: StockAction::Set { quantity: 12, .. }
            })
        ));
    }
}
