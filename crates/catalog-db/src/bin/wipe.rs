//! # Wipe Tool
//!
//! Deletes every product and vendor stock row. Vendors are kept.
//!
//! ## Usage
//! ```bash
//! # Wipe the database named by CATALOG_DB_PATH
//! cargo run -p catalog-db --bin wipe -- --yes
//!
//! # Specify database path
//! cargo run -p catalog-db --bin wipe -- --db ./catalog.db --yes
//! ```
//!
//! Without `--yes` the tool only reports how many rows would be removed.

use std::env;

use catalog_db::{Database, DbConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    let mut db_path = env::var("CATALOG_DB_PATH").unwrap_or_else(|_| "./catalog.db".to_string());
    let mut confirmed = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--yes" | "-y" => confirmed = true,
            "--help" | "-h" => {
                println!("Catalog Wipe Tool");
                println!();
                println!("Usage: wipe [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: $CATALOG_DB_PATH or ./catalog.db)");
                println!("  -y, --yes          Actually delete; without it only counts rows");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => {
                eprintln!("Unknown argument: {other}");
                std::process::exit(2);
            }
        }
        i += 1;
    }

    let db = Database::new(DbConfig::new(&db_path)).await?;
    let existing = db.products().count().await?;

    println!("Database: {db_path}");
    println!("Products: {existing}");

    if !confirmed {
        println!("Dry run. Pass --yes to delete all products and vendor stock.");
        return Ok(());
    }

    let removed = db.wipe().await?;
    db.close().await;

    println!("Database wiped successfully ({removed} products removed).");
    Ok(())
}
