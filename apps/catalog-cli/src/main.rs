//! Catalog CLI - pull a WooCommerce catalog into SQLite and push edits back.

mod cli;
mod commands;
mod error;

use clap::Parser;
use catalog_sync::{CatalogService, SyncConfig};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands, ConfigCommands, VendorCommands};
use crate::commands::config::{run_config_init, run_config_show, run_config_tax};
use crate::commands::products::{run_edit, run_search};
use crate::commands::remote::{run_ping, run_pull, run_push, run_sync};
use crate::commands::vendor::{run_vendor_add, run_vendor_list, run_vendor_stock};
use crate::error::CliError;

const DEFAULT_LOG_FILTER: &str = "info,catalog=debug,sqlx=warn";

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Commands::Config {
        command: ConfigCommands::Init { url, key, secret },
    } = cli.command
    {
        return run_config_init(cli.config, url, key, secret);
    }
    if let Commands::Config {
        command: ConfigCommands::Tax { state },
    } = cli.command
    {
        return run_config_tax(cli.config, state.is_on());
    }

    let mut config = SyncConfig::load(cli.config)?;
    if let Some(path) = cli.db_path {
        config.database.path = path;
    }

    match cli.command {
        Commands::Sync => run_sync(&CatalogService::from_config(&config).await?).await?,
        Commands::Pull { id } => run_pull(&CatalogService::from_config(&config).await?, id).await?,
        Commands::Push { id } => run_push(&CatalogService::from_config(&config).await?, id).await?,
        Commands::Ping => run_ping(&CatalogService::from_config(&config).await?).await?,
        Commands::Search {
            term,
            page,
            json,
            tax,
            no_tax,
        } => {
            let mut display = config.display.clone();
            if tax {
                display.show_tax = true;
            } else if no_tax {
                display.show_tax = false;
            }
            let service = CatalogService::open_local(&config).await?;
            run_search(&service, &term, page, json, display.listing_tax_rate()).await?;
        }
        Commands::Edit { id, field, value } => {
            let service = CatalogService::open_local(&config).await?;
            run_edit(&service, id, &field, &value).await?;
        }
        Commands::Vendor { command } => {
            let service = CatalogService::open_local(&config).await?;
            let db = service.database();
            match command {
                VendorCommands::Add {
                    name,
                    url,
                    key,
                    secret,
                } => run_vendor_add(db, &name, &url, &key, &secret).await?,
                VendorCommands::List { json } => run_vendor_list(db, json).await?,
                VendorCommands::Stock {
                    id,
                    vendor,
                    quantity,
                    price,
                } => run_vendor_stock(db, id, &vendor, quantity, price.as_deref()).await?,
            }
        }
        Commands::Config { command } => match command {
            ConfigCommands::Show => run_config_show(&config)?,
            ConfigCommands::Init { .. } | ConfigCommands::Tax { .. } => {}
        },
    }

    Ok(())
}
