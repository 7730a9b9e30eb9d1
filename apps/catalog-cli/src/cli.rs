use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "catalog")]
#[command(about = "Sync a WooCommerce product catalog into a local database")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the config file (defaults to the platform config dir)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the local database path
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Pull the whole remote catalog (Ctrl-C cancels)
    Sync,
    /// Re-fetch one product from the remote
    Pull {
        /// Remote product id
        id: i64,
    },
    /// Push one product's prices and stock to the remote
    Push {
        /// Remote product id
        id: i64,
    },
    /// Search local products by name or SKU
    Search {
        /// Search term (empty lists everything)
        #[arg(default_value = "")]
        term: String,
        /// Page number, 50 rows per page
        #[arg(short, long, default_value = "1")]
        page: u32,
        /// Output as JSON (always net prices)
        #[arg(long)]
        json: bool,
        /// Show prices with tax added, overriding the config
        #[arg(long, overrides_with = "no_tax")]
        tax: bool,
        /// Show net prices, overriding the config
        #[arg(long, overrides_with = "tax")]
        no_tax: bool,
    },
    /// Edit one field of a local product
    Edit {
        /// Remote product id
        id: i64,
        /// regular_price, sale_price or stock_quantity
        field: String,
        /// New value; empty clears a price or zeroes stock
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    /// Check that the remote store is reachable with the configured credentials
    Ping,
    /// Manage vendors and vendor stock
    Vendor {
        #[command(subcommand)]
        command: VendorCommands,
    },
    /// Show or write the config file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum VendorCommands {
    /// Add a vendor
    Add {
        /// Unique vendor name
        name: String,
        /// Vendor API URL
        #[arg(long, default_value = "")]
        url: String,
        /// Vendor API key
        #[arg(long, default_value = "")]
        key: String,
        /// Vendor API secret
        #[arg(long, default_value = "")]
        secret: String,
    },
    /// List vendors
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Record a vendor's stock for a product
    Stock {
        /// Remote product id
        id: i64,
        /// Vendor name
        vendor: String,
        /// Quantity on hand
        quantity: i64,
        /// Vendor price, e.g. 12.50
        #[arg(long)]
        price: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration (secrets masked)
    Show,
    /// Write a config file, keeping any values already set
    Init {
        /// Shop base URL
        #[arg(long, value_name = "URL")]
        url: Option<String>,
        /// REST API consumer key
        #[arg(long, value_name = "KEY")]
        key: Option<String>,
        /// REST API consumer secret
        #[arg(long, value_name = "SECRET")]
        secret: Option<String>,
    },
    /// Turn tax-inclusive listing prices on or off and save the choice
    Tax {
        #[arg(value_enum)]
        state: Switch,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Switch {
    On,
    Off,
}

impl Switch {
    pub fn is_on(self) -> bool {
        self == Switch::On
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_search() {
        let cli = Cli::try_parse_from(["catalog", "search", "mug", "--page", "2", "--json"]).unwrap();
        match cli.command {
            Commands::Search {
                term,
                page,
                json,
                tax,
                no_tax,
            } => {
                assert_eq!(term, "mug");
                assert_eq!(page, 2);
                assert!(json);
                assert!(!tax && !no_tax);
            }
            _ => panic!("expected search"),
        }
    }

    #[test]
    fn test_parse_edit_with_empty_value() {
        let cli = Cli::try_parse_from(["catalog", "edit", "7", "stock_quantity", ""]).unwrap();
        match cli.command {
            Commands::Edit { id, field, value } => {
                assert_eq!(id, 7);
                assert_eq!(field, "stock_quantity");
                assert_eq!(value, "");
            }
            _ => panic!("expected edit"),
        }
    }

    #[test]
    fn test_tax_flags_last_wins() {
        let cli = Cli::try_parse_from(["catalog", "search", "--tax", "--no-tax"]).unwrap();
        match cli.command {
            Commands::Search { tax, no_tax, .. } => {
                assert!(!tax);
                assert!(no_tax);
            }
            _ => panic!("expected search"),
        }
    }

    #[test]
    fn test_parse_config_tax() {
        let cli = Cli::try_parse_from(["catalog", "config", "tax", "off"]).unwrap();
        match cli.command {
            Commands::Config {
                command: ConfigCommands::Tax { state },
            } => assert_eq!(state, Switch::Off),
            _ => panic!("expected config tax"),
        }
    }

    #[test]
    fn test_global_db_path() {
        let cli = Cli::try_parse_from(["catalog", "sync", "--db-path", "/tmp/x.db"]).unwrap();
        assert_eq!(cli.db_path, Some(PathBuf::from("/tmp/x.db")));
    }
}
