use std::io;

use catalog_core::{MoneyParseError, ValidationError};
use catalog_db::DbError;
use catalog_sync::SyncError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Sync(#[from] SyncError),
    #[error(transparent)]
    Database(#[from] DbError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("Invalid price: {0}")]
    Price(#[from] MoneyParseError),
    #[error("Product {0} not found in local database. Run `catalog pull {0}` first.")]
    ProductNotFound(i64),
    #[error("Vendor not found: {0}")]
    VendorNotFound(String),
    #[error("Remote rejected push of product {remote_id} (HTTP {status})")]
    PushRejected { remote_id: i64, status: u16 },
}
