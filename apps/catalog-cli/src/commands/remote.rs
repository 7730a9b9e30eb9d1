//! Commands that talk to the remote store.

use std::io::Write;

use catalog_sync::{CatalogService, RemoteCatalog};
use tracing::info;

use crate::error::CliError;

/// Errors printed after a sync; the rest are only counted.
const SHOWN_RECORD_ERRORS: usize = 10;

pub async fn run_sync<C: RemoteCatalog>(service: &CatalogService<C>) -> Result<(), CliError> {
    let handle = service.start_full_sync().await?;

    handle.on_progress(|event| {
        let mut err = std::io::stderr().lock();
        let _ = write!(
            err,
            "\r{}/{} ({:.0}%)",
            event.processed,
            event.total,
            event.fraction() * 100.0
        );
        let _ = err.flush();
    });

    let canceller = handle.canceller();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nCancelling, waiting for in-flight records...");
            canceller.cancel();
        }
    });

    let report = handle.wait().await?;
    eprintln!();
    println!("{}", report.message());

    if !report.record_errors.is_empty() {
        println!("{} record(s) failed:", report.record_errors.len());
        for failure in report.record_errors.iter().take(SHOWN_RECORD_ERRORS) {
            println!("  #{}: {}", failure.remote_id, failure.message);
        }
        let hidden = report.record_errors.len().saturating_sub(SHOWN_RECORD_ERRORS);
        if hidden > 0 {
            println!("  ... and {hidden} more (see log)");
        }
    }

    info!(stop = ?report.producer_stop, pages = report.pages_fetched, "Sync finished");
    Ok(())
}

pub async fn run_pull<C: RemoteCatalog>(
    service: &CatalogService<C>,
    remote_id: i64,
) -> Result<(), CliError> {
    let local_id = service.sync_one(remote_id).await?;
    println!("Product {remote_id} synced (local id {local_id})");
    Ok(())
}

pub async fn run_push<C: RemoteCatalog>(
    service: &CatalogService<C>,
    remote_id: i64,
) -> Result<(), CliError> {
    let outcome = match service.push_one(remote_id).await {
        Err(catalog_sync::SyncError::ProductNotFound(id)) => {
            return Err(CliError::ProductNotFound(id))
        }
        other => other?,
    };

    if !outcome.success {
        return Err(CliError::PushRejected {
            remote_id,
            status: outcome.status,
        });
    }
    println!("Product {remote_id} pushed (HTTP {})", outcome.status);
    Ok(())
}

pub async fn run_ping<C: RemoteCatalog>(service: &CatalogService<C>) -> Result<(), CliError> {
    service.test_connection().await?;
    println!("Connection OK");
    Ok(())
}
