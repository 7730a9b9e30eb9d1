use std::path::PathBuf;

use catalog_sync::config::mask;
use catalog_sync::SyncConfig;
use tracing::warn;

use crate::error::CliError;

pub fn run_config_show(config: &SyncConfig) -> Result<(), CliError> {
    let mut shown = config.clone();
    shown.store.key = mask(&shown.store.key);
    shown.store.secret = mask(&shown.store.secret);

    let text = toml::to_string_pretty(&shown).map_err(catalog_sync::SyncError::from)?;
    print!("{text}");
    Ok(())
}

pub fn run_config_init(
    path: Option<PathBuf>,
    url: Option<String>,
    key: Option<String>,
    secret: Option<String>,
) -> Result<(), CliError> {
    let mut config = SyncConfig::from_file(path.clone()).unwrap_or_else(|e| {
        warn!(error = %e, "Existing config unreadable, starting from defaults");
        SyncConfig::default()
    });

    if let Some(url) = url {
        config.store.url = url;
    }
    if let Some(key) = key {
        config.store.key = key;
    }
    if let Some(secret) = secret {
        config.store.secret = secret;
    }
    config.validate()?;

    let written = config.save(path)?;
    println!("Config written to {}", written.display());
    Ok(())
}

/// Saves the tax display preference, keeping everything else in the file.
pub fn run_config_tax(path: Option<PathBuf>, show_tax: bool) -> Result<(), CliError> {
    let mut config = SyncConfig::from_file(path.clone())?;
    config.display.show_tax = show_tax;

    let written = config.save(path)?;
    let state = if show_tax { "on" } else { "off" };
    println!(
        "Tax-inclusive prices {state} ({}%), saved to {}",
        config.display.tax_rate_percent,
        written.display()
    );
    Ok(())
}
