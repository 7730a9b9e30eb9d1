use catalog_core::Money;
use catalog_db::Database;

use crate::error::CliError;

pub async fn run_vendor_add(
    db: &Database,
    name: &str,
    url: &str,
    key: &str,
    secret: &str,
) -> Result<(), CliError> {
    let id = db.vendors().add(name, url, key, secret).await?;
    println!("Vendor {name} added (id {id})");
    Ok(())
}

pub async fn run_vendor_list(db: &Database, as_json: bool) -> Result<(), CliError> {
    let vendors = db.vendors().list().await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&vendors)?);
        return Ok(());
    }
    if vendors.is_empty() {
        println!("No vendors.");
        return Ok(());
    }
    for vendor in vendors {
        let status = if vendor.is_active { "active" } else { "inactive" };
        println!("{:>4}  {:<30}  {:<8}  {}", vendor.id, vendor.name, status, vendor.api_url);
    }
    Ok(())
}

pub async fn run_vendor_stock(
    db: &Database,
    remote_id: i64,
    vendor_name: &str,
    quantity: i64,
    price: Option<&str>,
) -> Result<(), CliError> {
    let price = price.map(str::parse::<Money>).transpose()?;

    let product = db
        .products()
        .get_by_remote_id(remote_id)
        .await?
        .ok_or(CliError::ProductNotFound(remote_id))?;
    let vendor = db
        .vendors()
        .get_by_name(vendor_name)
        .await?
        .ok_or_else(|| CliError::VendorNotFound(vendor_name.to_string()))?;

    db.vendors()
        .upsert_stock(product.id, vendor.id, quantity, price)
        .await?;
    println!(
        "Stock for product {remote_id} at {}: {quantity}",
        vendor.name
    );
    Ok(())
}
