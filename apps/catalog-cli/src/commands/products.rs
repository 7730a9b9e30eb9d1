//! Local product commands: search and manual edits.

use catalog_core::{Money, Product, ProductField};
use catalog_sync::{CatalogService, EditOutcome, RemoteCatalog};

use crate::error::CliError;

pub async fn run_search<C: RemoteCatalog>(
    service: &CatalogService<C>,
    term: &str,
    page: u32,
    as_json: bool,
    tax_rate: Option<u32>,
) -> Result<(), CliError> {
    let results = service.search(term.trim(), page).await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.rows.is_empty() {
        println!("No products found.");
    } else {
        for line in format_product_lines(&results.rows, tax_rate) {
            println!("{line}");
        }
        if let Some(rate) = tax_rate {
            println!("Prices include {rate}% tax");
        }
    }
    println!(
        "Page {} of {} ({} matching)",
        results.page,
        results.total_pages.max(1),
        results.total_rows
    );
    Ok(())
}

pub async fn run_edit<C: RemoteCatalog>(
    service: &CatalogService<C>,
    remote_id: i64,
    field: &str,
    value: &str,
) -> Result<(), CliError> {
    let field: ProductField = field.parse()?;

    match service.edit_field(remote_id, field, value).await? {
        EditOutcome::Updated => {
            println!("Product {remote_id}: {field} updated");
            Ok(())
        }
        EditOutcome::NotFound => Err(CliError::ProductNotFound(remote_id)),
    }
}

/// One table line per product. Prices get `tax_rate` percent added when set.
fn format_product_lines(rows: &[Product], tax_rate: Option<u32>) -> Vec<String> {
    let shown = |price: Option<Money>| match tax_rate {
        Some(rate) => price.map(|m| m.with_percent(rate)),
        None => price,
    };
    rows.iter()
        .map(|p| {
            format!(
                "{:>8}  {:<40}  {:<14}  {:>10}  {:>10}  {:>6}",
                p.remote_id,
                truncate(&p.name, 40),
                p.sku.as_deref().unwrap_or("-"),
                price_cell(shown(p.regular_price())),
                price_cell(shown(p.sale_price())),
                p.stock_quantity
                    .map(|q| q.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            )
        })
        .collect()
}

fn price_cell(price: Option<Money>) -> String {
    price.map(|m| m.to_string()).unwrap_or_else(|| "-".to_string())
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
    }

    #[test]
    fn test_price_cell() {
        assert_eq!(price_cell(None), "-");
        assert_eq!(price_cell(Some(Money::from_cents(505))), "5.05");
    }

    #[test]
    fn test_listing_adds_tax_only_when_set() {
        let rows = vec![Product {
            id: 1,
            remote_id: 10,
            name: "Mug".into(),
            sku: None,
            regular_price_cents: Some(1000),
            sale_price_cents: None,
            stock_quantity: Some(3),
            categories: None,
            last_synced: chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        }];

        let net = format_product_lines(&rows, None);
        assert!(net[0].contains("10.00"));

        let gross = format_product_lines(&rows, Some(19));
        assert!(gross[0].contains("11.90"));
        assert!(!gross[0].contains("10.00"));
    }
}
