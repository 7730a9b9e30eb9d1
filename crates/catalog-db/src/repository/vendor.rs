//! # Vendor Repository
//!
//! Vendors are external stock sources created administratively. Each vendor
//! can report a quantity and price per product; those reports live in
//! `vendor_stocks`, one row per (product, vendor) pair.

use chrono::Local;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use catalog_core::{Money, ValidationError, Vendor, VendorStock};

/// Repository for vendors and per-vendor stock.
#[derive(Debug, Clone)]
pub struct VendorRepository {
    pool: SqlitePool,
}

impl VendorRepository {
    pub fn new(pool: SqlitePool) -> Self {
        VendorRepository { pool }
    }

    /// Adds a vendor. New vendors start active.
    ///
    /// ## Returns
    /// * `Ok(i64)` - Local vendor id
    /// * `Err(DbError::UniqueViolation)` - A vendor with that name exists
    pub async fn add(
        &self,
        name: &str,
        api_url: &str,
        api_key: &str,
        api_secret: &str,
    ) -> DbResult<i64> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::Required {
                field: "name".to_string(),
            }
            .into());
        }

        let result = sqlx::query(
            r#"
            INSERT INTO vendors (name, api_url, api_key, api_secret, is_active)
            VALUES (?1, ?2, ?3, ?4, 1)
            "#,
        )
        .bind(name)
        .bind(api_url)
        .bind(api_key)
        .bind(api_secret)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::UniqueViolation {
                field,
                value: name.to_string(),
            },
            other => other,
        })?;

        let id = result.last_insert_rowid();
        info!(vendor_id = id, name = %name, "Vendor added");
        Ok(id)
    }

    pub async fn get_by_name(&self, name: &str) -> DbResult<Option<Vendor>> {
        let vendor = sqlx::query_as::<_, Vendor>(
            r#"
            SELECT id, name, api_url, api_key, api_secret, is_active, last_sync
            FROM vendors
            WHERE name = ?1
            "#,
        )
        .bind(name.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(vendor)
    }

    /// Lists all vendors by name.
    pub async fn list(&self) -> DbResult<Vec<Vendor>> {
        let vendors = sqlx::query_as::<_, Vendor>(
            r#"
            SELECT id, name, api_url, api_key, api_secret, is_active, last_sync
            FROM vendors
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(vendors)
    }

    /// Records a vendor's quantity and price for a product.
    ///
    /// Keyed on `(product_id, vendor_id)`: the first report creates the row,
    /// later reports overwrite quantity, price and `last_updated`.
    ///
    /// ## Returns
    /// * `Ok(i64)` - Vendor stock row id (stable across updates)
    /// * `Err(DbError::ForeignKeyViolation)` - Unknown product or vendor
    /// * `Err(DbError::InvalidPayload)` - Negative quantity or price
    pub async fn upsert_stock(
        &self,
        product_id: i64,
        vendor_id: i64,
        quantity: i64,
        price: Option<Money>,
    ) -> DbResult<i64> {
        if quantity < 0 {
            return Err(ValidationError::Negative {
                field: "stock_quantity".to_string(),
            }
            .into());
        }
        if price.is_some_and(|p| p.is_negative()) {
            return Err(ValidationError::Negative {
                field: "price".to_string(),
            }
            .into());
        }

        debug!(product_id, vendor_id, quantity, "Upserting vendor stock");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO vendor_stocks (product_id, vendor_id, stock_quantity, price_cents, last_updated)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(product_id, vendor_id) DO UPDATE SET
                stock_quantity = excluded.stock_quantity,
                price_cents = excluded.price_cents,
                last_updated = excluded.last_updated
            RETURNING id
            "#,
        )
        .bind(product_id)
        .bind(vendor_id)
        .bind(quantity)
        .bind(price.map(|p| p.cents()))
        .bind(Local::now().naive_local())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(id)
    }

    /// All vendor stock rows for one product, by vendor id.
    pub async fn stocks_for_product(&self, product_id: i64) -> DbResult<Vec<VendorStock>> {
        let stocks = sqlx::query_as::<_, VendorStock>(
            r#"
            SELECT id, product_id, vendor_id, stock_quantity, price_cents, last_updated
            FROM vendor_stocks
            WHERE product_id = ?1
            ORDER BY vendor_id
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(stocks)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig, DbError};
    use catalog_core::{Money, ProductPayload};

    async fn db_with_product() -> (Database, i64) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product_id = db
            .products()
            .upsert(&ProductPayload::new(1, "Kettle"))
            .await
            .unwrap();
        (db, product_id)
    }

    #[tokio::test]
    async fn test_add_and_get_vendor() {
        let (db, _) = db_with_product().await;
        let id = db
            .vendors()
            .add("Acme", "https://acme.example", "ck_1", "cs_1")
            .await
            .unwrap();

        let vendor = db.vendors().get_by_name("Acme").await.unwrap().unwrap();
        assert_eq!(vendor.id, id);
        assert!(vendor.is_active);
        assert_eq!(vendor.last_sync, None);
    }

    #[tokio::test]
    async fn test_duplicate_vendor_name() {
        let (db, _) = db_with_product().await;
        db.vendors().add("Acme", "", "", "").await.unwrap();

        let err = db.vendors().add("Acme", "", "", "").await.unwrap_err();
        match err {
            DbError::UniqueViolation { value, .. } => assert_eq!(value, "Acme"),
            other => panic!("expected UniqueViolation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_blank_vendor_name_rejected() {
        let (db, _) = db_with_product().await;
        let err = db.vendors().add("  ", "", "", "").await.unwrap_err();
        assert!(matches!(err, DbError::InvalidPayload(_)));
    }

    #[tokio::test]
    async fn test_upsert_stock_one_row_per_pair() {
        let (db, product_id) = db_with_product().await;
        let vendor_id = db.vendors().add("Acme", "", "", "").await.unwrap();

        let first = db
            .vendors()
            .upsert_stock(product_id, vendor_id, 5, Some(Money::from_cents(999)))
            .await
            .unwrap();
        let second = db
            .vendors()
            .upsert_stock(product_id, vendor_id, 8, None)
            .await
            .unwrap();
        assert_eq!(first, second);

        let stocks = db.vendors().stocks_for_product(product_id).await.unwrap();
        assert_eq!(stocks.len(), 1);
        assert_eq!(stocks[0].stock_quantity, 8);
        assert_eq!(stocks[0].price(), None);
    }

    #[tokio::test]
    async fn test_stock_rows_per_vendor() {
        let (db, product_id) = db_with_product().await;
        let a = db.vendors().add("A", "", "", "").await.unwrap();
        let b = db.vendors().add("B", "", "", "").await.unwrap();

        db.vendors().upsert_stock(product_id, a, 1, None).await.unwrap();
        db.vendors().upsert_stock(product_id, b, 2, None).await.unwrap();

        let stocks = db.vendors().stocks_for_product(product_id).await.unwrap();
        assert_eq!(stocks.len(), 2);
        assert_eq!(db.vendors().list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_upsert_stock_unknown_vendor() {
        let (db, product_id) = db_with_product().await;
        let err = db
            .vendors()
            .upsert_stock(product_id, 999, 1, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_upsert_stock_rejects_negative() {
        let (db, product_id) = db_with_product().await;
        let vendor_id = db.vendors().add("Acme", "", "", "").await.unwrap();
        let err = db
            .vendors()
            .upsert_stock(product_id, vendor_id, -1, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::InvalidPayload(_)));
    }
}
