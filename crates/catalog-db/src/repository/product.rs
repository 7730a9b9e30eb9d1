//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - Idempotent upsert keyed on the remote identifier
//! - Substring search over name and SKU with offset paging
//! - Single-field edits
//!
//! ## Upsert
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    How Upsert Works                                     │
//! │                                                                         │
//! │  ProductPayload { id: 42, regular_price: "12.50", ... }                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  normalize_payload ──── invalid? ──► DbError::InvalidPayload           │
//! │       │                              (nothing written)                  │
//! │       ▼                                                                 │
//! │  BEGIN                                                                  │
//! │  INSERT ... ON CONFLICT(remote_id) DO UPDATE SET <all fields>          │
//! │  RETURNING id                                                           │
//! │  COMMIT ──── error? ──► ROLLBACK, error returned                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  local id (same id on every re-sync of remote 42)                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The single `ON CONFLICT` statement makes two concurrent upserts of the
//! same remote record race last-write-wins instead of one of them hitting
//! the unique index.

use chrono::Local;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use catalog_core::validation::normalize_payload;
use catalog_core::{FieldValue, Product, ProductField, ProductPayload, ValidationError};

const PRODUCT_COLUMNS: &str = "id, remote_id, name, sku, regular_price_cents, sale_price_cents, \
                               stock_quantity, categories, last_synced";

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// let local_id = repo.upsert(&payload).await?;
/// let page = repo.search("mug", 50, 0).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts or updates the product identified by `payload.id`.
    ///
    /// ## Behavior
    /// - Unseen remote id: a new row is created
    /// - Known remote id: every mutable field is overwritten in place,
    ///   `None` included, and the local id is preserved
    /// - `last_synced` is set to the current local time
    ///
    /// ## Returns
    /// * `Ok(i64)` - Local row id
    /// * `Err(DbError::InvalidPayload)` - Payload failed normalization
    /// * `Err(DbError)` - Storage error, transaction rolled back
    pub async fn upsert(&self, payload: &ProductPayload) -> DbResult<i64> {
        let changes = normalize_payload(payload)?;
        let now = Local::now().naive_local();

        debug!(remote_id = changes.remote_id, "Upserting product");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO products (
                remote_id, name, sku, regular_price_cents, sale_price_cents,
                stock_quantity, categories, last_synced
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(remote_id) DO UPDATE SET
                name = excluded.name,
                sku = excluded.sku,
                regular_price_cents = excluded.regular_price_cents,
                sale_price_cents = excluded.sale_price_cents,
                stock_quantity = excluded.stock_quantity,
                categories = excluded.categories,
                last_synced = excluded.last_synced
            RETURNING id
            "#,
        )
        .bind(changes.remote_id)
        .bind(&changes.name)
        .bind(&changes.sku)
        .bind(changes.regular_price.map(|m| m.cents()))
        .bind(changes.sale_price.map(|m| m.cents()))
        .bind(changes.stock_quantity)
        .bind(&changes.categories)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        // Dropping `tx` on the error path above rolls back
        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(id)
    }

    /// Gets a product by local id.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Gets a product by remote identifier.
    pub async fn get_by_remote_id(&self, remote_id: i64) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE remote_id = ?1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(remote_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Searches products whose name or SKU contains `term`, ignoring case.
    ///
    /// ## How It Works
    /// 1. `%` and `_` in the term are escaped, so they match literally
    /// 2. An empty term matches every row
    /// 3. Rows come back in insertion order (local id), which keeps paging
    ///    stable while a sync is adding rows at the end
    ///
    /// ## Arguments
    /// * `term` - Search text (trimmed)
    /// * `limit` - Maximum rows to return
    /// * `offset` - Rows to skip
    pub async fn search(&self, term: &str, limit: i64, offset: i64) -> DbResult<Vec<Product>> {
        let pattern = like_pattern(term);

        debug!(term = %term.trim(), limit, offset, "Searching products");

        let sql = format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            WHERE name LIKE ?1 ESCAPE '\'
               OR coalesce(sku, '') LIKE ?1 ESCAPE '\'
            ORDER BY id
            LIMIT ?2 OFFSET ?3
            "#
        );

        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(&pattern)
            .bind(limit.max(0))
            .bind(offset.max(0))
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Search returned products");
        Ok(products)
    }

    /// Counts all products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Counts products matching `term` under the same rules as [`search`](Self::search).
    pub async fn count_matching(&self, term: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM products
            WHERE name LIKE ?1 ESCAPE '\'
               OR coalesce(sku, '') LIKE ?1 ESCAPE '\'
            "#,
        )
        .bind(like_pattern(term))
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Sets one editable field of the product with the given remote id.
    ///
    /// Also refreshes `last_synced`.
    ///
    /// ## Returns
    /// * `Ok(true)` - Row updated
    /// * `Ok(false)` - No product with that remote id
    /// * `Err(DbError::InvalidPayload)` - Value kind does not match the field
    pub async fn update_field(
        &self,
        remote_id: i64,
        field: ProductField,
        value: FieldValue,
    ) -> DbResult<bool> {
        check_value_matches(field, value)?;

        debug!(remote_id, field = %field, "Updating product field");

        let sql = format!(
            "UPDATE products SET {} = ?1, last_synced = ?2 WHERE remote_id = ?3",
            field.column()
        );

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let result = sqlx::query(&sql)
            .bind(value.as_column_value())
            .bind(Local::now().naive_local())
            .bind(remote_id)
            .execute(&mut *tx)
            .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    /// Refreshes `last_synced` after a successful push.
    ///
    /// ## Returns
    /// `false` if no product has that remote id.
    pub async fn mark_synced(&self, remote_id: i64) -> DbResult<bool> {
        let result = sqlx::query("UPDATE products SET last_synced = ?1 WHERE remote_id = ?2")
            .bind(Local::now().naive_local())
            .bind(remote_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Builds a `LIKE` pattern matching `term` anywhere, with wildcards in the
/// term escaped by `\`.
///
/// SQLite's `LIKE` folds ASCII case only, so the term is folded the same
/// way. Non-ASCII letters match exactly as typed.
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.trim().to_ascii_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn check_value_matches(field: ProductField, value: FieldValue) -> Result<(), ValidationError> {
    let ok = matches!(
        (field, value),
        (ProductField::RegularPrice, FieldValue::Price(_))
            | (ProductField::SalePrice, FieldValue::Price(_))
            | (ProductField::StockQuantity, FieldValue::Stock(_))
    );

    if ok {
        Ok(())
    } else {
        Err(ValidationError::InvalidFormat {
            field: field.as_str().to_string(),
            reason: "value kind does not match field".to_string(),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
