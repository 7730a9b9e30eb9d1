//! Record sink used by the pipeline consumer.

use std::future::Future;

use catalog_core::ProductPayload;
use catalog_db::Database;

use crate::error::SyncResult;

/// Where fetched records land.
///
/// Each call is one independent write; a failure affects only that record.
pub trait ProductStore: Send + Sync + Clone + 'static {
    /// Inserts or updates the product keyed by `payload.id`, returning its
    /// local id.
    fn upsert_product(
        &self,
        payload: &ProductPayload,
    ) -> impl Future<Output = SyncResult<i64>> + Send;
}

impl ProductStore for Database {
    async fn upsert_product(&self, payload: &ProductPayload) -> SyncResult<i64> {
        Ok(self.products().upsert(payload).await?)
    }
}
