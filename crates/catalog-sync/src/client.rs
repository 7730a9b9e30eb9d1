//! # Remote Catalog Client
//!
//! Access to the store's product REST API.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Remote Endpoints                                │
//! │                                                                         │
//! │  GET {base}/wp-json/wc/v3/products?per_page=1&page=1                   │
//! │      → X-WP-Total header                  (total_count, ping)          │
//! │                                                                         │
//! │  GET {base}/wp-json/wc/v3/products?per_page=N&page=P                   │
//! │      → [ {id, name, sku, regular_price, ...}, ... ]   (fetch_page)     │
//! │                                                                         │
//! │  GET {base}/wp-json/wc/v3/products/{id}   (fetch_product)              │
//! │  PUT {base}/wp-json/wc/v3/products/{id}   (push_product)               │
//! │      body: {regular_price, sale_price, stock_quantity}                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every call authenticates with HTTP basic auth using the consumer key and
//! secret handed to [`WooClient::new`].

use std::future::Future;
use std::time::Duration;

use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;

use crate::config::StoreSettings;
use crate::error::{SyncError, SyncResult};
use catalog_core::{Product, ProductPayload};

/// Response header carrying the total number of products.
pub const TOTAL_HEADER: &str = "X-WP-Total";

const API_PATH: &str = "wp-json/wc/v3/products";

// =============================================================================
// Remote Catalog Trait
// =============================================================================

/// Paginated read and single-record write access to a remote catalog.
///
/// The pipeline and service are generic over this so they can run against
/// an in-process fake.
pub trait RemoteCatalog: Send + Sync + Clone + 'static {
    /// Total number of products the remote reports.
    fn total_count(&self) -> impl Future<Output = SyncResult<u64>> + Send;

    /// One page of products, 1-based. An empty page means no more data.
    fn fetch_page(
        &self,
        page: u32,
        per_page: u32,
    ) -> impl Future<Output = SyncResult<Vec<ProductPayload>>> + Send;

    /// A single product by remote id.
    fn fetch_product(&self, remote_id: i64)
        -> impl Future<Output = SyncResult<ProductPayload>> + Send;

    /// Sends a partial update for one product.
    ///
    /// A non-2xx answer is a normal outcome with `success = false`; only
    /// transport failures are `Err`.
    fn push_product(
        &self,
        remote_id: i64,
        fields: &PushFields,
    ) -> impl Future<Output = SyncResult<PushOutcome>> + Send;

    /// Cheap authenticated request to verify connectivity and credentials.
    fn ping(&self) -> impl Future<Output = SyncResult<()>> + Send;
}

// =============================================================================
// Push Types
// =============================================================================

/// Fields sent when pushing a local edit back to the store.
///
/// Prices go over the wire as decimal strings, with an empty string for
/// "no price"; stock as an integer or null.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushFields {
    pub regular_price: String,
    pub sale_price: String,
    pub stock_quantity: Option<i64>,
}

impl From<&Product> for PushFields {
    fn from(product: &Product) -> Self {
        PushFields {
            regular_price: product
                .regular_price()
                .map(|m| m.to_string())
                .unwrap_or_default(),
            sale_price: product
                .sale_price()
                .map(|m| m.to_string())
                .unwrap_or_default(),
            stock_quantity: product.stock_quantity,
        }
    }
}

/// Result of a push: whether the remote accepted it, and its HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PushOutcome {
    pub success: bool,
    pub status: u16,
}

// =============================================================================
// WooCommerce Client
// =============================================================================

/// REST client for a WooCommerce store.
#[derive(Clone)]
pub struct WooClient {
    http: reqwest::Client,
    products_url: Url,
    key: String,
    secret: String,
}

impl std::fmt::Debug for WooClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WooClient")
            .field("products_url", &self.products_url.as_str())
            .finish_non_exhaustive()
    }
}

impl WooClient {
    /// Creates a client for the shop at `base_url`.
    ///
    /// ## Arguments
    /// * `base_url` - Shop root, e.g. `https://shop.example` or
    ///   `https://example.com/shop`
    /// * `key`, `secret` - REST API consumer credentials
    /// * `timeout` - Per-request timeout
    pub fn new(
        base_url: &Url,
        key: impl Into<String>,
        secret: impl Into<String>,
        timeout: Duration,
    ) -> SyncResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("catalog-sync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SyncError::InvalidConfig(e.to_string()))?;

        let products_url = products_url(base_url)?;
        info!(url = %products_url, "Remote catalog client created");

        Ok(WooClient {
            http,
            products_url,
            key: key.into(),
            secret: secret.into(),
        })
    }

    /// Creates a client from loaded store settings.
    pub fn from_settings(store: &StoreSettings, timeout: Duration) -> SyncResult<Self> {
        let base = store.require_credentials()?;
        Self::new(&base, store.key.trim(), store.secret.trim(), timeout)
    }

    /// The collection endpoint this client talks to.
    pub fn products_url(&self) -> &Url {
        &self.products_url
    }

    fn product_url(&self, remote_id: i64) -> SyncResult<Url> {
        product_url(&self.products_url, remote_id)
    }

    async fn get_listing(&self, page: u32, per_page: u32) -> SyncResult<reqwest::Response> {
        let response = self
            .http
            .get(self.products_url.clone())
            .basic_auth(&self.key, Some(&self.secret))
            .query(&[("per_page", per_page), ("page", page)])
            .send()
            .await?
            .error_for_status()?;
        Ok(response)
    }
}

impl RemoteCatalog for WooClient {
    async fn total_count(&self) -> SyncResult<u64> {
        let response = self.get_listing(1, 1).await?;
        let total = parse_total_header(response.headers()).unwrap_or_else(|| {
            warn!("Remote did not send {}, assuming 0 products", TOTAL_HEADER);
            0
        });
        debug!(total, "Remote product count");
        Ok(total)
    }

    async fn fetch_page(&self, page: u32, per_page: u32) -> SyncResult<Vec<ProductPayload>> {
        debug!(page, per_page, "Fetching page");
        let records = self
            .get_listing(page, per_page)
            .await?
            .json::<Vec<ProductPayload>>()
            .await?;
        debug!(page, count = records.len(), "Page fetched");
        Ok(records)
    }

    async fn fetch_product(&self, remote_id: i64) -> SyncResult<ProductPayload> {
        let url = self.product_url(remote_id)?;
        let payload = self
            .http
            .get(url)
            .basic_auth(&self.key, Some(&self.secret))
            .send()
            .await?
            .error_for_status()?
            .json::<ProductPayload>()
            .await?;
        Ok(payload)
    }

    async fn push_product(&self, remote_id: i64, fields: &PushFields) -> SyncResult<PushOutcome> {
        let url = self.product_url(remote_id)?;
        let response = self
            .http
            .put(url)
            .basic_auth(&self.key, Some(&self.secret))
            .json(fields)
            .send()
            .await?;

        let status = response.status();
        let outcome = PushOutcome {
            success: status.is_success(),
            status: status.as_u16(),
        };

        if outcome.success {
            info!(remote_id, status = outcome.status, "Product pushed");
        } else {
            let body = response.text().await.unwrap_or_default();
            warn!(remote_id, status = outcome.status, body = %body, "Push rejected by remote");
        }
        Ok(outcome)
    }

    async fn ping(&self) -> SyncResult<()> {
        self.get_listing(1, 1).await?;
        Ok(())
    }
}

// =============================================================================
// Disconnected Remote
// =============================================================================

/// Stand-in remote for local-only use. Every call fails with
/// [`SyncError::MissingCredential`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Disconnected;

impl Disconnected {
    fn error() -> SyncError {
        SyncError::MissingCredential("store URL (WOO_API_URL)")
    }
}

impl RemoteCatalog for Disconnected {
    async fn total_count(&self) -> SyncResult<u64> {
        Err(Self::error())
    }

    async fn fetch_page(&self, _page: u32, _per_page: u32) -> SyncResult<Vec<ProductPayload>> {
        Err(Self::error())
    }

    async fn fetch_product(&self, _remote_id: i64) -> SyncResult<ProductPayload> {
        Err(Self::error())
    }

    async fn push_product(&self, _remote_id: i64, _fields: &PushFields) -> SyncResult<PushOutcome> {
        Err(Self::error())
    }

    async fn ping(&self) -> SyncResult<()> {
        Err(Self::error())
    }
}

// =============================================================================
// URL and Header Helpers
// =============================================================================

/// `{base}/wp-json/wc/v3/products`, keeping any sub-path in `base`.
fn products_url(base: &Url) -> SyncResult<Url> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.set_query(None);
    Ok(base.join(API_PATH)?)
}

fn product_url(products_url: &Url, remote_id: i64) -> SyncResult<Url> {
    let mut url = products_url.clone();
    url.path_segments_mut()
        .map_err(|_| SyncError::InvalidUrl(products_url.to_string()))?
        .push(&remote_id.to_string());
    Ok(url)
}

fn parse_total_header(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(TOTAL_HEADER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}
