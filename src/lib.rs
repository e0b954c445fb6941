//! PIM admin SDK for Rust.
//!
//! Client core of the product-information-management dashboard: typed,
//! cached access to the catalog REST API (categories, products, brands,
//! product images and attributes), plus the category tree, move
//! validation and drag-and-drop reordering logic the dashboard screens
//! are built on.
//!
//! # Quick start
//!
//! ```no_run
//! use pim_admin_sdk::PimSdk;
//!
//! # async fn example() -> pim_admin_sdk::Result<()> {
//! let sdk = PimSdk::builder()
//!     .base_url("https://pim.example.com/api")
//!     .token("secret")
//!     .build()?;
//!
//! // Category hierarchy for a selection control
//! let forest = sdk.categories().build_tree().await?;
//! for level in forest.levels() {
//!     println!("{}", level.label());
//! }
//!
//! // Move a category; cycles are rejected before any request is sent
//! let all = sdk.categories().list_all().await?;
//! sdk.categories().move_to(&all, 3, None).await?;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod connection;
pub mod error;
pub mod models;
pub mod ordering;
pub mod page;
pub mod params;
pub mod queries;
pub mod reparent;
pub mod transport;
pub mod tree;
pub mod validation;

pub use cache::{CacheKey, ListQueryCache, QueryScope};
pub use config::SdkConfig;
pub use connection::Connection;
pub use error::{PimError, Result, ValidationErrors};
pub use page::Page;
pub use transport::{HttpTransport, Transport};
pub use tree::{CategoryForest, TreeWarning};

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

// ---------------------------------------------------------------------------
// PimSdkBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`PimSdk`] instance.
///
/// Use [`PimSdk::builder()`] to obtain a builder, chain configuration
/// methods, and call [`build()`](PimSdkBuilder::build) to create the SDK.
pub struct PimSdkBuilder {
    config: SdkConfig,
    transport: Option<Arc<dyn Transport>>,
    cache: Option<ListQueryCache>,
}

impl Default for PimSdkBuilder {
    fn default() -> Self {
        Self::from_config(SdkConfig::default())
    }
}

impl PimSdkBuilder {
    /// Start from an explicit configuration, e.g. [`SdkConfig::from_env`].
    pub fn from_config(config: SdkConfig) -> Self {
        Self {
            config,
            transport: None,
            cache: None,
        }
    }

    /// Base URL of the catalog API. Defaults to [`config::DEFAULT_BASE_URL`].
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Bearer token sent with every request.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.config.token = Some(token.into());
        self
    }

    /// HTTP request timeout. Defaults to 30 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Page size for list requests that do not set one.
    pub fn page_size(mut self, size: u32) -> Self {
        self.config.page_size = size.max(1);
        self
    }

    /// Use a custom transport instead of the HTTP one. Base URL, token and
    /// timeout are then ignored.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Share an existing query cache instead of creating a new one.
    pub fn cache(mut self, cache: ListQueryCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Build the SDK. No request is made until the first query.
    pub fn build(self) -> Result<PimSdk> {
        let transport: Arc<dyn Transport> = match self.transport {
            Some(t) => t,
            None => Arc::new(HttpTransport::new(
                &self.config.base_url,
                self.config.token.clone(),
                self.config.timeout,
            )?),
        };
        let cache = self.cache.unwrap_or_default();
        let conn = Connection::new(transport, cache, self.config.page_size);
        Ok(PimSdk {
            conn,
            config: self.config,
        })
    }
}

// ---------------------------------------------------------------------------
// PimSdk
// ---------------------------------------------------------------------------

/// The main entry point for the PIM SDK.
///
/// Wraps a [`Connection`] (which owns the transport and the query cache)
/// and exposes resource query interfaces as lightweight borrowing
/// wrappers.
pub struct PimSdk {
    conn: Connection,
    config: SdkConfig,
}

impl PimSdk {
    /// Create a new builder for configuring the SDK.
    pub fn builder() -> PimSdkBuilder {
        PimSdkBuilder::default()
    }

    /// Build an SDK from `PIM_API_*` environment variables.
    pub fn from_env() -> Result<Self> {
        PimSdkBuilder::from_config(SdkConfig::from_env()).build()
    }

    // -- Query accessors ---------------------------------------------------

    /// Access the category query interface.
    pub fn categories(&self) -> queries::CategoryQuery<'_> {
        queries::CategoryQuery::new(&self.conn)
    }

    /// Access the product query interface.
    pub fn products(&self) -> queries::ProductQuery<'_> {
        queries::ProductQuery::new(&self.conn)
    }

    /// Access the brand query interface.
    pub fn brands(&self) -> queries::BrandQuery<'_> {
        queries::BrandQuery::new(&self.conn)
    }

    /// Access the images of one product.
    pub fn images(&self, product_id: i64) -> queries::ImageQuery<'_> {
        queries::ImageQuery::new(&self.conn, product_id)
    }

    /// Access the attributes of one product.
    pub fn attributes(&self, product_id: i64) -> queries::AttributeQuery<'_> {
        queries::AttributeQuery::new(&self.conn, product_id)
    }

    // -- Cache and lifecycle -----------------------------------------------

    /// The query cache shared by every query interface.
    pub fn cache(&self) -> &ListQueryCache {
        &self.conn.cache
    }

    /// Mark every cached list stale; the next read of each refetches.
    pub fn refresh(&self) -> Result<()> {
        self.conn.cache.invalidate_all()
    }

    /// Drop all cached data, e.g. on logout.
    pub fn logout(&self) -> Result<()> {
        self.conn.cache.clear()
    }

    pub fn config(&self) -> &SdkConfig {
        &self.config
    }

    /// Return a reference to the underlying [`Connection`] for advanced usage.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for PimSdk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PimSdk(base_url={}, page_size={}, cached_queries={})",
            self.config.base_url,
            self.config.page_size,
            self.conn.cache.len()
        )
    }
}
