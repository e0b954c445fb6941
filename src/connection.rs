//! Transport and cache wiring shared by every query interface.
//!
//! Reads of list endpoints go through the [`ListQueryCache`]; detail reads
//! go straight to the transport. Mutations go straight to the transport
//! and, once the server has confirmed them, invalidate the affected
//! resource families before returning. A list read issued after a
//! mutation completes therefore always refetches.

use std::sync::Arc;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::cache::{CacheKey, ListQueryCache, QueryScope};
use crate::error::Result;
use crate::page::Page;
use crate::params::ParamsBuilder;
use crate::transport::{Params, Transport};

/// Wraps the [`Transport`] and the [`ListQueryCache`].
pub struct Connection {
    transport: Arc<dyn Transport>,
    /// The list cache; clones share state with this one.
    pub cache: ListQueryCache,
    page_size: u32,
}

impl Connection {
    pub fn new(transport: Arc<dyn Transport>, cache: ListQueryCache, page_size: u32) -> Self {
        Self {
            transport,
            cache,
            page_size,
        }
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Page size used when a list request does not set one.
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Cached read of a list endpoint, normalized to a [`Page`].
    ///
    /// The cache key is the family, the endpoint path plus every filter
    /// except the page index, and the page index.
    pub async fn list(
        &self,
        family: &str,
        path: &str,
        params: &ParamsBuilder,
        scope: Option<&QueryScope>,
    ) -> Result<Arc<Page<Value>>> {
        let filter = json!({ "path": path, "params": params.filter_value() });
        let key = CacheKey::from_value(family, &filter, params.page_index());

        let transport = Arc::clone(&self.transport);
        let path = path.to_string();
        let query = params.build();
        self.cache
            .get(key, scope, move || async move {
                let body = transport.get(&path, &query).await?;
                Page::from_envelope(body)
            })
            .await
    }

    /// [`list`](Self::list), with every item deserialized into `T`.
    pub async fn list_into<T: DeserializeOwned>(
        &self,
        family: &str,
        path: &str,
        params: &ParamsBuilder,
        scope: Option<&QueryScope>,
    ) -> Result<Page<T>> {
        self.list(family, path, params, scope).await?.decode()
    }

    /// Cached read of an unpaginated endpoint, returned as a plain list.
    pub async fn list_all_into<T: DeserializeOwned>(
        &self,
        family: &str,
        path: &str,
        scope: Option<&QueryScope>,
    ) -> Result<Vec<T>> {
        let page = self
            .list_into::<T>(family, path, &ParamsBuilder::new(), scope)
            .await?;
        Ok(page.items)
    }

    /// Uncached GET, deserialized into `T`.
    pub async fn fetch_into<T: DeserializeOwned>(&self, path: &str, params: &Params) -> Result<T> {
        let body = self.transport.get(path, params).await?;
        Ok(serde_json::from_value(body)?)
    }

    /// Uncached GET where a 404 means "no such record".
    pub async fn fetch_optional<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        match self.transport.get(path, &[]).await {
            Ok(Value::Null) => Ok(None),
            Ok(body) => Ok(Some(serde_json::from_value(body)?)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Send a mutation, then invalidate `families` before returning.
    ///
    /// Nothing is invalidated when the request fails.
    pub async fn mutate(
        &self,
        method: Method,
        path: &str,
        params: &Params,
        body: Option<Value>,
        families: &[&str],
    ) -> Result<Value> {
        let response = self
            .transport
            .request(method.clone(), path, params, body)
            .await?;
        tracing::info!(%method, path, "mutation applied");
        for family in families {
            self.cache.invalidate(family)?;
        }
        Ok(response)
    }

    /// [`mutate`](Self::mutate), with the response deserialized into `T`.
    pub async fn mutate_into<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Value,
        families: &[&str],
    ) -> Result<T> {
        let response = self.mutate(method, path, &[], Some(body), families).await?;
        Ok(serde_json::from_value(response)?)
    }
}
