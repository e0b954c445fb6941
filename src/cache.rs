//! Process-wide cache for paginated list queries.
//!
//! Entries are keyed by resource family, filter and page index. A read
//! serves a fresh entry directly; otherwise it triggers a fetch. At most
//! one fetch per key is in flight: concurrent readers of the same key
//! await the same shared future. Mutations call [`ListQueryCache::invalidate`]
//! for their family, which marks entries stale so the next read refetches
//! (pull model: nothing is pushed to readers that already rendered).
//!
//! The cache is an explicit object. Clones share the same state, so the
//! application creates one at startup, hands it to every consumer and
//! calls [`ListQueryCache::clear`] on logout.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};
use serde::Serialize;
use serde_json::Value;
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::error::{PimError, Result};
use crate::page::Page;

type FetchOutcome = std::result::Result<Arc<Page<Value>>, Arc<PimError>>;
type SharedFetch = Shared<BoxFuture<'static, FetchOutcome>>;

// ---------------------------------------------------------------------------
// CacheKey
// ---------------------------------------------------------------------------

/// Identity of a cached list page.
///
/// The filter is stored as canonical JSON text with object keys sorted,
/// so two logically identical filters produce equal keys no matter how
/// they were built.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    family: String,
    filter: String,
    page: u32,
}

impl CacheKey {
    /// Build a key from any serializable filter value.
    pub fn new<F: Serialize + ?Sized>(family: &str, filter: &F, page: u32) -> Result<Self> {
        let value = serde_json::to_value(filter)?;
        Ok(Self::from_value(family, &value, page))
    }

    pub fn from_value(family: &str, filter: &Value, page: u32) -> Self {
        let mut canonical = String::new();
        write_canonical(filter, &mut canonical);
        Self {
            family: family.to_string(),
            filter: canonical,
            page,
        }
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn page(&self) -> u32 {
        self.page
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}#{}", self.family, self.filter, self.page)
    }
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, k) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(k.clone()).to_string());
                out.push(':');
                write_canonical(&map[k], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, v) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(v, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

// ---------------------------------------------------------------------------
// QueryScope
// ---------------------------------------------------------------------------

/// Lifetime of a query consumer (a screen, a widget).
///
/// When every reader waiting on a fetch has been torn down, the fetch
/// result is dropped on arrival instead of being written to the cache.
/// The network request itself is not aborted.
#[derive(Debug, Clone, Default)]
pub struct QueryScope {
    token: CancellationToken,
}

impl QueryScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the consumer as gone.
    pub fn teardown(&self) {
        self.token.cancel();
    }

    pub fn is_torn_down(&self) -> bool {
        self.token.is_cancelled()
    }

    /// A guard that tears the scope down when dropped.
    pub fn guard(&self) -> DropGuard {
        self.token.clone().drop_guard()
    }
}

// ---------------------------------------------------------------------------
// ListQueryCache
// ---------------------------------------------------------------------------

struct InFlight {
    id: u64,
    generation: u64,
    future: SharedFetch,
    /// `None` is an unscoped reader, which never tears down.
    waiters: Vec<Option<CancellationToken>>,
}

impl InFlight {
    fn has_live_waiter(&self) -> bool {
        self.waiters
            .iter()
            .any(|w| w.as_ref().map_or(true, |t| !t.is_cancelled()))
    }
}

#[derive(Default)]
struct CacheEntry {
    page: Option<Arc<Page<Value>>>,
    fresh: bool,
    in_flight: Option<InFlight>,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<CacheKey, CacheEntry>,
    generations: HashMap<String, u64>,
    next_fetch_id: u64,
    fetches_started: u64,
}

impl CacheState {
    fn generation(&self, family: &str) -> u64 {
        self.generations.get(family).copied().unwrap_or(0)
    }
}

enum Plan {
    Hit(Arc<Page<Value>>),
    Await(SharedFetch),
}

/// Shared cache of list pages. Cloning yields another handle to the
/// same cache.
#[derive(Clone, Default)]
pub struct ListQueryCache {
    state: Arc<Mutex<CacheState>>,
}

impl ListQueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries are only ever swapped whole, so a poisoned lock still
    /// guards consistent state and is recovered.
    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return the page for `key`, fetching it with `fetch` when the entry
    /// is missing or stale.
    ///
    /// If a fetch for the same key is already running (and was started
    /// after the last invalidation of the family), this call awaits it
    /// instead of calling `fetch`. The result is stored only if the family
    /// was not invalidated meanwhile and at least one waiting reader's
    /// `scope` is still alive; it is returned to the readers either way.
    pub async fn get<F, Fut>(
        &self,
        key: CacheKey,
        scope: Option<&QueryScope>,
        fetch: F,
    ) -> Result<Arc<Page<Value>>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Page<Value>>> + Send + 'static,
    {
        let waiter = scope.map(|s| s.token.clone());

        let plan = {
            let mut state = self.lock();
            let generation = state.generation(&key.family);
            let existing = state.entries.get_mut(&key).and_then(|entry| {
                if entry.fresh {
                    if let Some(page) = &entry.page {
                        return Some(Plan::Hit(Arc::clone(page)));
                    }
                }
                entry
                    .in_flight
                    .as_mut()
                    .filter(|f| f.generation == generation)
                    .map(|f| {
                        f.waiters.push(waiter.clone());
                        Plan::Await(f.future.clone())
                    })
            });

            match existing {
                Some(plan) => plan,
                None => {
                    let id = state.next_fetch_id;
                    state.next_fetch_id += 1;
                    state.fetches_started += 1;
                    tracing::debug!(key = %key, "query cache miss; fetching");

                    let cache = self.clone();
                    let fetch_key = key.clone();
                    let request = fetch();
                    let future = async move {
                        let outcome = request.await;
                        cache.complete(&fetch_key, id, generation, outcome)
                    }
                    .boxed()
                    .shared();

                    let entry = state.entries.entry(key.clone()).or_default();
                    entry.in_flight = Some(InFlight {
                        id,
                        generation,
                        future: future.clone(),
                        waiters: vec![waiter],
                    });
                    Plan::Await(future)
                }
            }
        };

        match plan {
            Plan::Hit(page) => {
                tracing::debug!(key = %key, "query cache hit");
                Ok(page)
            }
            Plan::Await(future) => future.await.map_err(PimError::from_shared),
        }
    }

    /// Record a finished fetch and hand its outcome to every waiter.
    fn complete(
        &self,
        key: &CacheKey,
        id: u64,
        generation: u64,
        outcome: Result<Page<Value>>,
    ) -> FetchOutcome {
        let outcome: FetchOutcome = outcome.map(Arc::new).map_err(Arc::new);

        let mut state = self.lock();
        let current = state.generation(&key.family);
        let Some(entry) = state.entries.get_mut(key) else {
            tracing::debug!(key = %key, "query cache cleared during fetch; result not stored");
            return outcome;
        };

        let ours = entry.in_flight.as_ref().is_some_and(|f| f.id == id);
        let live = entry
            .in_flight
            .as_ref()
            .is_some_and(InFlight::has_live_waiter);
        if ours {
            entry.in_flight = None;
        }

        match &outcome {
            Ok(page) if ours && live && generation == current => {
                entry.page = Some(Arc::clone(page));
                entry.fresh = true;
                tracing::debug!(key = %key, items = page.items.len(), "query cache stored page");
            }
            Ok(_) if ours && !live => {
                tracing::debug!(key = %key, "all readers torn down; fetch result discarded");
            }
            Ok(_) => {
                tracing::debug!(key = %key, "invalidated during fetch; result not stored");
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "query fetch failed");
            }
        }
        outcome
    }

    /// Mark every entry of `family` stale and detach its in-flight
    /// fetches, so the next read of any key in the family refetches.
    /// Returns the number of entries touched.
    pub fn invalidate(&self, family: &str) -> Result<usize> {
        let mut state = self.lock();
        *state.generations.entry(family.to_string()).or_insert(0) += 1;
        let mut touched = 0;
        for (key, entry) in state.entries.iter_mut() {
            if key.family == family {
                entry.fresh = false;
                entry.in_flight = None;
                touched += 1;
            }
        }
        tracing::info!(family, entries = touched, "query cache invalidated");
        Ok(touched)
    }

    /// Invalidate every family.
    pub fn invalidate_all(&self) -> Result<()> {
        let mut state = self.lock();
        let families: Vec<String> = state.entries.keys().map(|k| k.family.clone()).collect();
        for family in families {
            *state.generations.entry(family).or_insert(0) += 1;
        }
        for entry in state.entries.values_mut() {
            entry.fresh = false;
            entry.in_flight = None;
        }
        tracing::info!("query cache invalidated (all families)");
        Ok(())
    }

    /// Drop every entry, e.g. on logout.
    pub fn clear(&self) -> Result<()> {
        let mut state = self.lock();
        state.entries.clear();
        for generation in state.generations.values_mut() {
            *generation += 1;
        }
        tracing::info!("query cache cleared");
        Ok(())
    }

    // -- Introspection -----------------------------------------------------

    /// The last stored page for `key`, fresh or stale.
    pub fn peek(&self, key: &CacheKey) -> Option<Arc<Page<Value>>> {
        let state = self.lock();
        state.entries.get(key).and_then(|e| e.page.clone())
    }

    pub fn is_fresh(&self, key: &CacheKey) -> bool {
        self.lock()
            .entries
            .get(key)
            .is_some_and(|e| e.fresh && e.page.is_some())
    }

    pub fn is_in_flight(&self, key: &CacheKey) -> bool {
        self.lock()
            .entries
            .get(key)
            .is_some_and(|e| e.in_flight.is_some())
    }

    /// Number of keys the cache knows about.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of fetches started since the cache was created.
    pub fn fetch_count(&self) -> u64 {
        self.lock().fetches_started
    }
}

impl fmt::Debug for ListQueryCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListQueryCache")
            .field("entries", &self.len())
            .field("fetches", &self.fetch_count())
            .finish()
    }
}
