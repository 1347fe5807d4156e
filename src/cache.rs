use moka::future::Cache;
use std::time::Duration;

/// Full-response cache for the home feed, keyed by request path
/// and query string.
///
/// Entries only leave through TTL expiry or an explicit
/// [`clear`](PageCache::clear); writes elsewhere in the system do
/// not invalidate, so the home page may serve content up to one
/// TTL window old.
#[derive(Clone)]
pub struct PageCache {
    inner: Cache<String, String>,
}

impl PageCache {
    /// Keys come straight from request paths, so the cache is
    /// bounded to keep arbitrary `?page=` strings from growing it
    /// without limit inside a TTL window.
    const MAX_ENTRIES: u64 = 1_000;

    #[must_use]
    pub fn new(time_to_live: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(Self::MAX_ENTRIES)
                .time_to_live(time_to_live)
                .build(),
        }
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key).await
    }

    pub async fn insert(&self, key: String, body: String) {
        self.inner.insert(key, body).await;
    }

    /// Drops every cached page at once.
    pub fn clear(&self) {
        self.inner.invalidate_all();
    }
}

impl std::fmt::Debug for PageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageCache")
            .field("entries", &self.inner.entry_count())
            .finish()
    }
}
