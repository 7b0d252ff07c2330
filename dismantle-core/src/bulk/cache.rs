//! Caller-owned cache of translated edge lists.
//!
//! Repeated bulk runs on the same graph (one per threshold, say) reuse the
//! translation instead of rebuilding it. Entries are keyed by
//! [`GraphIdentity`] and evicted least-recently-used first or on request.

use std::{
    num::NonZeroUsize,
    sync::{Arc, Mutex, MutexGuard},
};

use lru::LruCache;
use tracing::debug;

use super::EdgeListGraph;
use crate::{
    error::BulkEngineError,
    graph::{Graph, GraphIdentity},
};

/// Source of translated edge lists for the bulk adapter.
pub trait TranslationStore {
    /// Returns the translation of `graph`, building it on a miss.
    ///
    /// # Errors
    /// Returns [`BulkEngineError::CachePoisoned`] when a shared cache lock is
    /// poisoned.
    fn checkout(&mut self, graph: &Graph) -> Result<Arc<EdgeListGraph>, BulkEngineError>;
}

/// Single-owner LRU cache of translated graphs.
///
/// # Examples
/// ```
/// use dismantle_core::{Graph, TranslationCache};
///
/// let graph = Graph::from_edges("pair", [(1_u64, 2_u64)]);
/// let mut cache = TranslationCache::default();
/// let first = cache.get_or_translate(&graph);
/// let second = cache.get_or_translate(&graph);
/// assert!(std::sync::Arc::ptr_eq(&first, &second));
/// assert!(cache.evict(graph.identity()));
/// assert!(cache.is_empty());
/// ```
#[derive(Debug)]
pub struct TranslationCache {
    entries: LruCache<GraphIdentity, Arc<EdgeListGraph>>,
}

impl TranslationCache {
    /// Default number of translations retained before eviction.
    pub const DEFAULT_CAPACITY: NonZeroUsize = NonZeroUsize::MIN.saturating_add(15);

    /// Creates a cache holding at most `capacity` translations.
    #[must_use]
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: LruCache::new(capacity),
        }
    }

    /// Returns the cached translation of `graph`, translating on a miss.
    pub fn get_or_translate(&mut self, graph: &Graph) -> Arc<EdgeListGraph> {
        if let Some(hit) = self.entries.get(graph.identity()) {
            debug!(graph = %graph.identity(), "translation cache hit");
            return Arc::clone(hit);
        }
        debug!(graph = %graph.identity(), "translation cache miss");
        let translated = Arc::new(EdgeListGraph::from_graph(graph));
        if let Some((evicted, _)) = self
            .entries
            .push(graph.identity().clone(), Arc::clone(&translated))
            .filter(|(key, _)| key != graph.identity())
        {
            debug!(graph = %evicted, "translation evicted");
        }
        translated
    }

    /// Drops the translation of `identity`, returning whether one was cached.
    pub fn evict(&mut self, identity: &GraphIdentity) -> bool {
        self.entries.pop(identity).is_some()
    }

    /// Returns `true` when `identity` has a cached translation.
    #[must_use]
    pub fn contains(&self, identity: &GraphIdentity) -> bool {
        self.entries.contains(identity)
    }

    /// Drops every translation.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of cached translations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for TranslationCache {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

impl TranslationStore for TranslationCache {
    fn checkout(&mut self, graph: &Graph) -> Result<Arc<EdgeListGraph>, BulkEngineError> {
        Ok(self.get_or_translate(graph))
    }
}

impl<T: TranslationStore + ?Sized> TranslationStore for &mut T {
    fn checkout(&mut self, graph: &Graph) -> Result<Arc<EdgeListGraph>, BulkEngineError> {
        (**self).checkout(graph)
    }
}

/// [`TranslationCache`] behind a mutex, for workers sharing one cache.
///
/// # Examples
/// ```
/// use dismantle_core::{Graph, SharedTranslationCache};
///
/// let cache = SharedTranslationCache::default();
/// let graph = Graph::from_edges("pair", [(1_u64, 2_u64)]);
/// std::thread::scope(|scope| {
///     for _ in 0..2 {
///         scope.spawn(|| cache.get_or_translate(&graph).expect("lock is healthy"));
///     }
/// });
/// assert_eq!(cache.len().expect("lock is healthy"), 1);
/// ```
#[derive(Debug, Default)]
pub struct SharedTranslationCache {
    inner: Mutex<TranslationCache>,
}

impl SharedTranslationCache {
    /// Creates a shared cache holding at most `capacity` translations.
    #[must_use]
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            inner: Mutex::new(TranslationCache::new(capacity)),
        }
    }

    /// See [`TranslationCache::get_or_translate`].
    ///
    /// # Errors
    /// Returns [`BulkEngineError::CachePoisoned`] when the lock is poisoned.
    pub fn get_or_translate(&self, graph: &Graph) -> Result<Arc<EdgeListGraph>, BulkEngineError> {
        Ok(self.lock()?.get_or_translate(graph))
    }

    /// See [`TranslationCache::evict`].
    ///
    /// # Errors
    /// Returns [`BulkEngineError::CachePoisoned`] when the lock is poisoned.
    pub fn evict(&self, identity: &GraphIdentity) -> Result<bool, BulkEngineError> {
        Ok(self.lock()?.evict(identity))
    }

    /// See [`TranslationCache::len`].
    ///
    /// # Errors
    /// Returns [`BulkEngineError::CachePoisoned`] when the lock is poisoned.
    pub fn len(&self) -> Result<usize, BulkEngineError> {
        Ok(self.lock()?.len())
    }

    fn lock(&self) -> Result<MutexGuard<'_, TranslationCache>, BulkEngineError> {
        self.inner
            .lock()
            .map_err(|_| BulkEngineError::CachePoisoned)
    }
}

impl TranslationStore for &SharedTranslationCache {
    fn checkout(&mut self, graph: &Graph) -> Result<Arc<EdgeListGraph>, BulkEngineError> {
        self.get_or_translate(graph)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn graph(name: &str) -> Graph {
        Graph::from_edges(name, [(1_u64, 2_u64), (2, 3)])
    }

    #[rstest]
    fn least_recently_used_entry_is_evicted() {
        let mut cache = TranslationCache::new(NonZeroUsize::new(2).expect("non-zero"));
        let (a, b, c) = (graph("a"), graph("b"), graph("c"));
        cache.get_or_translate(&a);
        cache.get_or_translate(&b);
        cache.get_or_translate(&a);
        cache.get_or_translate(&c);
        assert!(cache.contains(a.identity()));
        assert!(!cache.contains(b.identity()));
        assert_eq!(cache.len(), 2);
    }

    #[rstest]
    fn clear_empties_the_cache() {
        let mut cache = TranslationCache::default();
        cache.get_or_translate(&graph("a"));
        cache.clear();
        assert!(cache.is_empty());
    }

    #[rstest]
    fn poisoned_lock_is_reported() {
        let cache = SharedTranslationCache::default();
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = cache.inner.lock().expect("lock is healthy");
            panic!("poison the lock");
        }));
        let err = cache
            .get_or_translate(&graph("a"))
            .expect_err("poisoned lock must be reported");
        assert_eq!(err, BulkEngineError::CachePoisoned);
    }
}
