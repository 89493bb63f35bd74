//! Memoisation of compiled patterns.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, PoisonError};

use lru::LruCache;
use trawl_core::MatchOptions;

use crate::compiler::CompiledPattern;
use crate::error::MatchError;

const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(64) {
    Some(capacity) => capacity,
    None => NonZeroUsize::MIN,
};

/// Least-recently-used cache of compiled patterns keyed by their options.
#[derive(Debug)]
pub struct PatternCache {
    entries: Mutex<LruCache<MatchOptions, Arc<CompiledPattern>>>,
}

impl Default for PatternCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl PatternCache {
    /// Creates a cache holding at most `capacity` patterns.
    #[must_use]
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Returns the cached pattern for `options`, compiling it on a miss.
    ///
    /// Failed compilations are not cached.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `compile`.
    pub fn get_or_compile(
        &self,
        options: &MatchOptions,
        compile: impl FnOnce() -> Result<Arc<CompiledPattern>, MatchError>,
    ) -> Result<Arc<CompiledPattern>, MatchError> {
        if let Some(hit) = self.lock().get(options) {
            return Ok(Arc::clone(hit));
        }
        let compiled = compile()?;
        self.lock().put(options.clone(), Arc::clone(&compiled));
        Ok(compiled)
    }

    /// Returns the number of cached patterns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LruCache<MatchOptions, Arc<CompiledPattern>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
