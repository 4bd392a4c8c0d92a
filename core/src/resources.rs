//! Path-keyed resource sharing with explicit use counts.
//!
//! Components never load assets themselves; they ask the cache. The first
//! [`load_with`](ResourceCache::load_with) for a path runs the supplied
//! loader and caches the result; later loads hand out the cached value and
//! bump the use count. [`release`](ResourceCache::release) drops a use;
//! the entry is evicted when the count reaches zero. `Arc`s already handed
//! out stay valid past eviction.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::source::SourceError;

/// Errors produced while loading or fetching cached resources.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// The path is cached, but under a different concrete type.
    #[error("resource `{path}` is already cached with a different type")]
    TypeMismatch { path: String },
    /// The path is not cached and the call site cannot load it.
    #[error("resource `{path}` is not loaded")]
    NotLoaded { path: String },
    /// The loader failed to read the underlying bytes.
    #[error(transparent)]
    Source(#[from] SourceError),
    /// The loader failed to construct the resource.
    #[error("failed to load `{path}`: {reason}")]
    Load { path: String, reason: String },
}

struct CacheEntry {
    value: Arc<dyn Any + Send + Sync>,
    uses: usize,
}

/// Path-keyed cache of shared resources.
///
/// Values are stored type-erased; `load_with`/`peek` downcast back to the
/// requested concrete type and fail with [`ResourceError::TypeMismatch`]
/// when two call sites disagree about what lives at a path.
#[derive(Default)]
pub struct ResourceCache {
    entries: HashMap<String, CacheEntry>,
}

impl ResourceCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached resource at `path`, loading it with `loader` on
    /// a miss. Every successful call counts as one use.
    pub fn load_with<T, F>(&mut self, path: &str, loader: F) -> Result<Arc<T>, ResourceError>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Result<T, ResourceError>,
    {
        if let Some(entry) = self.entries.get_mut(path) {
            let value = entry.value.clone().downcast::<T>().map_err(|_| {
                ResourceError::TypeMismatch {
                    path: path.to_owned(),
                }
            })?;
            entry.uses += 1;
            return Ok(value);
        }

        let value = Arc::new(loader()?);
        self.entries.insert(
            path.to_owned(),
            CacheEntry {
                value: value.clone(),
                uses: 1,
            },
        );
        Ok(value)
    }

    /// Returns the already cached resource at `path`, counting a use.
    ///
    /// For resource kinds that cannot be produced from bytes on demand
    /// (fonts need a rasterizer) and must be preloaded with
    /// [`insert`](Self::insert).
    pub fn acquire<T>(&mut self, path: &str) -> Result<Arc<T>, ResourceError>
    where
        T: Send + Sync + 'static,
    {
        self.load_with(path, || {
            Err(ResourceError::NotLoaded {
                path: path.to_owned(),
            })
        })
    }

    /// Stores a pre-built resource at `path` with one use, returning the
    /// shared handle. Replaces any existing entry.
    pub fn insert<T>(&mut self, path: impl Into<String>, value: T) -> Arc<T>
    where
        T: Send + Sync + 'static,
    {
        let path = path.into();
        let value = Arc::new(value);
        if self
            .entries
            .insert(
                path.clone(),
                CacheEntry {
                    value: value.clone(),
                    uses: 1,
                },
            )
            .is_some()
        {
            log::warn!("resource cache: replacing existing entry `{path}`");
        }
        value
    }

    /// Returns the cached resource without counting a use.
    pub fn peek<T>(&self, path: &str) -> Option<Arc<T>>
    where
        T: Send + Sync + 'static,
    {
        let entry = self.entries.get(path)?;
        entry.value.clone().downcast::<T>().ok()
    }

    /// Drops one use of `path`. Evicts the entry when the last use is
    /// released. Releasing an unknown path is logged and ignored.
    pub fn release(&mut self, path: &str) {
        match self.entries.get_mut(path) {
            Some(entry) => {
                entry.uses -= 1;
                if entry.uses == 0 {
                    self.entries.remove(path);
                }
            }
            None => log::warn!("resource cache: release of unknown path `{path}`"),
        }
    }

    /// Returns the current use count for `path`.
    pub fn use_count(&self, path: &str) -> Option<usize> {
        self.entries.get(path).map(|entry| entry.uses)
    }

    /// Drops every cached entry regardless of use counts.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
