//! Memoized kernel generation

use super::artifact::{KernelArtifact, KernelOptions};
use crate::error::Result;
use crate::tensor::Shape;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Cache key: layouts in canonical form, logical shape and options
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct KernelKey {
    /// Canonical source layout
    pub from: String,
    /// Canonical destination layout
    pub to: String,
    /// Logical shape
    pub shape: Shape,
    /// Generation options
    pub options: KernelOptions,
}

/// Default bound on the number of cached artifacts
pub const DEFAULT_MAX_ENTRIES: usize = 256;

/// Cache for generated kernels keyed by [`KernelKey`]
///
/// Every distinct shape is a separate entry. When an insert would exceed
/// `max_entries` the whole map is flushed first; artifacts already handed out
/// stay alive through their `Arc`.
#[derive(Debug)]
pub struct KernelCache {
    artifacts: Mutex<HashMap<KernelKey, Arc<KernelArtifact>>>,
    max_entries: usize,
}

impl Default for KernelCache {
    fn default() -> Self {
        Self::with_max_entries(DEFAULT_MAX_ENTRIES)
    }
}

impl KernelCache {
    /// Create an empty cache holding up to [`DEFAULT_MAX_ENTRIES`] artifacts
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty cache holding up to `max_entries` artifacts (at least 1)
    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            artifacts: Mutex::new(HashMap::new()),
            max_entries: max_entries.max(1),
        }
    }

    /// Upper bound on cached artifacts
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Get or create an artifact
    ///
    /// `generate` runs with the lock held, so concurrent requests for one key
    /// generate once. Failures are not cached.
    pub fn get_or_create<F>(&self, key: KernelKey, generate: F) -> Result<Arc<KernelArtifact>>
    where
        F: FnOnce() -> Result<KernelArtifact>,
    {
        let mut artifacts = self.artifacts.lock();
        if let Some(artifact) = artifacts.get(&key) {
            log::trace!("kernel cache hit: {}", artifact.name);
            return Ok(artifact.clone());
        }

        let artifact = Arc::new(generate()?);
        log::trace!("kernel cache miss: {}", artifact.name);
        if artifacts.len() >= self.max_entries {
            log::debug!("kernel cache full ({} entries), flushing", artifacts.len());
            artifacts.clear();
        }
        artifacts.insert(key, artifact.clone());
        Ok(artifact)
    }

    /// Number of cached artifacts
    pub fn len(&self) -> usize {
        self.artifacts.lock().len()
    }

    /// Whether nothing is cached
    pub fn is_empty(&self) -> bool {
        self.artifacts.lock().is_empty()
    }

    /// Drop every cached artifact
    pub fn clear(&self) {
        self.artifacts.lock().clear();
    }
}
