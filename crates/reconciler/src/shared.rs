use crate::catalog::EndpointCatalog;
use apiscout_inference::EndpointCandidate;
use std::sync::{Arc, Mutex};

/// Thread-safe handle over one catalog for concurrent producers.
///
/// Every fold takes the lock, so observations from racing tasks serialize;
/// the catalog's key order then guarantees the result does not depend on
/// who won.
#[derive(Debug, Clone, Default)]
pub struct SharedCatalog {
    inner: Arc<Mutex<EndpointCatalog>>,
}

impl SharedCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a batch of candidates; returns how many were accepted.
    pub fn observe_all(&self, candidates: &[EndpointCandidate]) -> usize {
        let mut catalog = self.inner.lock().expect("catalog mutex poisoned");
        catalog.observe_all(candidates)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("catalog mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Take the catalog out of the handle, cloning only if other handles
    /// are still alive.
    pub fn into_catalog(self) -> EndpointCatalog {
        match Arc::try_unwrap(self.inner) {
            Ok(mutex) => mutex.into_inner().expect("catalog mutex poisoned"),
            Err(shared) => shared.lock().expect("catalog mutex poisoned").clone(),
        }
    }
}
