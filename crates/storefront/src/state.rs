//! Application state shared across handlers.

use std::sync::Arc;

use crate::db::Store;
use crate::services::auth::CredentialHasher;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Holds the storage seam and the credential
/// hasher; nothing in here caches cart state.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: Arc<dyn Store>,
    hasher: Arc<dyn CredentialHasher>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, hasher: Arc<dyn CredentialHasher>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { store, hasher }),
        }
    }

    /// The storage backend.
    #[must_use]
    pub fn store(&self) -> &dyn Store {
        self.inner.store.as_ref()
    }

    /// The credential hasher used for signup and login.
    #[must_use]
    pub fn hasher(&self) -> &dyn CredentialHasher {
        self.inner.hasher.as_ref()
    }
}
