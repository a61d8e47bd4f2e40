//! Application state for the HTTP server.

use std::sync::Arc;

use crate::db::repository::FullRepository;

/// Shared application state passed to all handlers.
///
/// Handlers hold no state of their own; everything a request needs comes
/// from the repository.
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn FullRepository>,
}

impl AppState {
    pub fn new(repository: Arc<dyn FullRepository>) -> Self {
        Self { repository }
    }

    /// Wrap a concrete backend.
    pub fn from_repository<R: FullRepository + 'static>(repository: R) -> Self {
        Self::new(Arc::new(repository))
    }
}
