//! Shared application state for HTTP handlers.

use std::sync::Arc;

use crate::db::repository::FullRepository;
use crate::storage::ObjectStore;

/// State shared across all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Repository for data access
    pub repository: Arc<dyn FullRepository>,
    /// Object store for listing images
    pub object_store: Arc<dyn ObjectStore>,
}

impl AppState {
    pub fn new(repository: Arc<dyn FullRepository>, object_store: Arc<dyn ObjectStore>) -> Self {
        Self {
            repository,
            object_store,
        }
    }
}
