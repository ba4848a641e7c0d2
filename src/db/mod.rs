//! Data access layer.
//!
//! The repository traits in [`repository`] define every operation the HTTP
//! layer needs; [`repositories`] holds the backends (in-memory and
//! Postgres), and [`factory`] selects one at startup. A process-wide
//! repository handle is installed once with [`init_repository`] and read
//! with [`get_repository`].

pub mod factory;
pub mod repositories;
pub mod repository;

pub use factory::{RepositoryFactory, RepositoryType};
pub use repository::{
    ErrorContext, FavoriteRepository, FullRepository, ImageRepository, ListingRepository,
    RepositoryError, RepositoryResult, UniversityRepository, UserRepository,
};

use std::sync::{Arc, OnceLock};

static REPOSITORY: OnceLock<Arc<dyn FullRepository>> = OnceLock::new();

/// Install the process-wide repository. Returns an error if one is already
/// installed.
pub fn init_repository(repo: Arc<dyn FullRepository>) -> RepositoryResult<()> {
    REPOSITORY
        .set(repo)
        .map_err(|_| RepositoryError::configuration("Repository already initialized"))
}

/// Get the process-wide repository installed by [`init_repository`].
pub fn get_repository() -> RepositoryResult<Arc<dyn FullRepository>> {
    REPOSITORY
        .get()
        .cloned()
        .ok_or_else(|| RepositoryError::configuration("Repository not initialized"))
}
