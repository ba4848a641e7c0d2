//! University reference data for map markers.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{NewUniversity, University};

/// Repository trait for the university reference table.
///
/// The table is batch-seeded (`housing-seed`) and rarely mutated at
/// runtime, so the surface is intentionally small.
#[async_trait]
pub trait UniversityRepository: Send + Sync {
    /// All active universities, ordered by short name.
    async fn list_universities(&self) -> RepositoryResult<Vec<University>>;

    /// Insert a university unless the short name already exists.
    ///
    /// # Returns
    /// * `Ok(Some(University))` - the inserted row
    /// * `Ok(None)` - a row with that name was already present; nothing done
    async fn create_university(&self, new: NewUniversity) -> RepositoryResult<Option<University>>;
}
