//! User bookmarks of listings.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::Favorite;

/// Repository trait for favorite operations.
///
/// The (user_id, listing_id) pair is unique. Validation of that invariant,
/// and of the referenced listing's existence, lives here so every backend
/// enforces it identically.
#[async_trait]
pub trait FavoriteRepository: Send + Sync {
    /// All favorites for a user, newest first.
    async fn list_favorites(&self, user_id: i64) -> RepositoryResult<Vec<Favorite>>;

    /// Create a favorite.
    ///
    /// # Returns
    /// * `Err(RepositoryError::ValidationError)` - if the listing does not
    ///   exist or the user already favorited it
    async fn create_favorite(&self, user_id: i64, listing_id: i64) -> RepositoryResult<Favorite>;

    /// Delete a favorite by its own id.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - if no such favorite
    async fn delete_favorite(&self, id: i64) -> RepositoryResult<()>;

    /// Whether the user has favorited the listing.
    async fn favorite_exists(&self, user_id: i64, listing_id: i64) -> RepositoryResult<bool>;
}
