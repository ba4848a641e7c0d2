//! Core listing repository trait for CRUD and soft-delete operations.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{Listing, ListingUpdate, NewListing};

/// Repository trait for apartment listing operations.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait ListingRepository: Send + Sync {
    // ==================== Health & Connection ====================

    /// Check if the database connection is healthy.
    ///
    /// # Returns
    /// - `Ok(true)` if connection is healthy
    /// - `Ok(false)` if connection is unhealthy but no error occurred
    /// - `Err(RepositoryError)` if an error occurred during the check
    async fn health_check(&self) -> RepositoryResult<bool>;

    // ==================== Listing Operations ====================

    /// List every publicly visible listing: active AND both coordinates
    /// present, newest first. No pagination; the frontend filters the
    /// full list.
    async fn list_active_listings(&self) -> RepositoryResult<Vec<Listing>>;

    /// Retrieve a single listing by ID.
    ///
    /// # Returns
    /// * `Ok(Listing)` - The listing
    /// * `Err(RepositoryError::NotFound)` - If the listing doesn't exist
    async fn get_listing(&self, id: i64) -> RepositoryResult<Listing>;

    /// Insert a new listing. The row is created active; storage assigns
    /// the id and creation/update timestamps.
    async fn create_listing(&self, new: NewListing) -> RepositoryResult<Listing>;

    /// Mutate only the supplied fields of a listing and return the updated
    /// row. An empty update returns the row unchanged.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If the listing doesn't exist
    async fn update_listing(&self, id: i64, update: ListingUpdate) -> RepositoryResult<Listing>;

    /// Soft-delete: set `is_active = false`, keeping the row and its
    /// images. Idempotent; repeating the call is not an error.
    async fn soft_delete_listing(&self, id: i64) -> RepositoryResult<()>;

    /// All listings for an owner, active and inactive, newest first.
    /// Backs the owner's private dashboard.
    async fn list_listings_by_owner(&self, owner_id: i64) -> RepositoryResult<Vec<Listing>>;

    /// Check whether a listing row exists (active or not).
    async fn listing_exists(&self, id: i64) -> RepositoryResult<bool>;
}
