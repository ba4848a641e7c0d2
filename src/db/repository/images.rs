//! Per-listing image records.

use async_trait::async_trait;
use std::collections::HashMap;

use super::error::RepositoryResult;
use crate::models::ListingImage;

/// Repository trait for listing image operations.
///
/// Images reference their listing by raw foreign id; deleting a listing
/// does not cascade here. Display order is assigned at insertion time and
/// never renumbered, so gaps appear after deletions.
#[async_trait]
pub trait ImageRepository: Send + Sync {
    /// Images for one listing, ordered by (sort_order asc, created_at asc).
    async fn list_images(&self, listing_id: i64) -> RepositoryResult<Vec<ListingImage>>;

    /// Batch-fetch images for a page of listings in one round trip,
    /// grouped by listing id with the same ordering as [`list_images`].
    /// Listings without images are absent from the map.
    ///
    /// [`list_images`]: ImageRepository::list_images
    async fn list_images_for_listings(
        &self,
        listing_ids: &[i64],
    ) -> RepositoryResult<HashMap<i64, Vec<ListingImage>>>;

    /// Fetch a single image record.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - if no such image
    async fn get_image(&self, id: i64) -> RepositoryResult<ListingImage>;

    /// Insert an image record. `sort_order` is set to the count of images
    /// currently stored for the listing, so sequential uploads get 0, 1, 2...
    async fn create_image(
        &self,
        listing_id: i64,
        image_url: String,
        label: Option<String>,
    ) -> RepositoryResult<ListingImage>;

    /// Remove an image record. The remaining images keep their order values.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - if no such image
    async fn delete_image(&self, id: i64) -> RepositoryResult<()>;
}
