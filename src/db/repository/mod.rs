//! Repository trait definitions for database operations.
//!
//! This module provides a collection of focused repository traits that
//! abstract database operations. Splitting responsibilities across multiple
//! traits keeps implementations focused and testable.
//!
//! # Module Organization
//!
//! - [`error`]: Error types for repository operations
//! - [`listings`]: CRUD + soft-delete for apartment listings
//! - [`users`]: Read-only lookups against the legacy users table
//! - [`universities`]: Reference data for map markers
//! - [`favorites`]: User bookmarks with pair-uniqueness validation
//! - [`images`]: Per-listing image records with display ordering
//!
//! # Convenience Trait Bound
//!
//! For code that needs the whole surface, use the [`FullRepository`] bound:
//!
//! ```ignore
//! async fn dashboard<R: FullRepository>(repo: &R, owner: i64) -> RepositoryResult<()> {
//!     let listings = repo.list_listings_by_owner(owner).await?;
//!     let ids: Vec<i64> = listings.iter().map(|l| l.id).collect();
//!     let _images = repo.list_images_for_listings(&ids).await?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod favorites;
pub mod images;
pub mod listings;
pub mod universities;
pub mod users;

// Re-export error types
pub use error::{ErrorContext, RepositoryError, RepositoryResult};

// Re-export all traits
pub use favorites::FavoriteRepository;
pub use images::ImageRepository;
pub use listings::ListingRepository;
pub use universities::UniversityRepository;
pub use users::UserRepository;

/// Composite trait bound for a complete repository implementation.
///
/// Automatically implemented for any type that implements every per-entity
/// trait. Handlers and the server hold the repository as
/// `Arc<dyn FullRepository>`.
pub trait FullRepository:
    ListingRepository + UserRepository + UniversityRepository + FavoriteRepository + ImageRepository
{
}

impl<T> FullRepository for T where
    T: ListingRepository
        + UserRepository
        + UniversityRepository
        + FavoriteRepository
        + ImageRepository
{
}
