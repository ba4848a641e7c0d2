//! In-memory local repository implementation.
//!
//! This module provides a local implementation of all repository traits
//! suitable for unit testing and local development. All data is stored in
//! memory using HashMap structures, providing fast, deterministic, and
//! isolated execution.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::db::repository::{
    ErrorContext, FavoriteRepository, ImageRepository, ListingRepository, RepositoryError,
    RepositoryResult, UniversityRepository, UserRepository,
};
use crate::models::{
    Favorite, Listing, ListingImage, ListingUpdate, NewListing, NewUniversity, University, User,
};

/// In-memory local repository.
///
/// Stores all data in HashMaps behind a single `RwLock`, making it ideal
/// for unit tests and local development that need isolation and speed.
///
/// # Example
/// ```
/// use housing_rust::db::repositories::LocalRepository;
///
/// let repo = LocalRepository::new();
/// assert_eq!(repo.listing_count(), 0);
/// ```
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    listings: HashMap<i64, Listing>,
    users: HashMap<i64, User>,
    universities: HashMap<i64, University>,
    favorites: HashMap<i64, Favorite>,
    images: HashMap<i64, ListingImage>,

    // ID counters
    next_listing_id: i64,
    next_university_id: i64,
    next_favorite_id: i64,
    next_image_id: i64,

    // Connection health
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            listings: HashMap::new(),
            users: HashMap::new(),
            universities: HashMap::new(),
            favorites: HashMap::new(),
            images: HashMap::new(),
            next_listing_id: 1,
            next_university_id: 1,
            next_favorite_id: 1,
            next_image_id: 1,
            is_healthy: true,
        }
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
        }
    }

    /// Insert a user row directly. The users table is read-only through the
    /// repository traits, so tests seed owners with this helper.
    pub fn insert_user(&self, user: User) {
        let mut data = self.data.write().unwrap();
        data.users.insert(user.id, user);
    }

    /// Insert a fully specified listing, bypassing `create_listing`
    /// defaults. Useful for seeding inactive or un-geocoded rows in tests.
    /// The listing's own id is kept; the id counter is bumped past it.
    pub fn insert_listing(&self, listing: Listing) -> i64 {
        let mut data = self.data.write().unwrap();
        let id = listing.id;
        if id >= data.next_listing_id {
            data.next_listing_id = id + 1;
        }
        data.listings.insert(id, listing);
        id
    }

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        let mut data = self.data.write().unwrap();
        data.is_healthy = healthy;
    }

    /// Clear all data from the repository.
    pub fn clear(&self) {
        let mut data = self.data.write().unwrap();
        let is_healthy = data.is_healthy;
        *data = LocalData {
            is_healthy,
            ..Default::default()
        };
    }

    /// Get the number of listings stored (active and inactive).
    pub fn listing_count(&self) -> usize {
        self.data.read().unwrap().listings.len()
    }

    /// Get the number of image records stored.
    pub fn image_count(&self) -> usize {
        self.data.read().unwrap().images.len()
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

/// Newest first, with id as the tiebreaker for rows created in the same
/// instant (common in tests).
fn sort_newest_first(listings: &mut [Listing]) {
    listings.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
}

fn sort_images(images: &mut [ListingImage]) {
    images.sort_by(|a, b| {
        (a.sort_order, a.created_at, a.id).cmp(&(b.sort_order, b.created_at, b.id))
    });
}

#[async_trait]
impl ListingRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().unwrap().is_healthy)
    }

    async fn list_active_listings(&self) -> RepositoryResult<Vec<Listing>> {
        let data = self.data.read().unwrap();
        let mut listings: Vec<Listing> = data
            .listings
            .values()
            .filter(|l| l.is_publicly_visible())
            .cloned()
            .collect();
        sort_newest_first(&mut listings);
        Ok(listings)
    }

    async fn get_listing(&self, id: i64) -> RepositoryResult<Listing> {
        let data = self.data.read().unwrap();
        data.listings.get(&id).cloned().ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("Listing {} not found", id),
                ErrorContext::new("get_listing")
                    .with_entity("listing")
                    .with_entity_id(id),
            )
        })
    }

    async fn create_listing(&self, new: NewListing) -> RepositoryResult<Listing> {
        let mut data = self.data.write().unwrap();
        let id = data.next_listing_id;
        data.next_listing_id += 1;
        let now = Utc::now();

        let listing = Listing {
            id,
            title: new.title,
            description: new.description,
            location: new.location,
            address: new.address,
            city: new.city,
            state: new.state,
            zip_code: new.zip_code,
            latitude: new.latitude,
            longitude: new.longitude,
            monthly_rent: new.monthly_rent,
            bedrooms: new.bedrooms,
            bathrooms: new.bathrooms,
            square_feet: new.square_feet,
            room_type: new.room_type,
            amenities: new.amenities,
            image_url: new.image_url,
            is_active: true,
            available_from: new.available_from,
            created_at: now,
            updated_at: now,
            owner_id: new.owner_id,
        };
        data.listings.insert(id, listing.clone());
        Ok(listing)
    }

    async fn update_listing(&self, id: i64, update: ListingUpdate) -> RepositoryResult<Listing> {
        let mut data = self.data.write().unwrap();
        let listing = data.listings.get_mut(&id).ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("Listing {} not found", id),
                ErrorContext::new("update_listing")
                    .with_entity("listing")
                    .with_entity_id(id),
            )
        })?;
        if !update.is_empty() {
            update.apply_to(listing);
            listing.updated_at = Utc::now();
        }
        Ok(listing.clone())
    }

    async fn soft_delete_listing(&self, id: i64) -> RepositoryResult<()> {
        let mut data = self.data.write().unwrap();
        let listing = data.listings.get_mut(&id).ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("Listing {} not found", id),
                ErrorContext::new("soft_delete_listing")
                    .with_entity("listing")
                    .with_entity_id(id),
            )
        })?;
        listing.is_active = false;
        listing.updated_at = Utc::now();
        Ok(())
    }

    async fn list_listings_by_owner(&self, owner_id: i64) -> RepositoryResult<Vec<Listing>> {
        let data = self.data.read().unwrap();
        let mut listings: Vec<Listing> = data
            .listings
            .values()
            .filter(|l| l.owner_id == owner_id)
            .cloned()
            .collect();
        sort_newest_first(&mut listings);
        Ok(listings)
    }

    async fn listing_exists(&self, id: i64) -> RepositoryResult<bool> {
        Ok(self.data.read().unwrap().listings.contains_key(&id))
    }
}

#[async_trait]
impl UserRepository for LocalRepository {
    async fn get_user(&self, id: i64) -> RepositoryResult<Option<User>> {
        Ok(self.data.read().unwrap().users.get(&id).cloned())
    }

    async fn get_users_by_ids(&self, ids: &[i64]) -> RepositoryResult<HashMap<i64, User>> {
        let data = self.data.read().unwrap();
        Ok(ids
            .iter()
            .filter_map(|id| data.users.get(id).map(|u| (*id, u.clone())))
            .collect())
    }
}

#[async_trait]
impl UniversityRepository for LocalRepository {
    async fn list_universities(&self) -> RepositoryResult<Vec<University>> {
        let data = self.data.read().unwrap();
        let mut universities: Vec<University> = data
            .universities
            .values()
            .filter(|u| u.is_active)
            .cloned()
            .collect();
        universities.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(universities)
    }

    async fn create_university(
        &self,
        new: NewUniversity,
    ) -> RepositoryResult<Option<University>> {
        let mut data = self.data.write().unwrap();
        if data.universities.values().any(|u| u.name == new.name) {
            return Ok(None);
        }
        let id = data.next_university_id;
        data.next_university_id += 1;
        let university = University {
            id,
            name: new.name,
            full_name: new.full_name,
            latitude: new.latitude,
            longitude: new.longitude,
            is_active: true,
        };
        data.universities.insert(id, university.clone());
        Ok(Some(university))
    }
}

#[async_trait]
impl FavoriteRepository for LocalRepository {
    async fn list_favorites(&self, user_id: i64) -> RepositoryResult<Vec<Favorite>> {
        let data = self.data.read().unwrap();
        let mut favorites: Vec<Favorite> = data
            .favorites
            .values()
            .filter(|f| f.user_id == user_id)
            .cloned()
            .collect();
        favorites.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(favorites)
    }

    async fn create_favorite(&self, user_id: i64, listing_id: i64) -> RepositoryResult<Favorite> {
        let mut data = self.data.write().unwrap();
        if !data.listings.contains_key(&listing_id) {
            return Err(RepositoryError::validation_with_context(
                "Listing does not exist",
                ErrorContext::new("create_favorite")
                    .with_entity("listing")
                    .with_entity_id(listing_id),
            ));
        }
        if data
            .favorites
            .values()
            .any(|f| f.user_id == user_id && f.listing_id == listing_id)
        {
            return Err(RepositoryError::validation_with_context(
                "Already in favorites",
                ErrorContext::new("create_favorite")
                    .with_entity("favorite")
                    .with_details(format!("user_id={}, listing_id={}", user_id, listing_id)),
            ));
        }
        let id = data.next_favorite_id;
        data.next_favorite_id += 1;
        let favorite = Favorite {
            id,
            user_id,
            listing_id,
            created_at: Utc::now(),
        };
        data.favorites.insert(id, favorite.clone());
        Ok(favorite)
    }

    async fn delete_favorite(&self, id: i64) -> RepositoryResult<()> {
        let mut data = self.data.write().unwrap();
        data.favorites.remove(&id).map(|_| ()).ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("Favorite {} not found", id),
                ErrorContext::new("delete_favorite")
                    .with_entity("favorite")
                    .with_entity_id(id),
            )
        })
    }

    async fn favorite_exists(&self, user_id: i64, listing_id: i64) -> RepositoryResult<bool> {
        let data = self.data.read().unwrap();
        Ok(data
            .favorites
            .values()
            .any(|f| f.user_id == user_id && f.listing_id == listing_id))
    }
}

#[async_trait]
impl ImageRepository for LocalRepository {
    async fn list_images(&self, listing_id: i64) -> RepositoryResult<Vec<ListingImage>> {
        let data = self.data.read().unwrap();
        let mut images: Vec<ListingImage> = data
            .images
            .values()
            .filter(|i| i.listing_id == listing_id)
            .cloned()
            .collect();
        sort_images(&mut images);
        Ok(images)
    }

    async fn list_images_for_listings(
        &self,
        listing_ids: &[i64],
    ) -> RepositoryResult<HashMap<i64, Vec<ListingImage>>> {
        let data = self.data.read().unwrap();
        let mut grouped: HashMap<i64, Vec<ListingImage>> = HashMap::new();
        for image in data.images.values() {
            if listing_ids.contains(&image.listing_id) {
                grouped.entry(image.listing_id).or_default().push(image.clone());
            }
        }
        for images in grouped.values_mut() {
            sort_images(images);
        }
        Ok(grouped)
    }

    async fn get_image(&self, id: i64) -> RepositoryResult<ListingImage> {
        let data = self.data.read().unwrap();
        data.images.get(&id).cloned().ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("Image {} not found", id),
                ErrorContext::new("get_image")
                    .with_entity("image")
                    .with_entity_id(id),
            )
        })
    }

    async fn create_image(
        &self,
        listing_id: i64,
        image_url: String,
        label: Option<String>,
    ) -> RepositoryResult<ListingImage> {
        let mut data = self.data.write().unwrap();
        // Order = count of images the listing has at insert time. Existing
        // rows keep their values after deletions, so gaps can appear.
        let sort_order = data
            .images
            .values()
            .filter(|i| i.listing_id == listing_id)
            .count() as i32;
        let id = data.next_image_id;
        data.next_image_id += 1;
        let image = ListingImage {
            id,
            listing_id,
            image_url,
            label,
            sort_order,
            created_at: Utc::now(),
        };
        data.images.insert(id, image.clone());
        Ok(image)
    }

    async fn delete_image(&self, id: i64) -> RepositoryResult<()> {
        let mut data = self.data.write().unwrap();
        data.images.remove(&id).map(|_| ()).ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("Image {} not found", id),
                ErrorContext::new("delete_image")
                    .with_entity("image")
                    .with_entity_id(id),
            )
        })
    }
}
