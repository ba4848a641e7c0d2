//! Domain entities for the housing backend.
//!
//! These types mirror the storage layout, not the wire contract. The legacy
//! LIVIO tables keep bedrooms/bathrooms as free text and amenities as a
//! comma-delimited blob; normalization to the JSON the frontend expects
//! happens in `http::dto`, never here.

pub mod listing;

pub use listing::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Read-only view of a row in the legacy `users_user` table.
///
/// Only used to resolve a listing's owner display info. This service never
/// creates or updates users.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub join_date: DateTime<Utc>,
    pub is_active: bool,
}

/// A user's bookmark of a listing (`apartments_favoriteapartment`).
///
/// The (user_id, listing_id) pair is unique; both ids are raw foreign
/// identifiers with no enforced referential integrity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Favorite {
    pub id: i64,
    pub user_id: i64,
    pub listing_id: i64,
    pub created_at: DateTime<Utc>,
}

/// University reference entity used for map markers (`api_university`).
///
/// Batch-seeded via `housing-seed`, rarely mutated at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct University {
    pub id: i64,
    /// Short unique name, e.g. "UCLA"
    pub name: String,
    pub full_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub is_active: bool,
}

/// Fields for inserting a new university (id assigned by storage).
#[derive(Debug, Clone)]
pub struct NewUniversity {
    pub name: String,
    pub full_name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// An object-store image attached to a listing (`api_listing_image`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingImage {
    pub id: i64,
    /// Foreign identifier of the owning listing; not enforced at storage.
    pub listing_id: i64,
    pub image_url: String,
    pub label: Option<String>,
    /// Display order, assigned sequentially per listing starting at 0.
    /// Gaps are permitted after deletions; images are never renumbered.
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}
