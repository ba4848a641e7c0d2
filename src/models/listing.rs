//! Listing entity and its write shapes.

use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A rentable unit, as stored in the legacy `apartments_apartmentpost` table.
///
/// `owner_id` is a raw foreign identifier into `users_user` with no database
/// constraint; a missing owner row must be tolerated by readers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub id: i64,
    pub title: String,
    pub description: String,
    /// Legacy required column; mirrors `city` when not supplied explicitly.
    pub location: String,
    pub address: Option<String>,
    pub city: String,
    pub state: String,
    pub zip_code: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub monthly_rent: BigDecimal,
    /// Free text: "1", "2", "Studio", ...
    pub bedrooms: String,
    /// Free text: "1", "1.5", ...
    pub bathrooms: String,
    pub square_feet: Option<i32>,
    pub room_type: String,
    /// Comma-delimited blob, e.g. "WiFi,Pool,Gym".
    pub amenities: String,
    pub image_url: String,
    /// Drives soft delete; inactive listings stay in storage.
    pub is_active: bool,
    pub available_from: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub owner_id: i64,
}

impl Listing {
    /// A listing is publicly visible only when active and geocoded.
    pub fn is_publicly_visible(&self) -> bool {
        self.is_active && self.latitude.is_some() && self.longitude.is_some()
    }
}

/// Fields for creating a listing. Storage assigns id and timestamps;
/// `is_active` defaults to true and `location` to `city` upstream of here.
#[derive(Debug, Clone)]
pub struct NewListing {
    pub title: String,
    pub description: String,
    pub location: String,
    pub address: Option<String>,
    pub city: String,
    pub state: String,
    pub zip_code: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub monthly_rent: BigDecimal,
    pub bedrooms: String,
    pub bathrooms: String,
    pub square_feet: Option<i32>,
    pub room_type: String,
    /// Already joined into the delimited storage form.
    pub amenities: String,
    pub image_url: String,
    pub available_from: Option<NaiveDate>,
    pub owner_id: i64,
}

/// Partial update: only `Some` fields are written.
///
/// Nested `Option`s distinguish "leave unchanged" (outer `None`) from
/// "set to null" (inner `None`) on nullable columns.
#[derive(Debug, Clone, Default)]
pub struct ListingUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub address: Option<Option<String>>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<Option<String>>,
    pub latitude: Option<Option<f64>>,
    pub longitude: Option<Option<f64>>,
    pub monthly_rent: Option<BigDecimal>,
    pub bedrooms: Option<String>,
    pub bathrooms: Option<String>,
    pub square_feet: Option<Option<i32>>,
    pub room_type: Option<String>,
    /// Joined delimited form, when amenities are being replaced.
    pub amenities: Option<String>,
    pub image_url: Option<String>,
    pub available_from: Option<Option<NaiveDate>>,
}

impl ListingUpdate {
    /// True when no field is set; storage can skip the write entirely.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.address.is_none()
            && self.city.is_none()
            && self.state.is_none()
            && self.zip_code.is_none()
            && self.latitude.is_none()
            && self.longitude.is_none()
            && self.monthly_rent.is_none()
            && self.bedrooms.is_none()
            && self.bathrooms.is_none()
            && self.square_feet.is_none()
            && self.room_type.is_none()
            && self.amenities.is_none()
            && self.image_url.is_none()
            && self.available_from.is_none()
    }

    /// Apply this update to a listing in place. Used by the in-memory
    /// repository; the Postgres backend builds an equivalent UPDATE.
    pub fn apply_to(&self, listing: &mut Listing) {
        if let Some(v) = &self.title {
            listing.title = v.clone();
        }
        if let Some(v) = &self.description {
            listing.description = v.clone();
        }
        if let Some(v) = &self.address {
            listing.address = v.clone();
        }
        if let Some(v) = &self.city {
            listing.city = v.clone();
        }
        if let Some(v) = &self.state {
            listing.state = v.clone();
        }
        if let Some(v) = &self.zip_code {
            listing.zip_code = v.clone();
        }
        if let Some(v) = &self.latitude {
            listing.latitude = *v;
        }
        if let Some(v) = &self.longitude {
            listing.longitude = *v;
        }
        if let Some(v) = &self.monthly_rent {
            listing.monthly_rent = v.clone();
        }
        if let Some(v) = &self.bedrooms {
            listing.bedrooms = v.clone();
        }
        if let Some(v) = &self.bathrooms {
            listing.bathrooms = v.clone();
        }
        if let Some(v) = &self.square_feet {
            listing.square_feet = *v;
        }
        if let Some(v) = &self.room_type {
            listing.room_type = v.clone();
        }
        if let Some(v) = &self.amenities {
            listing.amenities = v.clone();
        }
        if let Some(v) = &self.image_url {
            listing.image_url = v.clone();
        }
        if let Some(v) = &self.available_from {
            listing.available_from = *v;
        }
    }
}
