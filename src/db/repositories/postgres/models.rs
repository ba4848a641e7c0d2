//! Row types bridging Diesel and the domain models.
//!
//! The legacy tables store latitude/longitude as NUMERIC(9,6); rows carry
//! them as `BigDecimal` and the conversions below narrow to `f64` for the
//! domain (and widen back on insert). Precision at 6 decimal places is well
//! within `f64` range.

use bigdecimal::{BigDecimal, FromPrimitive, ToPrimitive};
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;

use super::schema::{
    apartments_apartmentpost, apartments_favoriteapartment, api_listing_image, api_university,
    users_user,
};
use crate::models::{
    Favorite, Listing, ListingImage, NewListing, NewUniversity, University, User,
};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = apartments_apartmentpost)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ListingRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub location: String,
    pub address: Option<String>,
    pub city: String,
    pub state: String,
    pub zip_code: Option<String>,
    pub latitude: Option<BigDecimal>,
    pub longitude: Option<BigDecimal>,
    pub monthly_rent: BigDecimal,
    pub bedrooms: String,
    pub bathrooms: String,
    pub square_feet: Option<i32>,
    pub room_type: String,
    pub amenities: String,
    pub image_url: String,
    pub is_active: bool,
    pub available_from: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub owner_id: i64,
}

impl From<ListingRow> for Listing {
    fn from(row: ListingRow) -> Self {
        Listing {
            id: row.id,
            title: row.title,
            description: row.description,
            location: row.location,
            address: row.address,
            city: row.city,
            state: row.state,
            zip_code: row.zip_code,
            latitude: row.latitude.as_ref().and_then(ToPrimitive::to_f64),
            longitude: row.longitude.as_ref().and_then(ToPrimitive::to_f64),
            monthly_rent: row.monthly_rent,
            bedrooms: row.bedrooms,
            bathrooms: row.bathrooms,
            square_feet: row.square_feet,
            room_type: row.room_type,
            amenities: row.amenities,
            image_url: row.image_url,
            is_active: row.is_active,
            available_from: row.available_from,
            created_at: row.created_at,
            updated_at: row.updated_at,
            owner_id: row.owner_id,
        }
    }
}

pub fn decimal_from_f64(value: f64) -> BigDecimal {
    // NaN/inf never reach here: the mapper rejects non-finite input.
    BigDecimal::from_f64(value).unwrap_or_default()
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = apartments_apartmentpost)]
pub struct NewListingRow {
    pub title: String,
    pub description: String,
    pub location: String,
    pub address: Option<String>,
    pub city: String,
    pub state: String,
    pub zip_code: Option<String>,
    pub latitude: Option<BigDecimal>,
    pub longitude: Option<BigDecimal>,
    pub monthly_rent: BigDecimal,
    pub bedrooms: String,
    pub bathrooms: String,
    pub square_feet: Option<i32>,
    pub room_type: String,
    pub amenities: String,
    pub image_url: String,
    pub is_active: bool,
    pub available_from: Option<NaiveDate>,
    // The legacy table has no DB-side defaults for these (the previous
    // stack set them at the application layer), so inserts supply them.
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub owner_id: i64,
}

impl From<NewListing> for NewListingRow {
    fn from(new: NewListing) -> Self {
        let now = Utc::now();
        NewListingRow {
            title: new.title,
            description: new.description,
            location: new.location,
            address: new.address,
            city: new.city,
            state: new.state,
            zip_code: new.zip_code,
            latitude: new.latitude.map(decimal_from_f64),
            longitude: new.longitude.map(decimal_from_f64),
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
        }
    }
}

/// Partial update changeset. Outer `None` skips the column; `Some(None)`
/// writes NULL on nullable columns. `updated_at` is always written.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = apartments_apartmentpost)]
pub struct ListingChangeset {
    pub title: Option<String>,
    pub description: Option<String>,
    pub address: Option<Option<String>>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<Option<String>>,
    pub latitude: Option<Option<BigDecimal>>,
    pub longitude: Option<Option<BigDecimal>>,
    pub monthly_rent: Option<BigDecimal>,
    pub bedrooms: Option<String>,
    pub bathrooms: Option<String>,
    pub square_feet: Option<Option<i32>>,
    pub room_type: Option<String>,
    pub amenities: Option<String>,
    pub image_url: Option<String>,
    pub available_from: Option<Option<NaiveDate>>,
    pub updated_at: DateTime<Utc>,
}

impl From<crate::models::ListingUpdate> for ListingChangeset {
    fn from(update: crate::models::ListingUpdate) -> Self {
        ListingChangeset {
            title: update.title,
            description: update.description,
            address: update.address,
            city: update.city,
            state: update.state,
            zip_code: update.zip_code,
            latitude: update.latitude.map(|o| o.map(decimal_from_f64)),
            longitude: update.longitude.map(|o| o.map(decimal_from_f64)),
            monthly_rent: update.monthly_rent,
            bedrooms: update.bedrooms,
            bathrooms: update.bathrooms,
            square_feet: update.square_feet,
            room_type: update.room_type,
            amenities: update.amenities,
            image_url: update.image_url,
            available_from: update.available_from,
            updated_at: Utc::now(),
        }
    }
}

/// Read-only user row. `Selectable` keeps the password hash out of every
/// query this service runs.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users_user)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub join_date: DateTime<Utc>,
    pub is_active: bool,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            username: row.username,
            email: row.email,
            join_date: row.join_date,
            is_active: row.is_active,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = apartments_favoriteapartment)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct FavoriteRow {
    pub id: i64,
    pub user_id: i64,
    pub apartment_id: i64,
    pub created_at: DateTime<Utc>,
}

impl From<FavoriteRow> for Favorite {
    fn from(row: FavoriteRow) -> Self {
        Favorite {
            id: row.id,
            user_id: row.user_id,
            listing_id: row.apartment_id,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = apartments_favoriteapartment)]
pub struct NewFavoriteRow {
    pub user_id: i64,
    pub apartment_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = api_university)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UniversityRow {
    pub id: i64,
    pub name: String,
    pub full_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub is_active: bool,
}

impl From<UniversityRow> for University {
    fn from(row: UniversityRow) -> Self {
        University {
            id: row.id,
            name: row.name,
            full_name: row.full_name,
            latitude: row.latitude,
            longitude: row.longitude,
            is_active: row.is_active,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = api_university)]
pub struct NewUniversityRow {
    pub name: String,
    pub full_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub is_active: bool,
}

impl From<NewUniversity> for NewUniversityRow {
    fn from(new: NewUniversity) -> Self {
        NewUniversityRow {
            name: new.name,
            full_name: new.full_name,
            latitude: new.latitude,
            longitude: new.longitude,
            is_active: true,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = api_listing_image)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ImageRow {
    pub id: i64,
    pub listing_id: i64,
    pub image_url: String,
    pub label: Option<String>,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

impl From<ImageRow> for ListingImage {
    fn from(row: ImageRow) -> Self {
        ListingImage {
            id: row.id,
            listing_id: row.listing_id,
            image_url: row.image_url,
            label: row.label,
            sort_order: row.sort_order,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = api_listing_image)]
pub struct NewImageRow {
    pub listing_id: i64,
    pub image_url: String,
    pub label: Option<String>,
    pub sort_order: i32,
}
