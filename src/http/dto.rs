//! Data transfer objects and the storage-to-wire mapping.
//!
//! Storage rows carry legacy column names and loosely-typed text fields
//! (`bedrooms` can be "Studio", `amenities` is a comma blob). Everything the
//! frontend sees goes through the shaping functions here, and the write
//! direction reverses the same field renames. Parse-with-fallback rules live
//! in this module only; handlers never touch the raw text fields.

use bigdecimal::{BigDecimal, FromPrimitive, ToPrimitive};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

use crate::models::{Favorite, Listing, ListingImage, ListingUpdate, NewListing, University, User};

// =============================================================================
// Wire shapes
// =============================================================================

/// Owner block nested in every listing payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OwnerDto {
    pub name: String,
    pub verified: bool,
}

/// A listing image on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageDto {
    pub id: i64,
    pub image_url: String,
    pub label: Option<String>,
    pub order: i32,
}

impl From<ListingImage> for ImageDto {
    fn from(image: ListingImage) -> Self {
        Self {
            id: image.id,
            image_url: image.image_url,
            label: image.label,
            order: image.sort_order,
        }
    }
}

/// A fully shaped listing, as consumed by the map and listing cards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingDto {
    pub id: i64,
    pub title: String,
    pub price: f64,
    pub address: String,
    pub bedrooms: i32,
    pub bathrooms: f64,
    pub sqft: Option<i32>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    #[serde(rename = "type")]
    pub room_type: String,
    pub description: String,
    pub amenities: Vec<String>,
    pub owner: OwnerDto,
    pub available: bool,
    pub images: Vec<ImageDto>,
    pub image_url: String,
}

/// University marker for the map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UniversityDto {
    pub name: String,
    #[serde(rename = "fullName")]
    pub full_name: String,
    pub lat: f64,
    pub lng: f64,
}

impl From<University> for UniversityDto {
    fn from(u: University) -> Self {
        Self {
            name: u.name,
            full_name: u.full_name,
            lat: u.latitude,
            lng: u.longitude,
        }
    }
}

/// A favorite with its listing nested for the saved-listings view.
///
/// `listing` is null when the favorited listing row has since disappeared.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FavoriteDto {
    pub id: i64,
    pub user_id: i64,
    pub apartment_id: i64,
    pub created_at: DateTime<Utc>,
    pub listing: Option<ListingDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FavoriteCheckResponse {
    pub is_favorited: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
}

// =============================================================================
// Requests
// =============================================================================

/// Body for POST /api/listings/. Wire names; the conversion to [`NewListing`]
/// applies the renames and joins amenities into the storage blob.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateListingRequest {
    pub title: String,
    pub description: String,
    pub city: String,
    pub state: String,
    pub price: f64,
    pub bedrooms: String,
    pub bathrooms: String,
    #[serde(rename = "type")]
    pub room_type: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub zip_code: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    #[serde(default)]
    pub sqft: Option<i32>,
    #[serde(default)]
    pub amenities: Option<Vec<String>>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub available_from: Option<NaiveDate>,
    pub owner_id: i64,
}

impl CreateListingRequest {
    pub fn into_new_listing(self) -> Result<NewListing, String> {
        let monthly_rent = price_to_decimal(self.price)?;
        Ok(NewListing {
            title: self.title,
            description: self.description,
            // Legacy required column, mirrors the city.
            location: self.city.clone(),
            address: self.address,
            city: self.city,
            state: self.state,
            zip_code: self.zip_code,
            latitude: self.lat,
            longitude: self.lng,
            monthly_rent,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            square_feet: self.sqft,
            room_type: self.room_type,
            amenities: join_amenities(&self.amenities.unwrap_or_default()),
            image_url: self.image_url.unwrap_or_default(),
            available_from: self.available_from,
            owner_id: self.owner_id,
        })
    }
}

/// Body for PUT/PATCH /api/listings/{id}/. Only supplied fields are written;
/// nullable fields use a nested `Option` so an explicit `null` clears the
/// column while an absent key leaves it untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateListingRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub bedrooms: Option<String>,
    #[serde(default)]
    pub bathrooms: Option<String>,
    #[serde(default, rename = "type")]
    pub room_type: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub address: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub zip_code: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub lat: Option<Option<f64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub lng: Option<Option<f64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub sqft: Option<Option<i32>>,
    #[serde(default)]
    pub amenities: Option<Vec<String>>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub available_from: Option<Option<NaiveDate>>,
}

impl UpdateListingRequest {
    pub fn into_update(self) -> Result<ListingUpdate, String> {
        let monthly_rent = match self.price {
            Some(p) => Some(price_to_decimal(p)?),
            None => None,
        };
        Ok(ListingUpdate {
            title: self.title,
            description: self.description,
            address: self.address,
            city: self.city,
            state: self.state,
            zip_code: self.zip_code,
            latitude: self.lat,
            longitude: self.lng,
            monthly_rent,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            square_feet: self.sqft,
            room_type: self.room_type,
            amenities: self.amenities.map(|list| join_amenities(&list)),
            image_url: self.image_url,
            available_from: self.available_from,
        })
    }
}

/// Body for POST /api/favorites/. `apartment_id` is the legacy wire name for
/// the listing id.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateFavoriteRequest {
    pub user_id: i64,
    pub apartment_id: i64,
}

/// Present-with-null deserializes to `Some(None)`; an absent key stays `None`
/// via `#[serde(default)]`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

// =============================================================================
// Shaping
// =============================================================================

/// "Studio" (any case) means zero bedrooms; anything unparsable also falls
/// back to zero so old free-text rows never break the map filters.
pub fn parse_bedrooms(raw: &str) -> i32 {
    if raw.trim().eq_ignore_ascii_case("studio") {
        return 0;
    }
    raw.trim().parse().unwrap_or(0)
}

/// Bathrooms default to 1.0 when the stored text does not parse.
pub fn parse_bathrooms(raw: &str) -> f64 {
    raw.trim().parse().unwrap_or(1.0)
}

/// "WiFi, Pool,Gym" -> ["WiFi", "Pool", "Gym"].
pub fn split_amenities(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn join_amenities(list: &[String]) -> String {
    list.join(",")
}

/// Join the non-empty address components with ", ".
pub fn full_address(listing: &Listing) -> String {
    [
        listing.address.as_deref(),
        Some(listing.city.as_str()),
        Some(listing.state.as_str()),
        listing.zip_code.as_deref(),
    ]
    .into_iter()
    .flatten()
    .filter(|part| !part.is_empty())
    .collect::<Vec<_>>()
    .join(", ")
}

/// Owner display block. The username is abbreviated to "A. Ndyponc" form for
/// privacy; a missing owner row shapes as a generic verified owner rather
/// than an error.
pub fn owner_dto(owner: Option<&User>) -> OwnerDto {
    match owner {
        Some(user) => OwnerDto {
            name: display_name(&user.username),
            verified: user.is_active,
        },
        None => OwnerDto {
            name: "Property Owner".to_string(),
            verified: true,
        },
    }
}

fn display_name(username: &str) -> String {
    let mut chars = username.chars();
    match chars.next() {
        Some(first) if chars.clone().next().is_some() => {
            format!("{}. {}", first.to_uppercase(), title_case(chars.as_str()))
        }
        Some(first) => first.to_uppercase().to_string(),
        None => String::new(),
    }
}

/// Uppercase the first letter of each word, lowercase the rest.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

fn price_to_decimal(price: f64) -> Result<BigDecimal, String> {
    BigDecimal::from_f64(price).ok_or_else(|| "price must be a finite number".to_string())
}

fn decimal_to_f64(value: &BigDecimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

/// Shape one listing with its prefetched owner and images.
pub fn shape_listing(
    listing: Listing,
    owner: Option<&User>,
    images: Vec<ListingImage>,
) -> ListingDto {
    ListingDto {
        id: listing.id,
        price: decimal_to_f64(&listing.monthly_rent),
        address: full_address(&listing),
        bedrooms: parse_bedrooms(&listing.bedrooms),
        bathrooms: parse_bathrooms(&listing.bathrooms),
        sqft: listing.square_feet,
        lat: listing.latitude,
        lng: listing.longitude,
        amenities: split_amenities(&listing.amenities),
        owner: owner_dto(owner),
        available: listing.is_active,
        images: images.into_iter().map(ImageDto::from).collect(),
        title: listing.title,
        room_type: listing.room_type,
        description: listing.description,
        image_url: listing.image_url,
    }
}

/// Shape a page of listings from batch-fetched owners and images, preserving
/// the input order. One owner query and one image query serve the whole page.
pub fn shape_listings(
    listings: Vec<Listing>,
    owners: &HashMap<i64, User>,
    images: &mut HashMap<i64, Vec<ListingImage>>,
) -> Vec<ListingDto> {
    listings
        .into_iter()
        .map(|listing| {
            let owner = owners.get(&listing.owner_id);
            let listing_images = images.remove(&listing.id).unwrap_or_default();
            shape_listing(listing, owner, listing_images)
        })
        .collect()
}

/// Shape a favorite with its nested listing (already shaped, possibly
/// missing).
pub fn shape_favorite(favorite: Favorite, listing: Option<ListingDto>) -> FavoriteDto {
    FavoriteDto {
        id: favorite.id,
        user_id: favorite.user_id,
        apartment_id: favorite.listing_id,
        created_at: favorite.created_at,
        listing,
    }
}
