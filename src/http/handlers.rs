//! HTTP handlers for the REST API.
//!
//! Each handler parses and validates its inputs, calls one repository
//! operation (plus the object store for image upload/delete), shapes the
//! result through [`super::dto`], and returns the response with the correct
//! status code.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use tracing::warn;

use super::dto::{
    self, CreateFavoriteRequest, CreateListingRequest, FavoriteCheckResponse, FavoriteDto,
    HealthResponse, ImageDto, ListingDto, UniversityDto, UpdateListingRequest,
};
use super::error::AppError;
use super::extract::{JsonBody, PathParam};
use super::identity;
use super::state::AppState;
use crate::db::repository::RepositoryError;
use crate::models::{Favorite, Listing};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

/// Parse a JSON body into a typed request, reporting failures in the uniform
/// error shape instead of axum's default rejection.
fn parse_body<T: serde::de::DeserializeOwned>(body: serde_json::Value) -> Result<T, AppError> {
    serde_json::from_value(body).map_err(|e| AppError::BadRequest(e.to_string()))
}

// =============================================================================
// Health
// =============================================================================

/// GET /api/health/
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let database = match state.repository.health_check().await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(_) => "error".to_string(),
    };
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        database,
    }))
}

// =============================================================================
// Listings
// =============================================================================

/// Batch-shape listings: one owner query and one image query for the whole
/// page, regardless of listing count.
async fn shape_page(state: &AppState, listings: Vec<Listing>) -> Result<Vec<ListingDto>, AppError> {
    let owner_ids: Vec<i64> = listings.iter().map(|l| l.owner_id).collect();
    let listing_ids: Vec<i64> = listings.iter().map(|l| l.id).collect();
    let owners = state.repository.get_users_by_ids(&owner_ids).await?;
    let mut images = state
        .repository
        .list_images_for_listings(&listing_ids)
        .await?;
    Ok(dto::shape_listings(listings, &owners, &mut images))
}

async fn shape_one(state: &AppState, listing: Listing) -> Result<ListingDto, AppError> {
    let owner = state.repository.get_user(listing.owner_id).await?;
    let images = state.repository.list_images(listing.id).await?;
    Ok(dto::shape_listing(listing, owner.as_ref(), images))
}

/// GET /api/listings/
///
/// Active, geocoded listings only, newest first.
pub async fn list_listings(State(state): State<AppState>) -> HandlerResult<Vec<ListingDto>> {
    let listings = state.repository.list_active_listings().await?;
    Ok(Json(shape_page(&state, listings).await?))
}

/// POST /api/listings/
///
/// Returns the full shaped listing, not just the write echo.
pub async fn create_listing(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> Result<(StatusCode, Json<ListingDto>), AppError> {
    let request: CreateListingRequest = parse_body(body)?;
    let owner = identity::from_payload(request.owner_id);
    let mut new_listing = request.into_new_listing().map_err(AppError::BadRequest)?;
    new_listing.owner_id = owner.user_id;

    let listing = state.repository.create_listing(new_listing).await?;
    let shaped = shape_one(&state, listing).await?;
    Ok((StatusCode::CREATED, Json(shaped)))
}

/// GET /api/listings/{id}/
pub async fn get_listing(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
) -> HandlerResult<ListingDto> {
    let listing = state.repository.get_listing(id).await?;
    Ok(Json(shape_one(&state, listing).await?))
}

/// PUT/PATCH /api/listings/{id}/
pub async fn update_listing(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
    JsonBody(body): JsonBody,
) -> HandlerResult<ListingDto> {
    let request: UpdateListingRequest = parse_body(body)?;
    let update = request.into_update().map_err(AppError::BadRequest)?;
    let listing = state.repository.update_listing(id, update).await?;
    Ok(Json(shape_one(&state, listing).await?))
}

/// DELETE /api/listings/{id}/
///
/// Soft delete; the row and its images stay in storage.
pub async fn delete_listing(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
) -> Result<StatusCode, AppError> {
    state.repository.soft_delete_listing(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/listings/user/{owner_id}/
///
/// The owner's private dashboard: includes inactive listings.
pub async fn list_listings_by_owner(
    State(state): State<AppState>,
    PathParam(owner_id): PathParam<i64>,
) -> HandlerResult<Vec<ListingDto>> {
    let owner = identity::from_path(owner_id);
    let listings = state
        .repository
        .list_listings_by_owner(owner.user_id)
        .await?;
    Ok(Json(shape_page(&state, listings).await?))
}

// =============================================================================
// Universities
// =============================================================================

/// GET /api/universities/
pub async fn list_universities(
    State(state): State<AppState>,
) -> HandlerResult<Vec<UniversityDto>> {
    let universities = state.repository.list_universities().await?;
    Ok(Json(
        universities.into_iter().map(UniversityDto::from).collect(),
    ))
}

// =============================================================================
// Favorites
// =============================================================================

/// Shape favorites with their nested listings. A favorite whose listing row
/// has disappeared nests null instead of erroring.
async fn shape_favorites(
    state: &AppState,
    favorites: Vec<Favorite>,
) -> Result<Vec<FavoriteDto>, AppError> {
    let mut listings = Vec::new();
    for favorite in &favorites {
        match state.repository.get_listing(favorite.listing_id).await {
            Ok(listing) => listings.push(Some(listing)),
            Err(RepositoryError::NotFound { .. }) => listings.push(None),
            Err(e) => return Err(e.into()),
        }
    }

    let owner_ids: Vec<i64> = listings
        .iter()
        .flatten()
        .map(|l| l.owner_id)
        .collect();
    let listing_ids: Vec<i64> = listings.iter().flatten().map(|l| l.id).collect();
    let owners = state.repository.get_users_by_ids(&owner_ids).await?;
    let mut images = state
        .repository
        .list_images_for_listings(&listing_ids)
        .await?;

    Ok(favorites
        .into_iter()
        .zip(listings)
        .map(|(favorite, listing)| {
            let shaped = listing.map(|l| {
                let owner = owners.get(&l.owner_id);
                let listing_images = images.remove(&l.id).unwrap_or_default();
                dto::shape_listing(l, owner, listing_images)
            });
            dto::shape_favorite(favorite, shaped)
        })
        .collect())
}

/// GET /api/favorites/{user_id}/
pub async fn list_favorites(
    State(state): State<AppState>,
    PathParam(user_id): PathParam<i64>,
) -> HandlerResult<Vec<FavoriteDto>> {
    let user = identity::from_path(user_id);
    let favorites = state.repository.list_favorites(user.user_id).await?;
    Ok(Json(shape_favorites(&state, favorites).await?))
}

/// POST /api/favorites/
///
/// 400 when the listing is absent or the pair already exists.
pub async fn create_favorite(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> Result<(StatusCode, Json<FavoriteDto>), AppError> {
    let request: CreateFavoriteRequest = parse_body(body)?;
    let user = identity::from_payload(request.user_id);
    let favorite = state
        .repository
        .create_favorite(user.user_id, request.apartment_id)
        .await?;

    let listing = state.repository.get_listing(favorite.listing_id).await?;
    let shaped = shape_one(&state, listing).await?;
    Ok((
        StatusCode::CREATED,
        Json(dto::shape_favorite(favorite, Some(shaped))),
    ))
}

/// DELETE /api/favorites/delete/{id}/
pub async fn delete_favorite(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
) -> Result<StatusCode, AppError> {
    state.repository.delete_favorite(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/favorites/check/{user_id}/{listing_id}/
pub async fn check_favorite(
    State(state): State<AppState>,
    PathParam((user_id, listing_id)): PathParam<(i64, i64)>,
) -> HandlerResult<FavoriteCheckResponse> {
    let user = identity::from_path(user_id);
    let is_favorited = state
        .repository
        .favorite_exists(user.user_id, listing_id)
        .await?;
    Ok(Json(FavoriteCheckResponse { is_favorited }))
}

// =============================================================================
// Images
// =============================================================================

struct UploadForm {
    data: Bytes,
    file_name: String,
    content_type: String,
    listing_id: Option<i64>,
    label: String,
}

async fn read_upload_form(mut multipart: Multipart) -> Result<Option<UploadForm>, AppError> {
    let mut file: Option<(Bytes, String, String)> = None;
    let mut listing_id = None;
    // Absent and blank labels both store as the empty string.
    let mut label = String::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        match field.name() {
            Some("image") => {
                let file_name = field.file_name().unwrap_or("upload.jpg").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                file = Some((data, file_name, content_type));
            }
            Some("listing_id") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                listing_id = Some(
                    text.trim()
                        .parse::<i64>()
                        .map_err(|_| AppError::BadRequest("listing_id must be an integer".to_string()))?,
                );
            }
            Some("label") => {
                label = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
            }
            _ => {}
        }
    }

    Ok(file.map(|(data, file_name, content_type)| UploadForm {
        data,
        file_name,
        content_type,
        listing_id,
        label,
    }))
}

/// POST /api/images/upload/
///
/// Multipart fields: `image` (required file), `listing_id` (required),
/// `label` (optional). Uploads to the object store, then records the URL
/// with order = current image count for the listing.
pub async fn upload_image(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ImageDto>), AppError> {
    let form = read_upload_form(multipart)
        .await?
        .ok_or_else(|| AppError::BadRequest("No image file provided".to_string()))?;
    let listing_id = form
        .listing_id
        .ok_or_else(|| AppError::BadRequest("listing_id is required".to_string()))?;

    if !state.repository.listing_exists(listing_id).await? {
        return Err(AppError::NotFound("Listing not found".to_string()));
    }

    let url = state
        .object_store
        .upload(form.data, &form.file_name, &form.content_type, listing_id)
        .await
        .map_err(|e| AppError::Upstream(format!("Upload failed: {}", e)))?;

    let image = state
        .repository
        .create_image(listing_id, url, Some(form.label))
        .await?;
    Ok((StatusCode::CREATED, Json(ImageDto::from(image))))
}

/// GET /api/images/{listing_id}/
pub async fn list_images(
    State(state): State<AppState>,
    PathParam(listing_id): PathParam<i64>,
) -> HandlerResult<Vec<ImageDto>> {
    let images = state.repository.list_images(listing_id).await?;
    Ok(Json(images.into_iter().map(ImageDto::from).collect()))
}

/// DELETE /api/images/delete/{id}/
///
/// Object-store deletion is best effort: a storage failure is logged and the
/// record is removed anyway.
pub async fn delete_image(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
) -> Result<StatusCode, AppError> {
    let image = state.repository.get_image(id).await?;

    if let Err(e) = state.object_store.delete(&image.image_url).await {
        warn!(image_id = id, url = %image.image_url, error = %e, "object store delete failed, removing record anyway");
    }

    state.repository.delete_image(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
