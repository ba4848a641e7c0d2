//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! and creates the axum router ready for serving.

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
///
/// Paths follow the frontend contract, which uses trailing slashes; each
/// collection endpoint also answers without one.
pub fn create_router(state: AppState) -> Router {
    let listings = get(handlers::list_listings).post(handlers::create_listing);
    let listing = get(handlers::get_listing)
        .put(handlers::update_listing)
        .patch(handlers::update_listing)
        .delete(handlers::delete_listing);

    let api = Router::new()
        // Listings
        .route("/listings", listings.clone())
        .route("/listings/", listings)
        .route("/listings/{id}", listing.clone())
        .route("/listings/{id}/", listing)
        .route("/listings/user/{owner_id}/", get(handlers::list_listings_by_owner))
        // Universities
        .route("/universities", get(handlers::list_universities))
        .route("/universities/", get(handlers::list_universities))
        // Favorites
        .route("/favorites/", post(handlers::create_favorite))
        .route("/favorites/{user_id}/", get(handlers::list_favorites))
        .route("/favorites/delete/{id}/", delete(handlers::delete_favorite))
        .route(
            "/favorites/check/{user_id}/{listing_id}/",
            get(handlers::check_favorite),
        )
        // Images
        .route("/images/upload/", post(handlers::upload_image))
        .route("/images/{listing_id}/", get(handlers::list_images))
        .route("/images/delete/{id}/", delete(handlers::delete_image))
        // Health
        .route("/health/", get(handlers::health_check))
        .route("/health", get(handlers::health_check));

    Router::new()
        .nest("/api", api)
        // Image uploads come through as multipart bodies.
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .with_state(state)
}

/// CORS from `ALLOWED_ORIGINS` (comma-separated), permissive when unset.
fn cors_layer() -> CorsLayer {
    let origins = std::env::var("ALLOWED_ORIGINS").ok().map(|raw| {
        raw.split(',')
            .map(str::trim)
            .filter_map(|origin| origin.parse::<HeaderValue>().ok())
            .collect::<Vec<_>>()
    });

    match origins {
        Some(list) if !list.is_empty() => CorsLayer::new()
            .allow_origin(AllowOrigin::list(list))
            .allow_methods(Any)
            .allow_headers(Any),
        _ => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    }
}
