//! # Housing Rust Backend
//!
//! REST backend for a map-based campus housing search. It serves apartment
//! listings, university map markers, per-user favorites, and listing images
//! to the frontend, reading and writing tables owned by the legacy LIVIO
//! database for listings/users/favorites and owning the university and image
//! tables itself.
//!
//! ## Architecture
//!
//! - [`models`]: Domain entities as stored (legacy column semantics)
//! - [`db`]: Repository traits, in-memory and Postgres backends
//! - [`storage`]: Object store for listing image binaries
//! - [`http`]: Axum router, handlers, and the storage-to-wire mapping
//!
//! The wire contract differs deliberately from the storage shape: legacy
//! rows keep free-text fields ("Studio" bedrooms, comma-blob amenities) and
//! the shaping layer in [`http::dto`] normalizes them for the frontend.

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod db;
pub mod models;
pub mod storage;

#[cfg(feature = "http-server")]
pub mod http;
