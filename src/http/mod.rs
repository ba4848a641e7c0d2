//! HTTP API layer.
//!
//! Axum-based REST surface over the repository and object store. Routes are
//! assembled in [`router`], request/response shaping lives in [`dto`], and
//! handler-facing errors in [`error`].

pub mod dto;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod identity;
pub mod router;
pub mod state;

pub use error::{ApiError, AppError};
pub use router::create_router;
pub use state::AppState;
