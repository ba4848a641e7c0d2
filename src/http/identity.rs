//! Identity resolution for handlers.
//!
//! There is no authentication layer yet: callers assert their own identity
//! via `owner_id`/`user_id` fields in bodies and paths. Every handler read
//! of a caller-supplied identity goes through this module, so swapping in a
//! verified identity source (auth middleware) later only changes these
//! functions.

/// The acting user for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i64,
}

/// Identity asserted by a request body field.
pub fn from_payload(user_id: i64) -> Identity {
    Identity { user_id }
}

/// Identity asserted by a path parameter.
pub fn from_path(user_id: i64) -> Identity {
    Identity { user_id }
}
