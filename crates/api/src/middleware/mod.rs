//! Request extractors.
//!
//! - [`auth::AuthUser`] -- the caller identified by a bearer access token.

pub mod auth;
