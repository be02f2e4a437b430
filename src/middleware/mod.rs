//! Middleware components for HTTP request processing.
//!
//! `auth` gates protected routes on a valid session token (and, for management
//! routes, the admin claim); `security_headers` decorates every response.

pub mod auth;
pub mod security_headers;

pub use auth::{require_admin, require_auth, AuthUser};
