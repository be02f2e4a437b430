//! Credential primitives: bcrypt password hashing and signed session tokens.

pub mod password;
pub mod token;

pub use token::{Claims, TokenService};
