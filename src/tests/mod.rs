//! Tests for the SRP tracker backend.
//!
//! Every test gets its own temporary SQLite file through [`common::TestApp`].
//!
//! - **db_tests**: schema creation, constraints and the `updated_at` trigger
//! - **auth_tests**: login, token handling and password changes
//! - **inventory_tests**: updates with audit trail, history, map and summary
//! - **admin_tests**: library/user management, import and bootstrap seeding
//! - **api_tests**: the HTTP surface end to end through the router
//! - **config_tests**: configuration defaults and validation
//! - **error_tests**: status codes and the JSON error envelope
//! - **types_tests**: box type parsing and serialization

pub mod common;

pub mod admin_tests;
pub mod config_tests;
pub mod error_tests;
pub mod types_tests;
