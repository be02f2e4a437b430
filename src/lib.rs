//! # SRP Tracker Backend Library
//!
//! Tracks summer reading program boxes (Early Learning, Kids, Teens) across a
//! network of library branches. Librarians log in and adjust their branch's
//! counts; administrators manage branches and users and read cross-branch
//! aggregates for charts and the map.
//!
//! ## Architecture
//!
//! - **Axum**: HTTP server, routing and middleware
//! - **SQLx**: asynchronous SQLite access behind the [`store::Store`] trait
//! - **jsonwebtoken / bcrypt**: session tokens and password hashes
//!
//! ## Core Components
//!
//! - [`config`]: layered configuration (embedded defaults, file, environment)
//! - [`db`]: connection pool and idempotent schema creation
//! - [`store`]: persistence boundary and its SQLite implementation
//! - [`services`]: login, inventory updates with audit trail, administration
//! - [`auth`]: password hashing and token signing
//! - [`middleware`]: token and admin gates, security headers
//! - [`routes`]: HTTP handlers and the router
//! - [`error`]: error taxonomy and JSON error envelope
//! - [`validation`]: request field checks and extractors
//! - [`metrics`]: process-local counters
//! - [`state`]: shared application state
//! - [`types`]: rows and request/response bodies

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
pub mod types;
pub mod validation;

#[cfg(test)]
mod tests;
