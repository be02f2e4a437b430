//! Application services. Handlers stay thin: they extract, call one service
//! method and serialize the result. Policy (validation, write scoping, hashing)
//! lives here, persistence behind [`crate::store::Store`].

pub mod admin;
pub mod auth;
pub mod inventory;

pub use admin::AdminService;
pub use auth::AuthService;
pub use inventory::InventoryService;
