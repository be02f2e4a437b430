//! Persistence boundary.
//!
//! Services talk to the database only through [`Store`]. The one implementation,
//! [`SqliteStore`], owns the connection pool; every method acquires a connection
//! (or a transaction) for its own duration and releases it on return.

mod sqlite;

pub use sqlite::SqliteStore;

use async_trait::async_trait;

use crate::error::AppResult;
use crate::types::{
    BoxInventory, BoxType, HistoryEntry, InventoryRow, Library, LibraryLocation, MapRow, NewUser,
    UserRecord, UserSummary,
};

/// Data access for libraries, users, inventory and the audit ledger.
#[async_trait]
pub trait Store: Send + Sync {
    /// Round-trips a trivial query; used by the readiness probe.
    async fn ping(&self) -> AppResult<()>;

    // ----- users -----

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<UserRecord>>;
    async fn find_user_by_id(&self, id: i64) -> AppResult<Option<UserRecord>>;
    async fn list_users(&self) -> AppResult<Vec<UserSummary>>;
    /// Inserts a user. Duplicate usernames fail with `Conflict`, unknown
    /// libraries with `InvalidInput`.
    async fn insert_user(&self, user: NewUser) -> AppResult<UserRecord>;
    async fn update_password_hash(&self, user_id: i64, password_hash: &str) -> AppResult<()>;

    // ----- libraries -----

    async fn list_libraries(&self) -> AppResult<Vec<Library>>;
    async fn find_library_by_name(&self, name: &str) -> AppResult<Option<Library>>;
    /// Inserts the library and its zero-quantity inventory rows in one transaction.
    async fn create_library(&self, name: &str) -> AppResult<Library>;
    /// Creates the library if the name is new, overwrites the location fields that
    /// are `Some` and records each quantity with a history row, all in one
    /// transaction. Returns the library and whether it was created.
    async fn import_library(
        &self,
        name: &str,
        location: &LibraryLocation,
        quantities: &[(BoxType, i64)],
        changed_by: i64,
    ) -> AppResult<(Library, bool)>;

    // ----- inventory -----

    async fn list_inventory(&self) -> AppResult<Vec<InventoryRow>>;
    async fn library_inventory(&self, library_id: i64) -> AppResult<Vec<BoxInventory>>;
    /// Upserts the quantity and appends the matching history row atomically.
    async fn record_inventory_change(
        &self,
        library_id: i64,
        box_type: BoxType,
        quantity: i64,
        changed_by: i64,
    ) -> AppResult<()>;
    async fn history(&self, library_id: Option<i64>, limit: i64) -> AppResult<Vec<HistoryEntry>>;
    async fn map_rows(&self) -> AppResult<Vec<MapRow>>;
    /// Quantity sums per box type across all libraries.
    async fn totals_by_type(&self) -> AppResult<Vec<(BoxType, i64)>>;
    async fn count_libraries_with_inventory(&self) -> AppResult<i64>;
}
