use std::sync::Arc;

use tempfile::NamedTempFile;

use crate::config::AppConfig;
use crate::db;
use crate::state::AppState;
use crate::store::SqliteStore;
use crate::types::{UserProfile, UserSummary};

pub const TEST_SECRET: &str = "test-secret-for-srp-tracker-unit-tests";

/// An application wired to a throwaway database. Keep it alive for the whole test.
pub struct TestApp {
    pub state: AppState,
    pub store: Arc<SqliteStore>,
    _db_file: NamedTempFile,
}

pub fn test_config(db_url: String) -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.database.url = db_url;
    cfg.database.max_connections = 4;
    cfg.auth.jwt_secret = TEST_SECRET.to_string();
    cfg.auth.bcrypt_cost = 4;
    cfg.bootstrap.admin_password = "bootstrap-pass".to_string();
    cfg
}

impl TestApp {
    pub async fn new() -> Self {
        let db_file = NamedTempFile::new().unwrap();
        let cfg = test_config(format!("sqlite://{}", db_file.path().display()));

        let pool = db::connect(&cfg.database).await.unwrap();
        db::init_db(&pool).await.unwrap();

        let store = Arc::new(SqliteStore::new(pool));
        let state = AppState::new(store.clone(), cfg);
        Self { state, store, _db_file: db_file }
    }

    pub fn pool(&self) -> &sqlx::SqlitePool {
        self.store.pool()
    }

    pub async fn library(&self, name: &str) -> i64 {
        self.state.admin.create_library(name).await.unwrap().id
    }

    pub async fn user(&self, username: &str, password: &str, library_id: i64, is_admin: bool) -> UserProfile {
        let created: UserSummary =
            self.state.admin.create_user(username, password, library_id, is_admin).await.unwrap();
        UserProfile {
            id: created.id,
            username: created.username,
            library_id: created.library_id,
            library_name: created.library_name,
            is_admin: created.is_admin,
        }
    }

    /// Returns a session token for a freshly created user.
    pub async fn token_for(&self, username: &str, library_id: i64, is_admin: bool) -> String {
        let profile = self.user(username, "secret123", library_id, is_admin).await;
        self.state.tokens.issue(&profile).unwrap()
    }

    pub async fn history_count(&self, library_id: i64) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM inventory_history WHERE library_id = ?1")
            .bind(library_id)
            .fetch_one(self.pool())
            .await
            .unwrap()
    }
}
