use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;

use crate::config::DatabaseConfig;

/// Opens the connection pool. Foreign keys are enforced on every connection.
pub async fn connect(cfg: &DatabaseConfig) -> anyhow::Result<SqlitePool> {
    let opts = SqliteConnectOptions::from_str(&cfg.url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(10));

    let pool = SqlitePoolOptions::new()
        .max_connections(cfg.max_connections)
        .connect_with(opts)
        .await?;
    Ok(pool)
}

/// Creates tables, the `updated_at` trigger and indexes. Safe to run on every start.
pub async fn init_db(pool: &SqlitePool) -> anyhow::Result<()> {
    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS libraries (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT UNIQUE NOT NULL,
            short_name TEXT NULL,
            address TEXT NULL,
            latitude REAL NULL,
            longitude REAL NULL,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now'))
        )"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT UNIQUE NOT NULL,
            password_hash TEXT NOT NULL,
            library_id INTEGER NOT NULL,
            is_admin INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now')),
            FOREIGN KEY(library_id) REFERENCES libraries(id)
        )"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS box_inventory (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            library_id INTEGER NOT NULL,
            box_type TEXT NOT NULL CHECK(box_type IN ('EL', 'Kids', 'Teens')),
            quantity INTEGER NOT NULL DEFAULT 0 CHECK(quantity >= 0),
            updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now')),
            FOREIGN KEY(library_id) REFERENCES libraries(id),
            UNIQUE(library_id, box_type)
        )"#,
    )
    .execute(pool)
    .await?;

    // Append-only; never updated or deleted by the application.
    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS inventory_history (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            library_id INTEGER NOT NULL,
            box_type TEXT NOT NULL CHECK(box_type IN ('EL', 'Kids', 'Teens')),
            quantity INTEGER NOT NULL,
            changed_by INTEGER NOT NULL,
            change_date TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now')),
            FOREIGN KEY(library_id) REFERENCES libraries(id),
            FOREIGN KEY(changed_by) REFERENCES users(id)
        )"#,
    )
    .execute(pool)
    .await?;

    // Writers that change quantity without touching updated_at still refresh it.
    sqlx::query(
        r#"CREATE TRIGGER IF NOT EXISTS box_inventory_touch_updated_at
            AFTER UPDATE OF quantity ON box_inventory
            FOR EACH ROW WHEN NEW.updated_at IS OLD.updated_at
            BEGIN
                UPDATE box_inventory
                SET updated_at = strftime('%Y-%m-%dT%H:%M:%fZ','now')
                WHERE id = NEW.id;
            END"#,
    )
    .execute(pool)
    .await?;

    let indexes = [
        ("idx_users_library", "CREATE INDEX IF NOT EXISTS idx_users_library ON users(library_id)"),
        (
            "idx_history_library_date",
            "CREATE INDEX IF NOT EXISTS idx_history_library_date ON inventory_history(library_id, change_date DESC)",
        ),
        (
            "idx_history_date",
            "CREATE INDEX IF NOT EXISTS idx_history_date ON inventory_history(change_date DESC)",
        ),
    ];
    for (name, query) in indexes {
        if let Err(e) = sqlx::query(query).execute(pool).await {
            tracing::warn!("Failed to create index {}: {}", name, e);
        }
    }

    Ok(())
}
