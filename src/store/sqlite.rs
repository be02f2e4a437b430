use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use sqlx::{Row, SqliteConnection, SqlitePool};

use super::Store;
use crate::error::{is_foreign_key_violation, is_unique_violation, AppError, AppResult};
use crate::types::{
    BoxInventory, BoxType, HistoryEntry, InventoryRow, Library, LibraryLocation, MapRow, NewUser,
    UserRecord, UserSummary,
};

const USER_SELECT: &str = r#"SELECT u.id, u.username, u.password_hash, u.library_id,
        l.name AS library_name, u.is_admin, u.created_at
    FROM users u
    JOIN libraries l ON u.library_id = l.id"#;

const LIBRARY_COLUMNS: &str = "id, name, short_name, address, latitude, longitude, created_at";

// Same shape as the `strftime('%Y-%m-%dT%H:%M:%fZ')` column defaults so text ordering holds.
fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// SQLite-backed [`Store`].
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(&format!("{USER_SELECT} WHERE u.username = ?1"))
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_id(&self, id: i64) -> AppResult<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(&format!("{USER_SELECT} WHERE u.id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn list_users(&self) -> AppResult<Vec<UserSummary>> {
        let users = sqlx::query_as::<_, UserSummary>(
            r#"SELECT u.id, u.username, u.library_id, l.name AS library_name, u.is_admin, u.created_at
               FROM users u
               JOIN libraries l ON u.library_id = l.id
               ORDER BY u.username"#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn insert_user(&self, user: NewUser) -> AppResult<UserRecord> {
        // The insert comes first so the transaction starts as a writer and waits on the busy timeout.
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            "INSERT INTO users (username, password_hash, library_id, is_admin) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.library_id)
        .bind(user.is_admin)
        .execute(&mut *tx)
        .await;
        let id = match inserted {
            Ok(done) => done.last_insert_rowid(),
            Err(e) if is_unique_violation(&e) => {
                return Err(AppError::Conflict("Username already exists".into()));
            }
            Err(e) if is_foreign_key_violation(&e) => {
                return Err(AppError::InvalidInput(format!("Library {} does not exist", user.library_id)));
            }
            Err(e) => return Err(e.into()),
        };

        let record = sqlx::query_as::<_, UserRecord>(&format!("{USER_SELECT} WHERE u.id = ?1"))
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(record)
    }

    async fn update_password_hash(&self, user_id: i64, password_hash: &str) -> AppResult<()> {
        sqlx::query("UPDATE users SET password_hash = ?1 WHERE id = ?2")
            .bind(password_hash)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_libraries(&self) -> AppResult<Vec<Library>> {
        let libraries =
            sqlx::query_as::<_, Library>(&format!("SELECT {LIBRARY_COLUMNS} FROM libraries ORDER BY name"))
                .fetch_all(&self.pool)
                .await?;
        Ok(libraries)
    }

    async fn find_library_by_name(&self, name: &str) -> AppResult<Option<Library>> {
        let library =
            sqlx::query_as::<_, Library>(&format!("SELECT {LIBRARY_COLUMNS} FROM libraries WHERE name = ?1"))
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;
        Ok(library)
    }

    async fn create_library(&self, name: &str) -> AppResult<Library> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query("INSERT INTO libraries (name) VALUES (?1)")
            .bind(name)
            .execute(&mut *tx)
            .await;
        let id = match inserted {
            Ok(done) => done.last_insert_rowid(),
            Err(e) if is_unique_violation(&e) => {
                return Err(AppError::Conflict("Library already exists".into()));
            }
            Err(e) => return Err(e.into()),
        };

        seed_inventory(&mut tx, id).await?;

        let library =
            sqlx::query_as::<_, Library>(&format!("SELECT {LIBRARY_COLUMNS} FROM libraries WHERE id = ?1"))
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
        tx.commit().await?;
        Ok(library)
    }

    async fn import_library(
        &self,
        name: &str,
        location: &LibraryLocation,
        quantities: &[(BoxType, i64)],
        changed_by: i64,
    ) -> AppResult<(Library, bool)> {
        let now = now_timestamp();
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query("INSERT INTO libraries (name) VALUES (?1) ON CONFLICT(name) DO NOTHING")
            .bind(name)
            .execute(&mut *tx)
            .await?
            .rows_affected()
            == 1;
        let id: i64 = sqlx::query_scalar("SELECT id FROM libraries WHERE name = ?1")
            .bind(name)
            .fetch_one(&mut *tx)
            .await?;
        if created {
            seed_inventory(&mut tx, id).await?;
        }

        sqlx::query(
            r#"UPDATE libraries SET
                short_name = COALESCE(?1, short_name),
                address = COALESCE(?2, address),
                latitude = COALESCE(?3, latitude),
                longitude = COALESCE(?4, longitude)
               WHERE id = ?5"#,
        )
        .bind(&location.short_name)
        .bind(&location.address)
        .bind(location.latitude)
        .bind(location.longitude)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        for (box_type, quantity) in quantities {
            upsert_quantity(&mut tx, id, *box_type, *quantity, &now).await?;
            append_history(&mut tx, id, *box_type, *quantity, changed_by, &now).await?;
        }

        let library =
            sqlx::query_as::<_, Library>(&format!("SELECT {LIBRARY_COLUMNS} FROM libraries WHERE id = ?1"))
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
        tx.commit().await?;
        Ok((library, created))
    }

    async fn list_inventory(&self) -> AppResult<Vec<InventoryRow>> {
        let rows = sqlx::query_as::<_, InventoryRow>(
            r#"SELECT bi.id, bi.library_id, bi.box_type, bi.quantity, bi.updated_at,
                    l.name AS library_name, l.latitude, l.longitude, l.address
               FROM box_inventory bi
               JOIN libraries l ON bi.library_id = l.id
               ORDER BY l.name, bi.box_type"#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn library_inventory(&self, library_id: i64) -> AppResult<Vec<BoxInventory>> {
        let rows = sqlx::query_as::<_, BoxInventory>(
            r#"SELECT id, library_id, box_type, quantity, updated_at
               FROM box_inventory
               WHERE library_id = ?1
               ORDER BY box_type"#,
        )
        .bind(library_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn record_inventory_change(
        &self,
        library_id: i64,
        box_type: BoxType,
        quantity: i64,
        changed_by: i64,
    ) -> AppResult<()> {
        let now = now_timestamp();
        // Dropping `tx` on any early return rolls back both writes. The upsert is the
        // first statement so concurrent writers queue on the busy timeout instead of
        // failing to upgrade a read snapshot.
        let mut tx = self.pool.begin().await?;

        match upsert_quantity(&mut tx, library_id, box_type, quantity, &now).await {
            Ok(()) => {}
            Err(e) if is_foreign_key_violation(&e) => {
                return Err(AppError::InvalidInput(format!("Library {} does not exist", library_id)));
            }
            Err(e) => return Err(e.into()),
        }
        append_history(&mut tx, library_id, box_type, quantity, changed_by, &now).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn history(&self, library_id: Option<i64>, limit: i64) -> AppResult<Vec<HistoryEntry>> {
        let mut sql = String::from(
            r#"SELECT ih.id, ih.library_id, ih.box_type, ih.quantity, ih.changed_by, ih.change_date,
                    l.name AS library_name, u.username AS changed_by_user
               FROM inventory_history ih
               JOIN libraries l ON ih.library_id = l.id
               JOIN users u ON ih.changed_by = u.id"#,
        );
        if library_id.is_some() {
            sql.push_str(" WHERE ih.library_id = ?1 ORDER BY ih.change_date DESC, ih.id DESC LIMIT ?2");
        } else {
            sql.push_str(" ORDER BY ih.change_date DESC, ih.id DESC LIMIT ?1");
        }

        let mut query = sqlx::query_as::<_, HistoryEntry>(&sql);
        if let Some(id) = library_id {
            query = query.bind(id);
        }
        let rows = query.bind(limit).fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn map_rows(&self) -> AppResult<Vec<MapRow>> {
        let rows = sqlx::query_as::<_, MapRow>(
            r#"SELECT l.id AS library_id, l.name AS library_name, l.latitude, l.longitude, l.address,
                    bi.box_type, bi.quantity
               FROM libraries l
               LEFT JOIN box_inventory bi ON l.id = bi.library_id
               WHERE l.latitude IS NOT NULL AND l.longitude IS NOT NULL
               ORDER BY l.name, l.id, bi.box_type"#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn totals_by_type(&self) -> AppResult<Vec<(BoxType, i64)>> {
        let rows = sqlx::query(
            r#"SELECT box_type, COALESCE(SUM(quantity), 0) AS total
               FROM box_inventory
               GROUP BY box_type
               ORDER BY box_type"#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut totals = Vec::with_capacity(rows.len());
        for row in rows {
            let raw: String = row.try_get("box_type")?;
            let box_type = raw
                .parse::<BoxType>()
                .map_err(|e| AppError::Internal(anyhow::anyhow!("corrupt inventory row: {}", e)))?;
            totals.push((box_type, row.try_get::<i64, _>("total")?));
        }
        Ok(totals)
    }

    async fn count_libraries_with_inventory(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(DISTINCT library_id) FROM box_inventory")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

async fn seed_inventory(conn: &mut SqliteConnection, library_id: i64) -> sqlx::Result<()> {
    for box_type in BoxType::ALL {
        sqlx::query("INSERT INTO box_inventory (library_id, box_type, quantity) VALUES (?1, ?2, 0)")
            .bind(library_id)
            .bind(box_type.as_str())
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

async fn upsert_quantity(
    conn: &mut SqliteConnection,
    library_id: i64,
    box_type: BoxType,
    quantity: i64,
    now: &str,
) -> sqlx::Result<()> {
    sqlx::query(
        r#"INSERT INTO box_inventory (library_id, box_type, quantity, updated_at)
           VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT(library_id, box_type)
           DO UPDATE SET quantity = excluded.quantity, updated_at = excluded.updated_at"#,
    )
    .bind(library_id)
    .bind(box_type.as_str())
    .bind(quantity)
    .bind(now)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn append_history(
    conn: &mut SqliteConnection,
    library_id: i64,
    box_type: BoxType,
    quantity: i64,
    changed_by: i64,
    now: &str,
) -> sqlx::Result<()> {
    sqlx::query(
        r#"INSERT INTO inventory_history (library_id, box_type, quantity, changed_by, change_date)
           VALUES (?1, ?2, ?3, ?4, ?5)"#,
    )
    .bind(library_id)
    .bind(box_type.as_str())
    .bind(quantity)
    .bind(changed_by)
    .bind(now)
    .execute(&mut *conn)
    .await?;
    Ok(())
}
