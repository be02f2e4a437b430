use std::sync::Arc;

use crate::auth::password::hash_password;
use crate::config::BootstrapConfig;
use crate::error::AppResult;
use crate::metrics::Metrics;
use crate::store::Store;
use crate::types::{
    BoxType, CreateLibraryResponse, ImportLibraryRecord, ImportReport, Library, NewUser, UserProfile,
    UserSummary,
};
use crate::validation::{Validator, MIN_PASSWORD_LENGTH};

/// Library and user management.
#[derive(Clone)]
pub struct AdminService {
    store: Arc<dyn Store>,
    bcrypt_cost: u32,
    metrics: Metrics,
}

impl AdminService {
    pub fn new(store: Arc<dyn Store>, bcrypt_cost: u32, metrics: Metrics) -> Self {
        Self { store, bcrypt_cost, metrics }
    }

    pub async fn list_libraries(&self) -> AppResult<Vec<Library>> {
        self.store.list_libraries().await
    }

    /// Creates a library with a zero count for every box type.
    pub async fn create_library(&self, name: &str) -> AppResult<CreateLibraryResponse> {
        Validator::new().not_blank("name", name).finish()?;
        let library = self.store.create_library(name.trim()).await?;
        self.metrics.inc_libraries_created();
        tracing::info!(library_id = library.id, name = %library.name, "Library created");
        Ok(CreateLibraryResponse { id: library.id, name: library.name })
    }

    pub async fn list_users(&self) -> AppResult<Vec<UserSummary>> {
        self.store.list_users().await
    }

    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
        library_id: i64,
        is_admin: bool,
    ) -> AppResult<UserSummary> {
        Validator::new()
            .not_blank("username", username)
            .min_chars("password", password, MIN_PASSWORD_LENGTH)
            .positive_id("library_id", library_id)
            .finish()?;

        let password_hash = hash_password(password, self.bcrypt_cost).await?;
        let user = self
            .store
            .insert_user(NewUser { username: username.trim().to_string(), password_hash, library_id, is_admin })
            .await?;
        self.metrics.inc_users_created();
        tracing::info!(user_id = user.id, library_id, is_admin, "User created");
        Ok(user.into())
    }

    /// Creates or updates libraries from location records and applies any
    /// quantities. Each record commits on its own, so a failure keeps the
    /// records before it.
    pub async fn import_libraries(
        &self,
        actor: &UserProfile,
        records: Vec<ImportLibraryRecord>,
    ) -> AppResult<ImportReport> {
        let mut report = ImportReport::default();

        for record in records {
            let name = record.name.trim();
            if name.is_empty() {
                report.skipped += 1;
                continue;
            }
            let Some(quantities) = parse_quantities(&record) else {
                tracing::warn!(name, "Skipping import record with invalid quantities");
                report.skipped += 1;
                continue;
            };

            let (library, created) =
                match self.store.import_library(name, &record.location, &quantities, actor.id).await {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        tracing::error!(
                            name,
                            created = report.created,
                            updated = report.updated,
                            skipped = report.skipped,
                            "Library import stopped; earlier records were committed: {}",
                            e
                        );
                        return Err(e);
                    }
                };
            if created {
                self.metrics.inc_libraries_created();
                report.created += 1;
            } else {
                report.updated += 1;
            }
            for _ in &quantities {
                self.metrics.inc_inventory_updates();
            }
            tracing::debug!(library_id = library.id, name, created, quantities = quantities.len(), "Library imported");
        }

        tracing::info!(
            created = report.created,
            updated = report.updated,
            skipped = report.skipped,
            "Library import finished"
        );
        Ok(report)
    }

    /// Makes sure the bootstrap admin and its library exist. An existing user
    /// with that name is left untouched.
    pub async fn ensure_bootstrap_admin(&self, cfg: &BootstrapConfig) -> AppResult<()> {
        if self.store.find_user_by_username(&cfg.admin_username).await?.is_some() {
            tracing::info!(username = %cfg.admin_username, "Admin user already exists");
            return Ok(());
        }

        let library = match self.store.find_library_by_name(&cfg.admin_library).await? {
            Some(library) => library,
            None => self.store.create_library(&cfg.admin_library).await?,
        };
        let password_hash = hash_password(&cfg.admin_password, self.bcrypt_cost).await?;
        self.store
            .insert_user(NewUser {
                username: cfg.admin_username.clone(),
                password_hash,
                library_id: library.id,
                is_admin: true,
            })
            .await?;
        tracing::info!(username = %cfg.admin_username, library_id = library.id, "Admin user created");
        Ok(())
    }
}

fn parse_quantities(record: &ImportLibraryRecord) -> Option<Vec<(BoxType, i64)>> {
    record
        .quantities
        .iter()
        .map(|(raw, quantity)| {
            let box_type = raw.parse::<BoxType>().ok()?;
            (*quantity >= 0).then_some((box_type, *quantity))
        })
        .collect()
}
