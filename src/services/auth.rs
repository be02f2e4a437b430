use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::TokenService;
use crate::error::{AppError, AppResult};
use crate::metrics::Metrics;
use crate::store::Store;
use crate::types::{LoginResponse, UserProfile};
use crate::validation::{Validator, MIN_PASSWORD_LENGTH};

const INVALID_CREDENTIALS: &str = "Invalid credentials";
const WRONG_CURRENT_PASSWORD: &str = "Current password is incorrect";

/// Login and password changes.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn Store>,
    tokens: TokenService,
    bcrypt_cost: u32,
    metrics: Metrics,
    // Verified against when the username is unknown, so both failure paths cost one bcrypt check.
    dummy_hash: Arc<OnceCell<String>>,
}

impl AuthService {
    pub fn new(store: Arc<dyn Store>, tokens: TokenService, bcrypt_cost: u32, metrics: Metrics) -> Self {
        Self { store, tokens, bcrypt_cost, metrics, dummy_hash: Arc::new(OnceCell::new()) }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    pub async fn login(&self, username: &str, password: &str) -> AppResult<LoginResponse> {
        Validator::new()
            .not_blank("username", username)
            .not_blank("password", password)
            .finish()?;
        let username = username.trim();

        let user = self.store.find_user_by_username(username).await?;
        let verified = match &user {
            Some(user) => verify_password(password, &user.password_hash).await?,
            None => {
                let dummy = self
                    .dummy_hash
                    .get_or_try_init(|| hash_password("not-a-real-password", self.bcrypt_cost))
                    .await?;
                verify_password(password, dummy).await?;
                false
            }
        };

        let user = match user {
            Some(user) if verified => user,
            _ => {
                self.metrics.inc_logins_failed();
                tracing::info!(username, "Login rejected");
                return Err(AppError::InvalidCredentials(INVALID_CREDENTIALS.into()));
            }
        };

        let profile = UserProfile::from(&user);
        let token = self.tokens.issue(&profile)?;
        self.metrics.inc_logins_succeeded();
        tracing::info!(user_id = profile.id, library_id = profile.library_id, is_admin = profile.is_admin, "Login succeeded");
        Ok(LoginResponse { token, user: profile })
    }

    /// Re-verifies `current_password` before replacing the stored hash.
    pub async fn change_password(
        &self,
        user_id: i64,
        current_password: &str,
        new_password: &str,
    ) -> AppResult<()> {
        Validator::new()
            .not_blank("current_password", current_password)
            .min_chars("new_password", new_password, MIN_PASSWORD_LENGTH)
            .finish()?;

        let user = self
            .store
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::InvalidCredentials(WRONG_CURRENT_PASSWORD.into()))?;

        if !verify_password(current_password, &user.password_hash).await? {
            tracing::info!(user_id, "Password change rejected: wrong current password");
            return Err(AppError::InvalidCredentials(WRONG_CURRENT_PASSWORD.into()));
        }

        let new_hash = hash_password(new_password, self.bcrypt_cost).await?;
        self.store.update_password_hash(user_id, &new_hash).await?;
        tracing::info!(user_id, "Password changed");
        Ok(())
    }
}
