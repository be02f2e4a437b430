use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::AuthConfig;
use crate::error::{AppError, AppResult};
use crate::types::UserProfile;

/// Session token payload. Mirrors [`UserProfile`] plus issue/expiry times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub id: i64,
    pub username: String,
    pub library_id: i64,
    pub library_name: String,
    pub is_admin: bool,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            username: self.username.clone(),
            library_id: self.library_id,
            library_name: self.library_name.clone(),
            is_admin: self.is_admin,
        }
    }
}

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

/// Issues and verifies HS256 session tokens.
#[derive(Clone)]
pub struct TokenService {
    keys: Arc<Keys>,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            keys: Arc::new(Keys {
                encoding: EncodingKey::from_secret(secret),
                decoding: DecodingKey::from_secret(secret),
            }),
            ttl,
        }
    }

    pub fn from_config(cfg: &AuthConfig) -> Self {
        Self::new(cfg.jwt_secret.as_bytes(), Duration::hours(cfg.token_ttl_hours))
    }

    pub fn issue(&self, user: &UserProfile) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            id: user.id,
            username: user.username.clone(),
            library_id: user.library_id,
            library_name: user.library_name.clone(),
            is_admin: user.is_admin,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        self.sign(&claims)
    }

    pub fn sign(&self, claims: &Claims) -> AppResult<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.keys.encoding)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("token signing failed: {}", e)))
    }

    /// Checks signature and expiry; any failure is `Unauthenticated`.
    pub fn verify(&self, token: &str) -> AppResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);
        decode::<Claims>(token, &self.keys.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("Rejected session token: {}", e);
                AppError::Unauthenticated("Invalid or expired token".into())
            })
    }
}
