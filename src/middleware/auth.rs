use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::auth::Claims;
use crate::error::AppError;
use crate::state::AppState;

/// Validates the `Authorization: Bearer <token>` header and stores the decoded
/// [`Claims`] in the request extensions for downstream handlers.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&req)
        .ok_or_else(|| AppError::Unauthenticated("Access token required".into()))?;
    let claims = state.tokens.verify(token)?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Rejects requests whose token lacks the admin claim. Must run after [`require_auth`].
pub async fn require_admin(req: Request, next: Next) -> Result<Response, AppError> {
    match req.extensions().get::<Claims>() {
        Some(claims) if claims.is_admin => Ok(next.run(req).await),
        Some(claims) => {
            tracing::info!(user_id = claims.id, path = %req.uri().path(), "Admin route refused");
            Err(AppError::Forbidden("Admin access required".into()))
        }
        None => Err(AppError::Unauthenticated("Access token required".into())),
    }
}

fn bearer_token(req: &Request) -> Option<&str> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Extractor for the authenticated caller's claims.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| AppError::Unauthenticated("Access token required".into()))
    }
}
