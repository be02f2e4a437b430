use axum::{extract::State, http::StatusCode, Json};

use crate::error::AppResult;
use crate::middleware::AuthUser;
use crate::state::AppState;
use crate::types::{ChangePasswordRequest, CreateUserRequest, MessageResponse, UserSummary};
use crate::validation::{AppJson, Validator};

pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<UserSummary>>> {
    Ok(Json(state.admin.list_users().await?))
}

pub async fn create_user(
    State(state): State<AppState>,
    AppJson(req): AppJson<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<UserSummary>)> {
    let mut v = Validator::new();
    let username = v.string("username", &req.username);
    let password = v.string("password", &req.password);
    let library_id = v.integer("library_id", &req.library_id);
    let is_admin = v.flag("is_admin", &req.is_admin);
    v.finish()?;

    let user = state.admin.create_user(&username, &password, library_id, is_admin).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn change_password(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    AppJson(req): AppJson<ChangePasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    let mut v = Validator::new();
    let current = v.string("current_password", &req.current_password);
    let new = v.string("new_password", &req.new_password);
    v.finish()?;

    state.auth.change_password(claims.id, &current, &new).await?;
    Ok(Json(MessageResponse::new("Password changed successfully")))
}
