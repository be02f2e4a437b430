use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::state::AppState;
use crate::types::{LoginRequest, LoginResponse};
use crate::validation::{AppJson, Validator};

pub async fn login(
    State(state): State<AppState>,
    AppJson(req): AppJson<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let mut v = Validator::new();
    let username = v.string("username", &req.username);
    let password = v.string("password", &req.password);
    v.finish()?;

    let response = state.auth.login(&username, &password).await?;
    Ok(Json(response))
}
