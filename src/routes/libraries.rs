use axum::{extract::State, http::StatusCode, Json};

use crate::error::AppResult;
use crate::state::AppState;
use crate::types::{CreateLibraryRequest, CreateLibraryResponse, Library};
use crate::validation::{AppJson, Validator};

pub async fn list_libraries(State(state): State<AppState>) -> AppResult<Json<Vec<Library>>> {
    Ok(Json(state.admin.list_libraries().await?))
}

pub async fn create_library(
    State(state): State<AppState>,
    AppJson(req): AppJson<CreateLibraryRequest>,
) -> AppResult<(StatusCode, Json<CreateLibraryResponse>)> {
    let mut v = Validator::new();
    let name = v.string("name", &req.name);
    v.finish()?;

    let created = state.admin.create_library(&name).await?;
    Ok((StatusCode::CREATED, Json(created)))
}
