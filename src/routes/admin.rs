use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::middleware::AuthUser;
use crate::state::AppState;
use crate::types::{ImportLibraryRecord, ImportReport};
use crate::validation::AppJson;

pub async fn import_libraries(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    AppJson(records): AppJson<Vec<ImportLibraryRecord>>,
) -> AppResult<Json<ImportReport>> {
    Ok(Json(state.admin.import_libraries(&claims.profile(), records).await?))
}
