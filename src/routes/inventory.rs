use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::middleware::AuthUser;
use crate::state::AppState;
use crate::types::{
    BoxInventory, HistoryEntry, InventoryRow, InventorySummary, MapEntry, MessageResponse,
    UpdateInventoryRequest,
};
use crate::validation::{AppJson, AppPath, Validator};

pub async fn list_all(State(state): State<AppState>) -> AppResult<Json<Vec<InventoryRow>>> {
    Ok(Json(state.inventory.list_all().await?))
}

pub async fn list_for_library(
    State(state): State<AppState>,
    AppPath(library_id): AppPath<i64>,
) -> AppResult<Json<Vec<BoxInventory>>> {
    Ok(Json(state.inventory.list_for_library(library_id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    AppJson(req): AppJson<UpdateInventoryRequest>,
) -> AppResult<Json<MessageResponse>> {
    let mut v = Validator::new();
    let library_id = v.optional_integer("library_id", &req.library_id);
    let box_type = v.string("box_type", &req.box_type);
    let quantity = v.integer("quantity", &req.quantity);
    v.finish()?;

    state.inventory.update(&claims.profile(), library_id, &box_type, quantity).await?;
    Ok(Json(MessageResponse::new("Inventory updated successfully")))
}

pub async fn history_all(State(state): State<AppState>) -> AppResult<Json<Vec<HistoryEntry>>> {
    Ok(Json(state.inventory.history(None).await?))
}

pub async fn history_for_library(
    State(state): State<AppState>,
    AppPath(library_id): AppPath<i64>,
) -> AppResult<Json<Vec<HistoryEntry>>> {
    Ok(Json(state.inventory.history(Some(library_id)).await?))
}

pub async fn map(State(state): State<AppState>) -> AppResult<Json<Vec<MapEntry>>> {
    Ok(Json(state.inventory.map_snapshot().await?))
}

pub async fn summary(State(state): State<AppState>) -> AppResult<Json<InventorySummary>> {
    Ok(Json(state.inventory.summary().await?))
}
