use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::metrics::Metrics;
use crate::store::Store;
use crate::types::{
    BoxInventory, BoxType, HistoryEntry, InventoryRow, InventorySummary, MapEntry, MapRow, UserProfile,
};
use crate::validation::Validator;

/// Maximum number of rows returned by the history feed.
pub const HISTORY_LIMIT: i64 = 100;

/// The write an `update` call resolved to, after scoping and validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InventoryChange {
    pub library_id: i64,
    pub box_type: BoxType,
    pub quantity: i64,
}

#[derive(Clone)]
pub struct InventoryService {
    store: Arc<dyn Store>,
    metrics: Metrics,
}

impl InventoryService {
    pub fn new(store: Arc<dyn Store>, metrics: Metrics) -> Self {
        Self { store, metrics }
    }

    pub async fn list_all(&self) -> AppResult<Vec<InventoryRow>> {
        self.store.list_inventory().await
    }

    pub async fn list_for_library(&self, library_id: i64) -> AppResult<Vec<BoxInventory>> {
        self.store.library_inventory(library_id).await
    }

    /// Sets one box count and records it in the history ledger.
    ///
    /// Non-admins always write to their own library; the requested library id is
    /// only honored for admins.
    pub async fn update(
        &self,
        actor: &UserProfile,
        requested_library_id: Option<i64>,
        box_type: &str,
        quantity: i64,
    ) -> AppResult<InventoryChange> {
        let mut validator = Validator::new();
        let parsed = box_type.parse::<BoxType>();
        if let Err(e) = &parsed {
            validator.push("box_type", e.to_string());
        }
        validator.non_negative("quantity", quantity).finish()?;
        let box_type = parsed.map_err(|e| AppError::InvalidInput(e.to_string()))?;

        let library_id = if actor.is_admin { requested_library_id } else { Some(actor.library_id) };
        let library_id = match library_id {
            Some(id) if id > 0 => id,
            _ => return Err(AppError::InvalidInput("Invalid library ID".into())),
        };
        if !actor.is_admin && requested_library_id.is_some_and(|id| id != library_id) {
            tracing::warn!(
                user_id = actor.id,
                requested = requested_library_id,
                library_id,
                "Non-admin update redirected to own library"
            );
        }

        self.store.record_inventory_change(library_id, box_type, quantity, actor.id).await?;
        self.metrics.inc_inventory_updates();
        tracing::info!(
            changed_by = actor.id,
            library_id,
            box_type = %box_type,
            quantity,
            "Inventory updated"
        );
        Ok(InventoryChange { library_id, box_type, quantity })
    }

    pub async fn history(&self, library_id: Option<i64>) -> AppResult<Vec<HistoryEntry>> {
        self.store.history(library_id, HISTORY_LIMIT).await
    }

    /// Libraries with coordinates, each with per-type counts and a total.
    /// A library without inventory rows still appears, with an empty map.
    pub async fn map_snapshot(&self) -> AppResult<Vec<MapEntry>> {
        let rows = self.store.map_rows().await?;
        Ok(group_map_rows(rows))
    }

    pub async fn summary(&self) -> AppResult<InventorySummary> {
        let mut by_type: BTreeMap<BoxType, i64> = BoxType::ALL.iter().map(|t| (*t, 0)).collect();
        for (box_type, total) in self.store.totals_by_type().await? {
            by_type.insert(box_type, total);
        }
        Ok(InventorySummary {
            libraries: self.store.count_libraries_with_inventory().await?,
            total_boxes: by_type.values().sum(),
            by_type,
        })
    }
}

/// Folds left-joined rows (ordered by library) into one entry per library.
pub fn group_map_rows(rows: Vec<MapRow>) -> Vec<MapEntry> {
    let mut entries: Vec<MapEntry> = Vec::new();
    for row in rows {
        let same_library = entries.last().is_some_and(|e| e.library_id == row.library_id);
        if !same_library {
            entries.push(MapEntry {
                library_id: row.library_id,
                library_name: row.library_name.clone(),
                latitude: row.latitude,
                longitude: row.longitude,
                address: row.address.clone(),
                inventory: BTreeMap::new(),
                total_boxes: 0,
            });
        }
        let Some(entry) = entries.last_mut() else { continue };
        if let (Some(raw), Some(quantity)) = (row.box_type.as_deref(), row.quantity) {
            match raw.parse::<BoxType>() {
                Ok(box_type) => {
                    entry.inventory.insert(box_type, quantity);
                    entry.total_boxes += quantity;
                }
                Err(e) => tracing::warn!(library_id = row.library_id, "Skipping map row: {}", e),
            }
        }
    }
    entries
}
