use std::sync::Arc;

use crate::auth::TokenService;
use crate::config::AppConfig;
use crate::metrics::Metrics;
use crate::services::{AdminService, AuthService, InventoryService};
use crate::store::Store;

/// The shared application state.
///
/// Cheap to clone: every field is a handle around `Arc`s. The store is the only
/// resource shared between requests; there is no other mutable state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<AppConfig>,
    pub metrics: Metrics,
    pub tokens: TokenService,
    pub auth: AuthService,
    pub inventory: InventoryService,
    pub admin: AdminService,
}

impl AppState {
    /// Wires every service to the given store.
    pub fn new(store: Arc<dyn Store>, config: AppConfig) -> Self {
        let metrics = Metrics::new();
        let tokens = TokenService::from_config(&config.auth);
        let cost = config.auth.bcrypt_cost;

        let auth = AuthService::new(store.clone(), tokens.clone(), cost, metrics.clone());
        let inventory = InventoryService::new(store.clone(), metrics.clone());
        let admin = AdminService::new(store.clone(), cost, metrics.clone());

        Self { store, config: Arc::new(config), metrics, tokens, auth, inventory, admin }
    }
}
