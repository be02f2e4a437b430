use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Process-local counters for monitoring
#[derive(Clone)]
pub struct Metrics {
    pub logins_succeeded: Arc<AtomicU64>,
    pub logins_failed: Arc<AtomicU64>,
    pub inventory_updates: Arc<AtomicU64>,
    pub libraries_created: Arc<AtomicU64>,
    pub users_created: Arc<AtomicU64>,
    pub start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            logins_succeeded: Arc::new(AtomicU64::new(0)),
            logins_failed: Arc::new(AtomicU64::new(0)),
            inventory_updates: Arc::new(AtomicU64::new(0)),
            libraries_created: Arc::new(AtomicU64::new(0)),
            users_created: Arc::new(AtomicU64::new(0)),
            start_time: Instant::now(),
        }
    }

    pub fn inc_logins_succeeded(&self) {
        self.logins_succeeded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_logins_failed(&self) {
        self.logins_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_inventory_updates(&self) {
        self.inventory_updates.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_libraries_created(&self) {
        self.libraries_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_users_created(&self) {
        self.users_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            logins_succeeded: self.logins_succeeded.load(Ordering::Relaxed),
            logins_failed: self.logins_failed.load(Ordering::Relaxed),
            inventory_updates: self.inventory_updates.load(Ordering::Relaxed),
            libraries_created: self.libraries_created.load(Ordering::Relaxed),
            users_created: self.users_created.load(Ordering::Relaxed),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub logins_succeeded: u64,
    pub logins_failed: u64,
    pub inventory_updates: u64,
    pub libraries_created: u64,
    pub users_created: u64,
    pub uptime_seconds: u64,
}
