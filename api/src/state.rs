use std::sync::Arc;

use common::db::{DbPool, JuryStore};
use metrics_exporter_prometheus::PrometheusHandle;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn JuryStore>,
    /// Set when the store is backed by PostgreSQL
    pub db_pool: Option<DbPool>,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create a new AppState instance
    pub fn new(
        store: Arc<dyn JuryStore>,
        db_pool: Option<DbPool>,
        metrics: Option<PrometheusHandle>,
    ) -> Self {
        Self {
            store,
            db_pool,
            metrics,
        }
    }
}
