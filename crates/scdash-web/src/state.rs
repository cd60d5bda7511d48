//! Shared, read-only server state

use scdash_core::{DashboardConfig, MetricsTable};
use std::sync::Arc;

/// Loaded once at startup and shared by every request
#[derive(Debug, Clone)]
pub struct AppState {
    pub table: Arc<MetricsTable>,
    pub config: DashboardConfig,
}

impl AppState {
    pub fn new(table: Arc<MetricsTable>, config: DashboardConfig) -> Self {
        Self { table, config }
    }

    pub fn with_defaults(table: MetricsTable) -> Self {
        Self::new(Arc::new(table), DashboardConfig::default())
    }
}
