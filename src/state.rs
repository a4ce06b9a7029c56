use crate::config::DashboardConfig;
use crate::models::MetricsStore;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<DashboardConfig>,
    pub store: Arc<Mutex<MetricsStore>>,
}

impl AppState {
    pub fn new(config: DashboardConfig, store: MetricsStore) -> Self {
        Self {
            config: Arc::new(config),
            store: Arc::new(Mutex::new(store)),
        }
    }
}
