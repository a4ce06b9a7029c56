pub mod app;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod pending;
pub mod period;
pub mod popup;
pub mod stats;
pub mod storage;
pub mod table;
pub mod trend;
pub mod ui;
pub mod state;

pub use app::router;
pub use config::DashboardConfig;
pub use state::AppState;
pub use storage::load_store;
