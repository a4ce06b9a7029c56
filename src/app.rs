use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/period", get(handlers::get_period))
        .route("/api/trend", get(handlers::get_trend))
        .route(
            "/api/sites/:site/metrics/:metric",
            get(handlers::get_series).post(handlers::record_point),
        )
        .route("/api/sites/:site/cards", get(handlers::get_cards))
        .route("/api/rows/query", post(handlers::query_rows))
        .route("/api/popup/placement", post(handlers::place_popup))
        .with_state(state)
}
