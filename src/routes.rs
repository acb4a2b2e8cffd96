use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::monitor::{
    get_daily_summary, get_dates, get_day_detail, get_latest, get_live, get_rate, health,
    set_rate,
};
use crate::services::MonitorService;

pub fn create_router(service: MonitorService) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/status/latest", get(get_latest))
        .route("/api/v1/status/live", get(get_live))
        .route("/api/v1/history/dates", get(get_dates))
        .route("/api/v1/history/:date", get(get_day_detail))
        .route("/api/v1/summary", get(get_daily_summary))
        .route("/api/v1/rate", get(get_rate).put(set_rate))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}
