pub(crate) mod admin;
pub(crate) mod health;
pub(crate) mod keywords;
pub(crate) mod metrics;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::app::AppState;

pub(crate) fn router(state: AppState) -> Router {
    Router::new()
        .route("/health/ready", get(health::ready))
        .route("/health/live", get(health::live))
        .route("/metrics", get(metrics::exporter))
        .route("/admin/refresh", post(admin::trigger_refresh))
        .route("/api/trending_keywords", get(keywords::trending_keywords))
        .route(
            "/api/keywords_by_category",
            get(keywords::keywords_by_category),
        )
        .route("/api/keywords_by_time", get(keywords::keywords_by_time))
        .route("/api/top_10_keywords", get(keywords::top_keywords))
        .route("/api/top_keywords", get(keywords::top_keywords))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
