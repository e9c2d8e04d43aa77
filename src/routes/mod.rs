mod health;
mod metrics;
mod pages;
mod predict;
mod uploads;

use crate::server::SharedState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        .route("/", get(pages::index))
        .route("/home", get(pages::home))
        .route("/result", get(pages::result))
        .route("/predict", post(predict::predict))
        .route("/uploads/{filename}", get(uploads::serve_upload))
        .route("/health_check", get(health::healthcheck))
        .route("/metrics", get(metrics::metrics_handler))
}
