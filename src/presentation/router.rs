use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::infrastructure::observability::request_id_middleware;
use crate::presentation::handlers::{
    health_handler, pending_files_handler, processed_files_handler, processing_state_handler,
    reset_processing_handler, start_processing_handler, stop_processing_handler,
    submit_document_handler, toggle_processing_handler,
};
use crate::presentation::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/health", get(health_handler))
        .route("/processing/state", get(processing_state_handler))
        .route("/processing/start", post(start_processing_handler))
        .route("/processing/stop", post(stop_processing_handler))
        .route("/processing/toggle", post(toggle_processing_handler))
        .route("/processing/reset", post(reset_processing_handler))
        .route("/files/processed", get(processed_files_handler))
        .route("/files/pending", get(pending_files_handler))
        .route("/documents", post(submit_document_handler))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(trace_layer)
        .layer(cors)
        .with_state(state)
}
