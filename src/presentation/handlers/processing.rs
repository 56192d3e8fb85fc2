use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;

use crate::domain::{ConsumerStatus, ProcessingStatusLabel};
use crate::presentation::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingStateResponse {
    pub enabled: bool,
    pub status: ProcessingStatusLabel,
    pub consumer_status: ConsumerStatus,
    pub binding_state: String,
    pub last_changed: String,
    pub last_change_reason: String,
    pub files_processed: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionResponse {
    pub success: bool,
    pub state_changed: bool,
    pub enabled: bool,
    pub status: ProcessingStatusLabel,
    pub consumer_status: ConsumerStatus,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleResponse {
    pub success: bool,
    pub action: &'static str,
    pub previous_state: ProcessingStatusLabel,
    pub current_state: ProcessingStatusLabel,
    pub consumer_status: ConsumerStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetResponse {
    pub success: bool,
    pub state_changed: bool,
    pub enabled: bool,
    pub status: ProcessingStatusLabel,
    pub consumer_status: ConsumerStatus,
    pub records_cleared: usize,
    pub hdfs_cleared: bool,
    pub directory_recreated: bool,
    pub message: String,
}

#[tracing::instrument(skip(state))]
pub async fn processing_state_handler(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.control.state();
    let binding_state = state.consumption.status().await;
    let running = state.consumption.is_running().await;

    let response = ProcessingStateResponse {
        enabled: snapshot.enabled,
        status: snapshot.status(),
        consumer_status: ConsumerStatus::from_running(running),
        binding_state,
        last_changed: snapshot.last_changed.to_rfc3339(),
        last_change_reason: snapshot.last_change_reason,
        files_processed: state.ledger.completed_count(),
    };

    (StatusCode::OK, Json(response))
}

#[tracing::instrument(skip(state))]
pub async fn start_processing_handler(State(state): State<AppState>) -> impl IntoResponse {
    let changed = state.control.start().await;
    let message = if changed {
        "Processing started"
    } else {
        "Processing already started"
    };
    transition_response(&state, changed, message).await
}

#[tracing::instrument(skip(state))]
pub async fn stop_processing_handler(State(state): State<AppState>) -> impl IntoResponse {
    let changed = state.control.stop().await;
    let message = if changed {
        "Processing stopped"
    } else {
        "Processing already stopped"
    };
    transition_response(&state, changed, message).await
}

#[tracing::instrument(skip(state))]
pub async fn toggle_processing_handler(State(state): State<AppState>) -> impl IntoResponse {
    let result = state.control.toggle().await;
    let running = state.consumption.is_running().await;

    let response = ToggleResponse {
        success: true,
        action: if result.current { "started" } else { "stopped" },
        previous_state: ProcessingStatusLabel::from_enabled(result.previous),
        current_state: ProcessingStatusLabel::from_enabled(result.current),
        consumer_status: ConsumerStatus::from_running(running),
    };

    (StatusCode::OK, Json(response))
}

#[tracing::instrument(skip(state))]
pub async fn reset_processing_handler(State(state): State<AppState>) -> impl IntoResponse {
    let report = state.control.reset().await;
    let snapshot = state.control.state();
    let running = state.consumption.is_running().await;

    let message = if report.success() {
        format!("Reset complete; {} records cleared", report.records_cleared)
    } else {
        "Reset completed with errors; inspect hdfsCleared and directoryRecreated".to_string()
    };

    let response = ResetResponse {
        success: report.success(),
        state_changed: report.state_changed,
        enabled: snapshot.enabled,
        status: snapshot.status(),
        consumer_status: ConsumerStatus::from_running(running),
        records_cleared: report.records_cleared,
        hdfs_cleared: report.store_cleared,
        directory_recreated: report.directory_recreated,
        message,
    };

    (StatusCode::OK, Json(response))
}

async fn transition_response(
    state: &AppState,
    changed: bool,
    message: &str,
) -> (StatusCode, Json<TransitionResponse>) {
    let snapshot = state.control.state();
    let running = state.consumption.is_running().await;

    (
        StatusCode::OK,
        Json(TransitionResponse {
            success: true,
            state_changed: changed,
            enabled: snapshot.enabled,
            status: snapshot.status(),
            consumer_status: ConsumerStatus::from_running(running),
            message: message.to_string(),
        }),
    )
}
