use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;

use crate::application::services::PendingReport;
use crate::domain::{PendingMode, ProcessingRecord};
use crate::presentation::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingResponse {
    pub mode: PendingMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue_depth: Option<usize>,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<String>>,
}

impl From<PendingReport> for PendingResponse {
    fn from(report: PendingReport) -> Self {
        let mode = report.mode();
        let count = report.count();
        match report {
            PendingReport::Queue { depth } => Self {
                mode,
                queue_depth: Some(depth),
                count,
                files: None,
            },
            PendingReport::Directory { files } => Self {
                mode,
                queue_depth: None,
                count,
                files: Some(files),
            },
        }
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[tracing::instrument(skip(state))]
pub async fn processed_files_handler(State(state): State<AppState>) -> impl IntoResponse {
    let records: Vec<ProcessingRecord> = state.ledger.records();
    (StatusCode::OK, Json(records))
}

#[tracing::instrument(skip(state))]
pub async fn pending_files_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.pending.report().await {
        Ok(report) => (StatusCode::OK, Json(PendingResponse::from(report))).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to count pending work");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse {
                    error: format!("Failed to count pending work: {e}"),
                }),
            )
                .into_response()
        }
    }
}
