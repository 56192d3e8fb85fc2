use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;

use crate::application::services::IngressError;
use crate::domain::InboundEnvelope;
use crate::presentation::handlers::files::ErrorResponse;
use crate::presentation::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub accepted: bool,
    pub document_key: String,
    pub destination: String,
}

#[tracing::instrument(skip(state, envelope))]
pub async fn submit_document_handler(
    State(state): State<AppState>,
    Json(envelope): Json<InboundEnvelope>,
) -> impl IntoResponse {
    match state.ingress.submit(&envelope).await {
        Ok(key) => (
            StatusCode::ACCEPTED,
            Json(SubmitResponse {
                accepted: true,
                document_key: key.to_hex(),
                destination: state.ingress.destination().to_string(),
            }),
        )
            .into_response(),
        Err(IngressError::Rejected(e)) => {
            tracing::warn!(error = %e, "Rejected document submission");
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to enqueue document");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}
