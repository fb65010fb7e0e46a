//! Event ingestion handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::models::{EventBatchIn, IngestResponse};
use crate::{AppResult, AppState};

/// Accept one batch from the SDK
pub async fn ingest(
    State(state): State<AppState>,
    payload: Result<Json<EventBatchIn>, JsonRejection>,
) -> AppResult<Json<IngestResponse>> {
    let Json(batch) = payload?;
    let ingested = state.store.ingest(batch.events).await;

    tracing::debug!("Ingested {} events", ingested);
    Ok(Json(IngestResponse { ingested }))
}
