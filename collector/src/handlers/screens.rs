//! Screen metrics handler

use axum::{extract::{Path, Query, State}, Json};

use crate::models::{MetricsQuery, ScreenMetrics};
use crate::{AppError, AppResult, AppState};

pub async fn metrics(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<MetricsQuery>,
) -> AppResult<Json<ScreenMetrics>> {
    let window_hours = query.window_hours.unwrap_or(24);
    if window_hours <= 0 {
        return Err(AppError::ValidationError("window_hours must be positive".to_string()));
    }

    let metrics = state
        .store
        .screen_metrics(&name, window_hours, chrono::Utc::now())
        .await;
    Ok(Json(metrics))
}
