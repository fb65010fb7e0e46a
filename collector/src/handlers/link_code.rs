//! Screen link handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::models::LinkCodeIn;
use crate::{AppResult, AppState};

/// Link a screen to the source file that renders it. Re-linking replaces the source.
pub async fn link(
    State(state): State<AppState>,
    payload: Result<Json<LinkCodeIn>, JsonRejection>,
) -> AppResult<Json<LinkCodeIn>> {
    let Json(link) = payload?;
    let stored = state.store.link_screen(link, chrono::Utc::now()).await;
    tracing::debug!("Linked screen {} -> {}", stored.screen, stored.source);

    Ok(Json(LinkCodeIn {
        screen: stored.screen,
        source: stored.source,
    }))
}
