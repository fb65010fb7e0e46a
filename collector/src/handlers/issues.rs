//! Issues handlers

use axum::{extract::{Path, Query, State}, Json};

use crate::models::{Issue, IssueFilter, RecommendationOut};
use crate::{AppError, AppResult, AppState};

const DEFAULT_LIMIT: usize = 50;

/// List issues, newest first
pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<IssueFilter>,
) -> AppResult<Json<Vec<Issue>>> {
    let issues = state.store.list_issues(filter.limit.unwrap_or(DEFAULT_LIMIT)).await;
    Ok(Json(issues))
}

/// Get single issue by key
pub async fn get(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> AppResult<Json<Issue>> {
    let issue = state
        .store
        .get_issue(&key)
        .await
        .ok_or_else(|| AppError::NotFound("Issue not found".to_string()))?;

    Ok(Json(issue))
}

/// Recommendations of the newest issues
pub async fn recommendations(
    State(state): State<AppState>,
    Query(filter): Query<IssueFilter>,
) -> AppResult<Json<Vec<RecommendationOut>>> {
    let issues = state.store.list_issues(filter.limit.unwrap_or(DEFAULT_LIMIT)).await;

    let out = issues
        .into_iter()
        .map(|issue| RecommendationOut {
            issue_key: issue.key,
            title: issue.title,
            recommendation: issue.recommendation,
            confidence: issue.confidence,
        })
        .collect();

    Ok(Json(out))
}
