use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use crate::models::{AppState, SearchQuery, SearchRequest, SearchResponse};
use crate::types::{AppError, AppResult};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/search/", post(perform_search))
        .route("/search", post(perform_search))
        .with_state(state)
}

/// POST /search/ - Web search for a keyword, top results as JSON
pub async fn perform_search(
    State(state): State<AppState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> AppResult<Json<SearchResponse>> {
    let Json(request) = payload.map_err(|e| AppError::InvalidRequest(e.body_text()))?;
    let query = SearchQuery::try_from(request)?;

    let response = state.agent.perform_search(query).await?;
    Ok(Json(response))
}
