//! Memory endpoint handlers: store, semantic search and timeline.
//!
//! Every operation is scoped to the authenticated caller.

use axum::Json;
use axum::extract::State;

use mgdi_types::memory::{
    MemoryEntry, RankedMemory, SearchParams, StoreMemoryRequest, TimelineParams,
};

use crate::http::error::{AppError, MemoryOperation};
use crate::http::extractors::auth::Authenticated;
use crate::http::extractors::body::{ApiJson, ApiQuery};
use crate::http::response::{ApiResponse, RequestTimer};
use crate::state::AppState;

/// POST /api/memory/store - Embed and persist a memory.
pub async fn store_memory(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    ApiJson(body): ApiJson<StoreMemoryRequest>,
) -> Result<Json<ApiResponse<MemoryEntry>>, AppError> {
    let timer = RequestTimer::start();

    let entry = state
        .memory_service
        .store(&principal, body)
        .await
        .map_err(AppError::memory(MemoryOperation::Store))?;

    Ok(Json(timer.finish(entry)))
}

/// GET /api/memory/search?query=...&limit=10&threshold=0.8
pub async fn search_memory(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    ApiQuery(params): ApiQuery<SearchParams>,
) -> Result<Json<ApiResponse<Vec<RankedMemory>>>, AppError> {
    let timer = RequestTimer::start();

    let results = state
        .memory_service
        .search(&principal, &params)
        .await
        .map_err(AppError::memory(MemoryOperation::Search))?;

    Ok(Json(timer.finish(results)))
}

/// GET /api/memory/timeline?limit=50 - Newest first.
pub async fn memory_timeline(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    ApiQuery(params): ApiQuery<TimelineParams>,
) -> Result<Json<ApiResponse<Vec<MemoryEntry>>>, AppError> {
    let timer = RequestTimer::start();

    let entries = state
        .memory_service
        .timeline(&principal, &params)
        .await
        .map_err(AppError::memory(MemoryOperation::Timeline))?;

    Ok(Json(timer.finish(entries)))
}
