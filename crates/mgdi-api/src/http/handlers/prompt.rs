//! System prompt CRUD handlers.

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use mgdi_types::prompt::{PromptInput, SystemPrompt};

use crate::http::error::AppError;
use crate::http::extractors::auth::Authenticated;
use crate::http::extractors::body::{ApiJson, ApiPath};
use crate::http::response::{ApiResponse, RequestTimer};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct DeleteResult {
    pub result: &'static str,
}

fn self_link(id: i64) -> String {
    format!("/api/system/prompts/{id}")
}

/// GET /api/system/prompts
pub async fn list_prompts(
    State(state): State<AppState>,
    _auth: Authenticated,
) -> Result<Json<ApiResponse<Vec<SystemPrompt>>>, AppError> {
    let timer = RequestTimer::start();
    let prompts = state.prompt_service.list().await?;
    Ok(Json(timer.finish(prompts)))
}

/// POST /api/system/prompts
pub async fn create_prompt(
    State(state): State<AppState>,
    _auth: Authenticated,
    ApiJson(input): ApiJson<PromptInput>,
) -> Result<Json<ApiResponse<SystemPrompt>>, AppError> {
    let timer = RequestTimer::start();
    let prompt = state.prompt_service.create(input).await?;
    let link = self_link(prompt.id);
    Ok(Json(timer.finish(prompt).with_link("self", &link)))
}

/// GET /api/system/prompts/{id}
pub async fn get_prompt(
    State(state): State<AppState>,
    _auth: Authenticated,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<ApiResponse<SystemPrompt>>, AppError> {
    let timer = RequestTimer::start();
    let prompt = state.prompt_service.get(id).await?;
    Ok(Json(timer.finish(prompt).with_link("self", &self_link(id))))
}

/// PUT /api/system/prompts/{id} - The path id wins over any id in the body.
pub async fn update_prompt(
    State(state): State<AppState>,
    _auth: Authenticated,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<PromptInput>,
) -> Result<Json<ApiResponse<SystemPrompt>>, AppError> {
    let timer = RequestTimer::start();
    let prompt = state.prompt_service.update(id, input).await?;
    Ok(Json(timer.finish(prompt).with_link("self", &self_link(id))))
}

/// DELETE /api/system/prompts/{id} - Idempotent; a missing id still
/// reports `deleted`.
pub async fn delete_prompt(
    State(state): State<AppState>,
    _auth: Authenticated,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<ApiResponse<DeleteResult>>, AppError> {
    let timer = RequestTimer::start();
    let removed = state.prompt_service.delete(id).await?;
    tracing::debug!(prompt_id = id, removed, "prompt delete");
    Ok(Json(timer.finish(DeleteResult { result: "deleted" })))
}
