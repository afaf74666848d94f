// handlers/protected/chat.rs - POST /chat

use axum::extract::{rejection::JsonRejection, Extension, State};
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::{DispatchMessage, QueueError};
use crate::validation::validate_chat;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub project_id: Uuid,
    pub llm_response: String,
    /// True when the project was generated but the render job could not be queued
    pub dispatch_failed: bool,
}

/// POST /chat - generate code for a prompt and queue it for rendering
///
/// Expected Input:
/// ```json
/// { "prompt": [{ "role": "user", "content": "a bouncing ball" }], "type": "video" }
/// ```
///
/// Steps: validate, create the project, call the model, store the result,
/// publish `{ "projectId" }`. Nothing is retried. A failed model call leaves
/// the project with no code. A failed publish is reported through
/// `dispatchFailed` and does not fail the request.
pub async fn chat_post(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<ChatResponse> {
    let Json(body) = body?;
    let request = validate_chat(&body)?;

    let project = state
        .store
        .create_project(&request.prompt, auth_user.id)
        .await
        .map_err(|e| {
            tracing::error!(user_id = %auth_user.id, body = %body, "Failed to create project: {}", e);
            ApiError::internal_server_error("Internal server error")
        })?;

    let llm_response = state
        .llm
        .generate(
            &request.prompt,
            &state.chat.system_prompt,
            state.chat.max_tokens,
        )
        .await
        .map_err(|e| {
            tracing::error!(
                user_id = %auth_user.id,
                project_id = %project.id,
                body = %body,
                "LLM generation failed: {}",
                e
            );
            ApiError::llm_error("LLM failed to generate a response")
        })?;

    if llm_response.trim().is_empty() {
        tracing::error!(user_id = %auth_user.id, project_id = %project.id, "LLM returned an empty response");
        return Err(ApiError::llm_error("LLM failed to generate a response"));
    }

    state
        .store
        .update_project_code(project.id, &llm_response)
        .await
        .map_err(|e| {
            tracing::error!(
                user_id = %auth_user.id,
                project_id = %project.id,
                "Failed to store generated code: {}",
                e
            );
            ApiError::internal_server_error("Internal server error")
        })?;

    let dispatch_failed = match dispatch(&state, project.id).await {
        Ok(()) => false,
        Err(e) => {
            tracing::error!(
                user_id = %auth_user.id,
                project_id = %project.id,
                "Failed to dispatch project: {}",
                e
            );
            true
        }
    };

    tracing::info!(user_id = %auth_user.id, project_id = %project.id, dispatch_failed, "Chat request completed");

    Ok(ApiResponse::success(
        "LLM response generated successfully",
        ChatResponse {
            project_id: project.id,
            llm_response,
            dispatch_failed,
        },
    ))
}

async fn dispatch(state: &AppState, project_id: Uuid) -> Result<(), QueueError> {
    let body = DispatchMessage { project_id }.to_body()?;
    state.queue.publish(&state.chat.queue_url, body).await
}
