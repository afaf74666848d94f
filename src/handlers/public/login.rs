// handlers/public/login.rs - POST /login

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Serialize;
use serde_json::Value;

use crate::app::AppState;
use crate::database::models::NewUser;
use crate::error::ApiError;
use crate::validation::validate_login;

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub status: bool,
    pub message: &'static str,
    pub token: String,
}

/// POST /login - exchange an identity-provider login for a bearer token
///
/// Expected Input:
/// ```json
/// { "email": "ada@example.com", "name": "Ada", "googletoken": "..." }
/// ```
///
/// The user is looked up by email and created on first login, so repeated
/// logins with the same email always resolve to the same account.
pub async fn login_post(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(body) = body?;
    let request = validate_login(&body)?;

    let user = match state.store.find_user_by_email(&request.email).await? {
        Some(user) => user,
        None => {
            let user = state
                .store
                .create_user(NewUser {
                    name: request.name,
                    email: request.email,
                    external_token: request.external_token,
                })
                .await?;
            tracing::info!("Created user {} on first login", user.id);
            user
        }
    };

    let token = state.tokens.issue(&user).map_err(|e| {
        tracing::error!("Failed to issue token for user {}: {}", user.id, e);
        ApiError::internal_server_error("Internal server error")
    })?;

    tracing::info!("Login successful for user {}", user.id);
    Ok(Json(LoginResponse {
        status: true,
        message: "Login successful.",
        token,
    }))
}
