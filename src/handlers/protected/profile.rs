use axum::extract::{Extension, State};

use crate::app::AppState;
use crate::database::models::User;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// GET /profile - the caller's own user record
pub async fn profile_get(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<User> {
    let user = state
        .store
        .find_user_by_id(auth_user.id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found."))?;

    Ok(ApiResponse::success("Profile fetched successfully.", user))
}
