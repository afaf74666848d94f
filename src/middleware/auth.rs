use axum::http::HeaderMap;
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::Claims;
use crate::database::models::Role;
use crate::error::ApiError;

/// Authenticated user context extracted from the bearer token
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: Option<String>,
    pub role: Role,
    pub external_token: Option<String>,
    pub name: Option<String>,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.subject_id,
            email: claims.email,
            role: claims.role,
            external_token: claims.external_token,
            name: claims.name,
        }
    }
}

/// Single authentication gate for every protected route.
///
/// Missing or non-Bearer header: 401 before any decode. Bad token: 401.
/// Account gone since issuance: 404. Lookup failure: logged, then a generic 401.
pub async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<AuthUser, ApiError> {
    let token = extract_bearer_token(headers)?;

    let claims = state.tokens.decode(token).map_err(|e| {
        tracing::warn!("Rejected bearer token: {}", e);
        ApiError::unauthorized("Invalid token")
    })?;

    match state.store.find_user_by_id(claims.subject_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            tracing::warn!("Token subject {} has no user record", claims.subject_id);
            return Err(ApiError::not_found("User not found or inactive"));
        }
        Err(e) => {
            tracing::error!(
                "Database error while verifying user {}: {}",
                claims.subject_id,
                e
            );
            return Err(ApiError::unauthorized("Authentication failed."));
        }
    }

    let auth_user = AuthUser::from(claims);
    tracing::debug!("Authenticated user {} ({})", auth_user.id, auth_user.role);
    Ok(auth_user)
}

/// Extract the token from `Authorization: Bearer <token>`
fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let denied = || ApiError::unauthorized("Access denied. No token provided.");

    let auth_str = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(denied)?
        .to_str()
        .map_err(|_| denied())?;

    let token = auth_str.strip_prefix("Bearer ").ok_or_else(denied)?.trim();
    if token.is_empty() {
        return Err(denied());
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(extract_bearer_token(&headers("Bearer abc.def.ghi")).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn rejects_missing_header() {
        let err = extract_bearer_token(&HeaderMap::new()).unwrap_err();
        assert_eq!(err.status_code(), 401);
        assert_eq!(err.message(), "Access denied. No token provided.");
    }

    #[test]
    fn rejects_other_schemes_and_empty_tokens() {
        for value in ["Basic dXNlcjpwYXNz", "bearer abc", "Bearer ", "Bearer    ", "abc"] {
            let err = extract_bearer_token(&headers(value)).unwrap_err();
            assert_eq!(err.status_code(), 401, "header {:?}", value);
        }
    }
}
