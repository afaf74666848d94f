use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use super::auth::authenticate;
use crate::app::AppState;
use crate::database::models::Role;
use crate::error::ApiError;

/// Role predicate applied after authentication
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleGate {
    AdminOnly,
    UserOnly,
    AnyAuthenticated,
}

impl RoleGate {
    pub fn permits(&self, role: Role) -> bool {
        match self {
            RoleGate::AdminOnly => role == Role::Admin,
            RoleGate::UserOnly => role == Role::User,
            RoleGate::AnyAuthenticated => matches!(role, Role::Admin | Role::User),
        }
    }

    fn denial_message(&self) -> &'static str {
        match self {
            RoleGate::AdminOnly => "Access denied. Admin privileges required.",
            RoleGate::UserOnly => "Access denied. User privileges required.",
            RoleGate::AnyAuthenticated => "Access denied. Authentication required.",
        }
    }

    /// Authenticate, check the role, then hand the identity to the wrapped handler
    pub async fn run(
        self,
        state: &AppState,
        mut request: Request,
        next: Next,
    ) -> Result<Response, ApiError> {
        let auth_user = authenticate(state, request.headers()).await?;

        if !self.permits(auth_user.role) {
            tracing::warn!(
                "User {} with role {} denied by {:?}",
                auth_user.id,
                auth_user.role,
                self
            );
            return Err(ApiError::forbidden(self.denial_message()));
        }

        request.extensions_mut().insert(auth_user);
        Ok(next.run(request).await)
    }
}

/// ADMIN only
pub async fn admin_check(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    RoleGate::AdminOnly.run(&state, request, next).await
}

/// USER only
pub async fn user_check(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    RoleGate::UserOnly.run(&state, request, next).await
}

/// ADMIN or USER
pub async fn any_authenticated(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    RoleGate::AnyAuthenticated.run(&state, request, next).await
}
