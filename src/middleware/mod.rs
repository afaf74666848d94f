pub mod auth;
pub mod response;
pub mod roles;

pub use auth::{authenticate, AuthUser};
pub use response::{ApiResponse, ApiResult};
pub use roles::{admin_check, any_authenticated, user_check, RoleGate};
