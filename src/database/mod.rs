pub mod models;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use models::{NewUser, Pricing, Project, PromptMessage, User};

pub use postgres::PgStore;

/// Errors from the persistence layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Persistence operations the API depends on.
///
/// "Not found" lookups return `Ok(None)`; `Err` is reserved for infrastructure failures.
#[async_trait]
pub trait Store: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;

    async fn create_user(&self, user: NewUser) -> Result<User, DatabaseError>;

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, DatabaseError>;

    async fn create_project(
        &self,
        prompts: &[PromptMessage],
        user_id: Uuid,
    ) -> Result<Project, DatabaseError>;

    async fn update_project_code(&self, id: Uuid, code: &str) -> Result<Project, DatabaseError>;

    async fn list_pricing(&self) -> Result<Vec<Pricing>, DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;
}
