use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, types::Json, PgPool};
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use super::models::{NewUser, Pricing, Project, PromptMessage, User};
use super::{DatabaseError, Store};
use crate::config::DatabaseConfig;

const USER_COLUMNS: &str = "id, name, email, external_token, role, created_at, updated_at";
const PROJECT_COLUMNS: &str = "id, prompts, code, user_id, created_at, updated_at";

/// Postgres-backed store over a single connection pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open the pool described by the database config
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(&config.url)
            .await?;

        info!(
            "Created database pool (max_connections={})",
            config.max_connections
        );
        Ok(Self { pool })
    }

    /// Apply pending migrations from ./migrations
    pub async fn migrate(&self) -> Result<(), DatabaseError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| DatabaseError::Migration(e.to_string()))?;
        info!("Database migrations applied");
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("Closed database pool");
    }
}

#[async_trait]
impl Store for PgStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let query = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn create_user(&self, user: NewUser) -> Result<User, DatabaseError> {
        // A concurrent first login for the same email returns the row that won
        let query = format!(
            "INSERT INTO users (name, email, external_token)
             VALUES ($1, $2, $3)
             ON CONFLICT (email) DO UPDATE SET email = EXCLUDED.email
             RETURNING {}",
            USER_COLUMNS
        );
        let created = sqlx::query_as::<_, User>(&query)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.external_token)
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn create_project(
        &self,
        prompts: &[PromptMessage],
        user_id: Uuid,
    ) -> Result<Project, DatabaseError> {
        let query = format!(
            "INSERT INTO projects (prompts, user_id) VALUES ($1, $2) RETURNING {}",
            PROJECT_COLUMNS
        );
        let project = sqlx::query_as::<_, Project>(&query)
            .bind(Json(prompts))
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(project)
    }

    async fn update_project_code(&self, id: Uuid, code: &str) -> Result<Project, DatabaseError> {
        let query = format!(
            "UPDATE projects SET code = $2, updated_at = now() WHERE id = $1 RETURNING {}",
            PROJECT_COLUMNS
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(code)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("project {}", id)))
    }

    async fn list_pricing(&self) -> Result<Vec<Pricing>, DatabaseError> {
        let pricing = sqlx::query_as::<_, Pricing>(
            "SELECT id, name, description, price, currency, credits, created_at
             FROM pricing
             ORDER BY price ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(pricing)
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
