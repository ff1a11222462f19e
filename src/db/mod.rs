//! Database module for PostgreSQL persistence

pub mod models;
pub mod repository;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::env;

// Environment variable names
const ENV_POSTGRES_HOST: &str = "A11Y_WORKER_POSTGRES_HOST";
const ENV_POSTGRES_PORT: &str = "A11Y_WORKER_POSTGRES_PORT";
const ENV_POSTGRES_USER: &str = "A11Y_WORKER_POSTGRES_USER";
const ENV_POSTGRES_PASSWORD: &str = "A11Y_WORKER_POSTGRES_PASSWORD";
const ENV_POSTGRES_DB: &str = "A11Y_WORKER_POSTGRES_DB";

// Default values
const DEFAULT_POSTGRES_HOST: &str = "127.0.0.1";
const DEFAULT_POSTGRES_PORT: &str = "5432";
const DEFAULT_POSTGRES_USER: &str = "a11y_worker";
const DEFAULT_POSTGRES_PASSWORD: &str = "a11y_worker";
const DEFAULT_POSTGRES_DB: &str = "a11y_worker";

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Database error: {0}")]
    Query(#[from] sqlx::Error),
}

/// Create a new database connection pool
pub async fn create_pool() -> Result<PgPool, DbError> {
    let host = env::var(ENV_POSTGRES_HOST).unwrap_or_else(|_| DEFAULT_POSTGRES_HOST.to_string());
    let port = env::var(ENV_POSTGRES_PORT).unwrap_or_else(|_| DEFAULT_POSTGRES_PORT.to_string());
    let user = env::var(ENV_POSTGRES_USER).unwrap_or_else(|_| DEFAULT_POSTGRES_USER.to_string());
    let password =
        env::var(ENV_POSTGRES_PASSWORD).unwrap_or_else(|_| DEFAULT_POSTGRES_PASSWORD.to_string());
    let database = env::var(ENV_POSTGRES_DB).unwrap_or_else(|_| DEFAULT_POSTGRES_DB.to_string());

    let database_url = format!(
        "postgres://{}:{}@{}:{}/{}",
        user, password, host, port, database
    );

    tracing::debug!(host = %host, port = %port, database = %database, "Connecting to PostgreSQL");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await?;

    tracing::info!(host = %host, port = %port, "PostgreSQL connection established");

    Ok(pool)
}

/// Initialize database schema
pub async fn init_schema(pool: &PgPool) -> Result<(), DbError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS scan_sessions (
            scan_id UUID PRIMARY KEY,
            project_id UUID NOT NULL,
            status VARCHAR(20) NOT NULL DEFAULT 'READY',
            overall_score INT CHECK (overall_score >= 0 AND overall_score <= 100),
            started_at TIMESTAMPTZ,
            finished_at TIMESTAMPTZ,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS a11y_issues (
            issue_id UUID PRIMARY KEY,
            scan_id UUID NOT NULL REFERENCES scan_sessions(scan_id) ON DELETE CASCADE,
            rule_id VARCHAR(100) NOT NULL,
            severity VARCHAR(20),
            element_selector TEXT,
            description TEXT,
            raw_detail JSONB,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes separately
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_scan_sessions_project_id ON scan_sessions(project_id)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_scan_sessions_created_at ON scan_sessions(created_at)",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_a11y_issues_scan_id ON a11y_issues(scan_id)")
        .execute(pool)
        .await?;

    tracing::info!("Database schema initialized");

    Ok(())
}
