//! PostgreSQL 连接池
//!
//! 连接串以 `Secret` 持有，日志中不会出现密码

use std::time::Duration;

use edu_errors::{AppError, AppResult};
use secrecy::{ExposeSecret, Secret};
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::debug;

/// 连接池参数
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    url: Secret<String>,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
}

impl PostgresConfig {
    pub fn new(url: Secret<String>) -> Self {
        Self {
            url,
            max_connections: 10,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
        }
    }

    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self.min_connections = self.min_connections.min(max);
        self
    }

    pub fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }
}

/// 建立连接池并执行一次探活查询
pub async fn create_pool(config: &PostgresConfig) -> AppResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(config.idle_timeout)
        .connect(config.url.expose_secret())
        .await
        .map_err(|e| AppError::database(format!("Failed to create pool: {}", e)))?;

    check_connection(&pool).await?;
    debug!(max_connections = config.max_connections, "PostgreSQL pool ready");
    Ok(pool)
}

/// 探活
pub async fn check_connection(pool: &PgPool) -> AppResult<()> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map_err(|e| AppError::database(format!("Database health check failed: {}", e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_connections_never_exceed_max() {
        let config = PostgresConfig::new(Secret::new("postgres://localhost/school".to_string()))
            .with_max_connections(0);
        assert_eq!(config.max_connections, 0);
        assert_eq!(config.min_connections, 0);
    }

    #[test]
    fn test_debug_redacts_url() {
        let config = PostgresConfig::new(Secret::new("postgres://user:hunter2@db/school".to_string()));
        assert!(!format!("{:?}", config).contains("hunter2"));
    }
}
