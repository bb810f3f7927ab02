//! 基础设施资源管理

use std::sync::Arc;

use edu_adapter_postgres::{PostgresConfig, create_pool};
use edu_auth_core::TokenService;
use edu_config::{AppConfig, StorageBackend};
use edu_errors::AppResult;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use tracing::info;

use crate::retry::{RetryConfig, with_retry};

/// 基础设施资源容器
pub struct Infrastructure {
    /// 应用配置
    config: AppConfig,
    /// PostgreSQL 连接池（内存存储时为空）
    postgres_pool: Option<PgPool>,
    /// Token 服务
    token_service: Arc<TokenService>,
}

impl Infrastructure {
    /// 从配置创建基础设施资源（数据库连接带重试）
    pub async fn from_config(config: AppConfig) -> AppResult<Self> {
        let postgres_pool = match (&config.storage.backend, &config.database) {
            (StorageBackend::Postgres, Some(database)) => {
                let pg_config = PostgresConfig::new(database.url.clone())
                    .with_max_connections(database.max_connections);
                let pool = with_retry(&RetryConfig::default(), "PostgreSQL connection", || {
                    let cfg = pg_config.clone();
                    async move { create_pool(&cfg).await }
                })
                .await?;
                info!(
                    max_connections = database.max_connections,
                    "PostgreSQL connection pool created"
                );
                Some(pool)
            }
            _ => {
                info!("Using in-memory storage, no database connection");
                None
            }
        };

        let token_service = Arc::new(TokenService::new(
            config.jwt.secret.expose_secret(),
            config.jwt.expires_in,
            config.jwt.issuer.clone(),
            config.jwt.audience.clone(),
        ));

        Ok(Self {
            config,
            postgres_pool,
            token_service,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn postgres_pool(&self) -> Option<PgPool> {
        self.postgres_pool.clone()
    }

    pub fn token_service(&self) -> Arc<TokenService> {
        self.token_service.clone()
    }
}
