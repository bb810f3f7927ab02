//! School Records Service - 服务入口
//!
//! 使用 edu-bootstrap 统一启动模式

use edu_bootstrap::{Infrastructure, run_http};
use edu_config::StorageBackend;
use edu_errors::AppError;
use school_records::infrastructure::persistence::run_migrations;
use school_records::{AppState, Repositories, api};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    run_http("config", |infra: Infrastructure| async move {
        let config = infra.config();

        // 组装仓储
        let repos = match (config.storage.backend, infra.postgres_pool()) {
            (StorageBackend::Postgres, Some(pool)) => {
                run_migrations(&pool).await?;
                info!("Using PostgreSQL storage");
                Repositories::postgres(pool)
            }
            _ => {
                info!("Using in-memory storage");
                Repositories::in_memory()
            }
        };

        let state = AppState::new(
            repos,
            infra.token_service(),
            config.auth.allow_self_registration,
        );

        if let Some(admin) = &config.auth.bootstrap_admin {
            state
                .auth
                .ensure_bootstrap_admin(&admin.name, &admin.email, &admin.password)
                .await?;
        }

        Ok::<_, AppError>(api::rest::router(state))
    })
    .await
}
