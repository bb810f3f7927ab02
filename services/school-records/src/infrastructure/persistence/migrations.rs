//! 数据库迁移

use edu_adapter_postgres::{Migration, MigrationManager};
use edu_errors::AppResult;
use sqlx::PgPool;
use tracing::info;

/// 按版本排列的迁移
pub const MIGRATIONS: &[Migration] = &[Migration::new(
    1,
    "create_school_records",
    include_str!("../../../migrations/0001_create_school_records.sql"),
)];

/// 应用全部待执行的迁移
pub async fn run_migrations(pool: &PgPool) -> AppResult<()> {
    let applied = MigrationManager::new(pool.clone()).migrate(MIGRATIONS).await?;
    info!(applied = ?applied, "Schema up to date");
    Ok(())
}
