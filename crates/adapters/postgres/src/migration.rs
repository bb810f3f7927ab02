//! PostgreSQL 迁移管理模块
//!
//! 版本化迁移，每个迁移在独立事务中执行并记录到迁移表

use edu_errors::{AppError, AppResult};
use sqlx::PgPool;
use tracing::{debug, info};

/// 迁移表名
const MIGRATION_TABLE: &str = "_schema_migrations";

/// 多实例同时启动时串行化迁移的 advisory lock key
const MIGRATION_LOCK_KEY: i64 = 0x5C40_0001;

/// 迁移定义
#[derive(Debug, Clone)]
pub struct Migration {
    /// 版本号
    pub version: i64,
    /// 名称
    pub name: &'static str,
    /// 升级 SQL（可包含多条语句）
    pub up_sql: &'static str,
}

impl Migration {
    pub const fn new(version: i64, name: &'static str, up_sql: &'static str) -> Self {
        Self {
            version,
            name,
            up_sql,
        }
    }
}

/// 迁移管理器
pub struct MigrationManager {
    pool: PgPool,
}

impl MigrationManager {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 应用所有待处理的迁移，返回本次应用的版本
    pub async fn migrate(&self, migrations: &[Migration]) -> AppResult<Vec<i64>> {
        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS {MIGRATION_TABLE} (
                version BIGINT PRIMARY KEY,
                name VARCHAR(255) NOT NULL,
                applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )"
        ))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create migration table: {}", e)))?;

        let mut sorted: Vec<&Migration> = migrations.iter().collect();
        sorted.sort_by_key(|m| m.version);

        let mut applied = Vec::new();
        for migration in sorted {
            if self.apply(migration).await? {
                applied.push(migration.version);
            }
        }

        info!(applied = applied.len(), "Migrations complete");
        Ok(applied)
    }

    /// 应用单个迁移；已应用时返回 false
    async fn apply(&self, migration: &Migration) -> AppResult<bool> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {}", e)))?;

        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(MIGRATION_LOCK_KEY)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to acquire migration lock: {}", e)))?;

        let existing: Option<(i64,)> = sqlx::query_as(&format!(
            "SELECT version FROM {MIGRATION_TABLE} WHERE version = $1"
        ))
        .bind(migration.version)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to check migration: {}", e)))?;

        if existing.is_some() {
            debug!(version = migration.version, name = migration.name, "Migration already applied");
            return Ok(false);
        }

        sqlx::raw_sql(migration.up_sql)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::database(format!(
                    "Failed to apply migration {}: {}",
                    migration.version, e
                ))
            })?;

        sqlx::query(&format!(
            "INSERT INTO {MIGRATION_TABLE} (version, name) VALUES ($1, $2)"
        ))
        .bind(migration.version)
        .bind(migration.name)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to record migration: {}", e)))?;

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit migration: {}", e)))?;

        info!(version = migration.version, name = migration.name, "Migration applied successfully");
        Ok(true)
    }
}
