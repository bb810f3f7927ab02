//! 持久化实现：PostgreSQL 与内存两种存储后端

mod memory;
mod migrations;
mod postgres_grade_repository;
mod postgres_mark_repository;
mod postgres_subject_repository;
mod postgres_user_repository;

use std::sync::Arc;

use sqlx::PgPool;

use crate::application::Repositories;

pub use memory::InMemoryStore;
pub use migrations::{MIGRATIONS, run_migrations};
pub use postgres_grade_repository::PostgresGradeRepository;
pub use postgres_mark_repository::PostgresMarkRepository;
pub use postgres_subject_repository::PostgresSubjectRepository;
pub use postgres_user_repository::PostgresUserRepository;

impl Repositories {
    /// 基于 PostgreSQL 的仓储
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PostgresUserRepository::new(pool.clone())),
            subjects: Arc::new(PostgresSubjectRepository::new(pool.clone())),
            grades: Arc::new(PostgresGradeRepository::new(pool.clone())),
            marks: Arc::new(PostgresMarkRepository::new(pool)),
        }
    }

    /// 进程内存储（测试与本地演示）
    pub fn in_memory() -> Self {
        let store = Arc::new(InMemoryStore::default());
        Self {
            users: store.clone(),
            subjects: store.clone(),
            grades: store.clone(),
            marks: store,
        }
    }
}
