use std::sync::Arc;

use backoffice_application::RecordRepository;
use backoffice_domain::ResourceKey;
use backoffice_infrastructure::{InMemoryRecordRepository, PostgresRecordRepository};
use sqlx::PgPool;

pub(super) struct RecordRepositorySet {
    pub(super) users: Arc<dyn RecordRepository>,
    pub(super) media: Arc<dyn RecordRepository>,
}

/// Users are soft-deleted so their history stays; media is removed outright.
pub(super) fn build_record_repositories(pool: Option<&PgPool>) -> RecordRepositorySet {
    match pool {
        Some(pool) => RecordRepositorySet {
            users: Arc::new(PostgresRecordRepository::new(
                pool.clone(),
                ResourceKey::User,
                true,
            )),
            media: Arc::new(PostgresRecordRepository::new(
                pool.clone(),
                ResourceKey::Media,
                false,
            )),
        },
        None => {
            tracing::warn!("DATABASE_URL is not set; records are kept in memory");
            RecordRepositorySet {
                users: Arc::new(InMemoryRecordRepository::with_soft_delete()),
                media: Arc::new(InMemoryRecordRepository::new()),
            }
        }
    }
}
