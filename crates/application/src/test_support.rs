use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use backoffice_core::{AppResult, UserId};
use backoffice_domain::{AdminRecord, AdminUser, Criteria, EmailAddress, SortDirection};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::{PasswordHasher, RecordRepository, UserDirectory};

#[derive(Default)]
pub(crate) struct FakeRecordRepository {
    pub(crate) soft_delete: bool,
    pub(crate) records: Mutex<Vec<AdminRecord>>,
    pub(crate) seen_criteria: Mutex<Vec<Criteria>>,
}

impl FakeRecordRepository {
    pub(crate) fn with_soft_delete() -> Self {
        Self {
            soft_delete: true,
            ..Self::default()
        }
    }

    pub(crate) async fn insert(&self, record: AdminRecord) {
        self.records.lock().await.push(record);
    }

    pub(crate) async fn get(&self, id: &str) -> Option<AdminRecord> {
        self.records
            .lock()
            .await
            .iter()
            .find(|record| record.id() == id)
            .cloned()
    }
}

fn compare_field(left: &AdminRecord, right: &AdminRecord, field: &str) -> Ordering {
    let text = |record: &AdminRecord| {
        record
            .field(field)
            .map(|value| match value {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            })
            .unwrap_or_default()
    };

    text(left).cmp(&text(right))
}

#[async_trait]
impl RecordRepository for FakeRecordRepository {
    fn supports_soft_delete(&self) -> bool {
        self.soft_delete
    }

    async fn matching(&self, criteria: &Criteria) -> AppResult<Vec<AdminRecord>> {
        self.seen_criteria.lock().await.push(criteria.clone());

        let mut matched: Vec<AdminRecord> = self
            .records
            .lock()
            .await
            .iter()
            .filter(|record| criteria.matches(record.fields()))
            .cloned()
            .collect();

        matched.sort_by(|left, right| {
            criteria
                .sort()
                .iter()
                .map(|directive| {
                    let ordering = compare_field(left, right, &directive.field);
                    match directive.direction {
                        SortDirection::Asc => ordering,
                        SortDirection::Desc => ordering.reverse(),
                    }
                })
                .find(|ordering| ordering.is_ne())
                .unwrap_or(Ordering::Equal)
        });

        Ok(matched
            .into_iter()
            .skip(criteria.offset().unwrap_or(0))
            .take(criteria.limit().unwrap_or(usize::MAX))
            .collect())
    }

    async fn count(&self, criteria: &Criteria) -> AppResult<usize> {
        Ok(self
            .records
            .lock()
            .await
            .iter()
            .filter(|record| criteria.matches(record.fields()))
            .count())
    }

    async fn find(&self, id: &str) -> AppResult<Option<AdminRecord>> {
        Ok(self.get(id).await)
    }

    async fn save(&self, record: AdminRecord) -> AppResult<()> {
        let mut records = self.records.lock().await;
        match records.iter_mut().find(|stored| stored.id() == record.id()) {
            Some(stored) => *stored = record,
            None => records.push(record),
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        self.records.lock().await.retain(|record| record.id() != id);
        Ok(())
    }
}

pub(crate) struct FakeUserDirectory {
    pub(crate) repository: Arc<FakeRecordRepository>,
}

impl FakeUserDirectory {
    pub(crate) fn new(repository: Arc<FakeRecordRepository>) -> Self {
        Self { repository }
    }

    async fn users(&self) -> Vec<AdminUser> {
        self.repository
            .records
            .lock()
            .await
            .iter()
            .filter_map(|record| AdminUser::from_record(record).ok())
            .collect()
    }
}

#[async_trait]
impl UserDirectory for FakeUserDirectory {
    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<AdminUser>> {
        Ok(self
            .users()
            .await
            .into_iter()
            .find(|user| user.id() == user_id))
    }

    async fn find_by_email(&self, email: &EmailAddress) -> AppResult<Option<AdminUser>> {
        Ok(self
            .users()
            .await
            .into_iter()
            .find(|user| user.email() == email && user.deleted_at().is_none()))
    }

    async fn email_taken_by_other(
        &self,
        email: &EmailAddress,
        user_id: UserId,
    ) -> AppResult<bool> {
        Ok(self.users().await.iter().any(|user| {
            user.email() == email && user.id() != user_id && user.deleted_at().is_none()
        }))
    }

    async fn save(&self, user: &AdminUser) -> AppResult<()> {
        self.repository.save(user.to_record()?).await
    }
}

/// Stores passwords as `plain:<password>`.
pub(crate) struct FakePasswordHasher;

impl PasswordHasher for FakePasswordHasher {
    fn hash_password(&self, password: &str) -> AppResult<String> {
        Ok(format!("plain:{password}"))
    }

    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
        Ok(hash.strip_prefix("plain:") == Some(password))
    }
}

pub(crate) fn email(value: &str) -> EmailAddress {
    match EmailAddress::new(value) {
        Ok(email) => email,
        Err(error) => panic!("invalid test email: {error}"),
    }
}

pub(crate) fn user(address: &str, role: &str, password: &str) -> AdminUser {
    AdminUser::new(
        UserId::new(),
        email(address),
        role,
        format!("plain:{password}"),
        chrono::Utc::now(),
    )
}

pub(crate) fn record(id: &str, fields: Value) -> AdminRecord {
    let Value::Object(fields) = fields else {
        panic!("test record fields must be an object");
    };
    match AdminRecord::new(id, fields) {
        Ok(record) => record,
        Err(error) => panic!("invalid test record: {error}"),
    }
}
