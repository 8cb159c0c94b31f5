use std::cmp::Ordering;

use async_trait::async_trait;
use backoffice_application::RecordRepository;
use backoffice_core::AppResult;
use backoffice_domain::{AdminRecord, Criteria, SortDirection};
use serde_json::Value;
use tokio::sync::RwLock;

/// In-memory record repository for one resource.
///
/// Records keep their insertion order, which breaks ties between equal sort
/// keys.
#[derive(Debug, Default)]
pub struct InMemoryRecordRepository {
    soft_delete: bool,
    records: RwLock<Vec<AdminRecord>>,
}

impl InMemoryRecordRepository {
    /// Creates an empty repository that removes records on delete.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty repository that soft-deletes through `deletedAt`.
    #[must_use]
    pub fn with_soft_delete() -> Self {
        Self {
            soft_delete: true,
            records: RwLock::new(Vec::new()),
        }
    }
}

#[async_trait]
impl RecordRepository for InMemoryRecordRepository {
    fn supports_soft_delete(&self) -> bool {
        self.soft_delete
    }

    async fn matching(&self, criteria: &Criteria) -> AppResult<Vec<AdminRecord>> {
        let records = self.records.read().await;

        let mut matched: Vec<&AdminRecord> = records
            .iter()
            .filter(|record| criteria.matches(record.fields()))
            .collect();

        matched.sort_by(|left, right| {
            criteria
                .sort()
                .iter()
                .map(|directive| {
                    let ordering =
                        compare_values(left.field(&directive.field), right.field(&directive.field));
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
            .cloned()
            .collect())
    }

    async fn count(&self, criteria: &Criteria) -> AppResult<usize> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|record| criteria.matches(record.fields()))
            .count())
    }

    async fn find(&self, id: &str) -> AppResult<Option<AdminRecord>> {
        let records = self.records.read().await;
        Ok(records.iter().find(|record| record.id() == id).cloned())
    }

    async fn save(&self, record: AdminRecord) -> AppResult<()> {
        let mut records = self.records.write().await;
        match records.iter_mut().find(|stored| stored.id() == record.id()) {
            Some(stored) => *stored = record,
            None => records.push(record),
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        self.records.write().await.retain(|record| record.id() != id);
        Ok(())
    }
}

/// Orders JSON values like PostgreSQL orders `jsonb` with `NULLS LAST`.
fn compare_values(left: Option<&Value>, right: Option<&Value>) -> Ordering {
    let left = left.filter(|value| !value.is_null());
    let right = right.filter(|value| !value.is_null());

    match (left, right) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(left), Some(right)) => match (left, right) {
            (Value::String(left), Value::String(right)) => left.cmp(right),
            (Value::Number(left), Value::Number(right)) => left
                .as_f64()
                .partial_cmp(&right.as_f64())
                .unwrap_or(Ordering::Equal),
            (Value::Bool(left), Value::Bool(right)) => left.cmp(right),
            _ => type_rank(left)
                .cmp(&type_rank(right))
                .then_with(|| left.to_string().cmp(&right.to_string())),
        },
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::String(_) => 1,
        Value::Number(_) => 2,
        Value::Bool(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}
