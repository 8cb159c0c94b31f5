//! Generic create, update and delete messages for registered resources.

use std::sync::Arc;

use async_trait::async_trait;
use backoffice_core::{AppError, AppResult};
use backoffice_domain::{AdminRecord, DELETED_AT_FIELD, ID_FIELD, MessageKind};
use chrono::Utc;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{
    Message, MessageFactory, MessageMetadata, ResourceDefinition, ResourceRegistry, Violations,
};

/// Record field holding the creation timestamp.
pub const CREATED_AT_FIELD: &str = "createdAt";
/// Record field holding the last modification timestamp.
pub const UPDATED_AT_FIELD: &str = "updatedAt";

const MANAGED_FIELDS: [&str; 4] = [ID_FIELD, CREATED_AT_FIELD, UPDATED_AT_FIELD, DELETED_AT_FIELD];

fn writable_fields(body: &Map<String, Value>) -> Map<String, Value> {
    body.iter()
        .filter(|(name, _)| !MANAGED_FIELDS.contains(&name.as_str()))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

fn now_value() -> Value {
    Value::String(Utc::now().to_rfc3339())
}

struct ResourceTarget<'a> {
    resources: &'a ResourceRegistry,
    metadata: &'a MessageMetadata,
}

impl<'a> ResourceTarget<'a> {
    fn definition(&self) -> Option<&'a ResourceDefinition> {
        self.metadata
            .resource
            .and_then(|key| self.resources.get(key).ok())
    }

    fn require_definition(&self) -> AppResult<&'a ResourceDefinition> {
        self.definition().ok_or_else(|| {
            AppError::Validation("message is not scoped to a registered resource".to_owned())
        })
    }

    /// Loads the addressed record when it exists and is not soft-deleted.
    async fn live_record(&self) -> AppResult<Option<AdminRecord>> {
        let (Some(definition), Some(id)) = (self.definition(), self.metadata.entity_id.as_deref())
        else {
            return Ok(None);
        };

        let record = definition.repository().find(id).await?;
        Ok(record.filter(|record| !record.is_soft_deleted()))
    }

    async fn validate_existing(&self) -> AppResult<Violations> {
        let mut violations = Violations::new();
        if self.definition().is_none() {
            violations.add("resource", "invalid_resource");
            return Ok(violations);
        }

        if self.live_record().await?.is_none() {
            violations.add(ID_FIELD, "not_found");
        }

        Ok(violations)
    }

    async fn require_record(&self) -> AppResult<AdminRecord> {
        self.live_record().await?.ok_or_else(|| {
            AppError::NotFound(format!(
                "record '{}' does not exist",
                self.metadata.entity_id.as_deref().unwrap_or_default()
            ))
        })
    }
}

/// Builds [`MessageKind::Create`] messages.
#[derive(Clone)]
pub struct CreateRecordFactory {
    resources: Arc<ResourceRegistry>,
}

impl CreateRecordFactory {
    /// Creates the factory.
    #[must_use]
    pub fn new(resources: Arc<ResourceRegistry>) -> Self {
        Self { resources }
    }
}

impl MessageFactory for CreateRecordFactory {
    fn build(&self, body: Map<String, Value>, metadata: MessageMetadata) -> Box<dyn Message> {
        Box::new(CreateRecordMessage {
            resources: self.resources.clone(),
            fields: writable_fields(&body),
            metadata,
        })
    }
}

struct CreateRecordMessage {
    resources: Arc<ResourceRegistry>,
    fields: Map<String, Value>,
    metadata: MessageMetadata,
}

impl CreateRecordMessage {
    fn target(&self) -> ResourceTarget<'_> {
        ResourceTarget {
            resources: &self.resources,
            metadata: &self.metadata,
        }
    }
}

#[async_trait]
impl Message for CreateRecordMessage {
    fn kind(&self) -> MessageKind {
        MessageKind::Create
    }

    async fn validate(&self) -> AppResult<Violations> {
        let mut violations = Violations::new();
        if self.target().definition().is_none() {
            violations.add("resource", "invalid_resource");
        }
        if self.fields.is_empty() {
            violations.add("data", "empty");
        }

        Ok(violations)
    }

    async fn execute(&self) -> AppResult<()> {
        let definition = self.target().require_definition()?;

        let mut fields = self.fields.clone();
        let now = now_value();
        fields.insert(CREATED_AT_FIELD.to_owned(), now.clone());
        fields.insert(UPDATED_AT_FIELD.to_owned(), now);
        if definition.repository().supports_soft_delete() {
            fields.insert(DELETED_AT_FIELD.to_owned(), Value::Null);
        }

        let record = AdminRecord::new(Uuid::new_v4().to_string(), fields)?;
        tracing::info!(resource = %definition.key(), id = record.id(), "creating record");
        definition.repository().save(record).await
    }
}

/// Builds [`MessageKind::Update`] messages.
#[derive(Clone)]
pub struct UpdateRecordFactory {
    resources: Arc<ResourceRegistry>,
}

impl UpdateRecordFactory {
    /// Creates the factory.
    #[must_use]
    pub fn new(resources: Arc<ResourceRegistry>) -> Self {
        Self { resources }
    }
}

impl MessageFactory for UpdateRecordFactory {
    fn build(&self, body: Map<String, Value>, metadata: MessageMetadata) -> Box<dyn Message> {
        Box::new(UpdateRecordMessage {
            resources: self.resources.clone(),
            fields: writable_fields(&body),
            metadata,
        })
    }
}

struct UpdateRecordMessage {
    resources: Arc<ResourceRegistry>,
    fields: Map<String, Value>,
    metadata: MessageMetadata,
}

impl UpdateRecordMessage {
    fn target(&self) -> ResourceTarget<'_> {
        ResourceTarget {
            resources: &self.resources,
            metadata: &self.metadata,
        }
    }
}

#[async_trait]
impl Message for UpdateRecordMessage {
    fn kind(&self) -> MessageKind {
        MessageKind::Update
    }

    async fn validate(&self) -> AppResult<Violations> {
        self.target().validate_existing().await
    }

    async fn execute(&self) -> AppResult<()> {
        let target = self.target();
        let definition = target.require_definition()?;
        let mut record = target.require_record().await?;

        for (name, value) in &self.fields {
            record.set_field(name.clone(), value.clone());
        }
        record.set_field(UPDATED_AT_FIELD, now_value());

        tracing::info!(resource = %definition.key(), id = record.id(), "updating record");
        definition.repository().save(record).await
    }
}

/// Builds [`MessageKind::Delete`] messages.
#[derive(Clone)]
pub struct DeleteRecordFactory {
    resources: Arc<ResourceRegistry>,
}

impl DeleteRecordFactory {
    /// Creates the factory.
    #[must_use]
    pub fn new(resources: Arc<ResourceRegistry>) -> Self {
        Self { resources }
    }
}

impl MessageFactory for DeleteRecordFactory {
    fn build(&self, _body: Map<String, Value>, metadata: MessageMetadata) -> Box<dyn Message> {
        Box::new(DeleteRecordMessage {
            resources: self.resources.clone(),
            metadata,
        })
    }
}

struct DeleteRecordMessage {
    resources: Arc<ResourceRegistry>,
    metadata: MessageMetadata,
}

impl DeleteRecordMessage {
    fn target(&self) -> ResourceTarget<'_> {
        ResourceTarget {
            resources: &self.resources,
            metadata: &self.metadata,
        }
    }
}

#[async_trait]
impl Message for DeleteRecordMessage {
    fn kind(&self) -> MessageKind {
        MessageKind::Delete
    }

    async fn validate(&self) -> AppResult<Violations> {
        self.target().validate_existing().await
    }

    async fn execute(&self) -> AppResult<()> {
        let target = self.target();
        let definition = target.require_definition()?;
        let mut record = target.require_record().await?;
        let repository = definition.repository();

        if repository.supports_soft_delete() {
            let now = now_value();
            record.set_field(DELETED_AT_FIELD, now.clone());
            record.set_field(UPDATED_AT_FIELD, now);
            tracing::info!(resource = %definition.key(), id = record.id(), "soft-deleting record");
            return repository.save(record).await;
        }

        tracing::info!(resource = %definition.key(), id = record.id(), "deleting record");
        repository.delete(record.id()).await
    }
}
