use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use backoffice_core::{AppError, AppResult};
use backoffice_domain::{
    AdminUser, ListSchema, MessageKind, ResourceKey, WidgetCollector, WidgetPage, WidgetPosition,
};

use crate::RecordRepository;

/// Contributes widgets to a resource page or the dashboard.
#[async_trait]
pub trait WidgetProvider: Send + Sync {
    /// Adds widgets visible to the user.
    async fn provide(&self, user: &AdminUser, collector: &mut WidgetCollector) -> AppResult<()>;
}

/// Static description of one admin resource.
#[derive(Clone)]
pub struct ResourceDefinition {
    key: ResourceKey,
    repository: Arc<dyn RecordRepository>,
    list_schema: ListSchema,
    create_message: Option<MessageKind>,
    update_message: Option<MessageKind>,
    delete_message: Option<MessageKind>,
    hidden_fields: Vec<String>,
    widgets: HashMap<(WidgetPage, WidgetPosition), Vec<Arc<dyn WidgetProvider>>>,
}

impl ResourceDefinition {
    /// Creates a resource definition with generic CRUD messages.
    #[must_use]
    pub fn new(
        key: ResourceKey,
        repository: Arc<dyn RecordRepository>,
        list_schema: ListSchema,
    ) -> Self {
        Self {
            key,
            repository,
            list_schema,
            create_message: None,
            update_message: None,
            delete_message: None,
            hidden_fields: Vec::new(),
            widgets: HashMap::new(),
        }
    }

    /// Overrides the message used for record creation.
    #[must_use]
    pub fn with_create_message(mut self, message: MessageKind) -> Self {
        self.create_message = Some(message);
        self
    }

    /// Overrides the message used for record updates.
    #[must_use]
    pub fn with_update_message(mut self, message: MessageKind) -> Self {
        self.update_message = Some(message);
        self
    }

    /// Overrides the message used for record deletion.
    #[must_use]
    pub fn with_delete_message(mut self, message: MessageKind) -> Self {
        self.delete_message = Some(message);
        self
    }

    /// Excludes a field from public projections.
    #[must_use]
    pub fn with_hidden_field(mut self, field: impl Into<String>) -> Self {
        self.hidden_fields.push(field.into());
        self
    }

    /// Registers a widget provider for a page slot.
    #[must_use]
    pub fn with_widget(
        mut self,
        page: WidgetPage,
        position: WidgetPosition,
        provider: Arc<dyn WidgetProvider>,
    ) -> Self {
        self.widgets
            .entry((page, position))
            .or_default()
            .push(provider);
        self
    }

    /// Returns the resource key.
    #[must_use]
    pub fn key(&self) -> ResourceKey {
        self.key
    }

    /// Returns the backing repository.
    #[must_use]
    pub fn repository(&self) -> &Arc<dyn RecordRepository> {
        &self.repository
    }

    /// Returns the list schema.
    #[must_use]
    pub fn list_schema(&self) -> &ListSchema {
        &self.list_schema
    }

    /// Returns fields hidden from public projections.
    #[must_use]
    pub fn hidden_fields(&self) -> &[String] {
        self.hidden_fields.as_slice()
    }

    /// Returns the widget providers of a page slot.
    #[must_use]
    pub fn widget_providers(
        &self,
        page: WidgetPage,
        position: WidgetPosition,
    ) -> &[Arc<dyn WidgetProvider>] {
        self.widgets
            .get(&(page, position))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Substitutes the resource's override for a generic CRUD message.
    #[must_use]
    pub fn resolve_message(&self, requested: MessageKind) -> MessageKind {
        let overridden = match requested {
            MessageKind::Create => self.create_message,
            MessageKind::Update => self.update_message,
            MessageKind::Delete => self.delete_message,
            MessageKind::CreateUser | MessageKind::UpdateUser | MessageKind::ChangeEmail => None,
        };

        overridden.unwrap_or(requested)
    }
}

/// Read-only set of resources assembled at startup.
#[derive(Clone, Default)]
pub struct ResourceRegistry {
    definitions: HashMap<ResourceKey, ResourceDefinition>,
}

impl ResourceRegistry {
    /// Starts an empty registry builder.
    #[must_use]
    pub fn builder() -> ResourceRegistryBuilder {
        ResourceRegistryBuilder::default()
    }

    /// Returns the definition registered for a key.
    pub fn get(&self, key: ResourceKey) -> AppResult<&ResourceDefinition> {
        self.definitions
            .get(&key)
            .ok_or_else(|| AppError::NotFound(format!("resource '{key}' is not registered")))
    }

    /// Returns registered keys in stable order.
    #[must_use]
    pub fn keys(&self) -> Vec<ResourceKey> {
        let mut keys: Vec<ResourceKey> = self.definitions.keys().copied().collect();
        keys.sort();
        keys
    }
}

/// Collects resource definitions before the registry is frozen.
#[derive(Default)]
pub struct ResourceRegistryBuilder {
    definitions: HashMap<ResourceKey, ResourceDefinition>,
}

impl ResourceRegistryBuilder {
    /// Adds a definition; each key may be registered once.
    pub fn register(mut self, definition: ResourceDefinition) -> AppResult<Self> {
        let key = definition.key();
        if self.definitions.contains_key(&key) {
            return Err(AppError::Conflict(format!(
                "resource '{key}' is already registered"
            )));
        }

        self.definitions.insert(key, definition);
        Ok(self)
    }

    /// Freezes the registry.
    #[must_use]
    pub fn build(self) -> ResourceRegistry {
        ResourceRegistry {
            definitions: self.definitions,
        }
    }
}
