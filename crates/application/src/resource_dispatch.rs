//! Route-to-message dispatch for resource and account endpoints.
//!
//! A request names a [`MessageKind`] and optionally a resource. The
//! resource may substitute its own create/update/delete message. The
//! message is built from the request body plus route metadata, validated,
//! and only handed to the [`CommandBus`] when validation passes.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use backoffice_core::{AppError, AppResult, UserId};
use backoffice_domain::{MessageKind, ResourceKey};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::ResourceRegistry;

/// Field-keyed validation messages, e.g. `{"email": ["invalid_email"]}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct Violations(BTreeMap<String, Vec<String>>);

impl Violations {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one message for a field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    /// Returns whether nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the messages recorded for a field.
    #[must_use]
    pub fn messages(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    /// Returns all fields with their messages.
    #[must_use]
    pub fn as_map(&self) -> &BTreeMap<String, Vec<String>> {
        &self.0
    }
}

/// Request context injected into a message next to its body.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MessageMetadata {
    /// Matched route parameters.
    pub route_params: BTreeMap<String, String>,
    /// Authenticated user, if any.
    pub user_id: Option<UserId>,
    /// Resource the route is scoped to.
    pub resource: Option<ResourceKey>,
    /// Record identifier taken from the path of a resource route.
    pub entity_id: Option<String>,
}

/// A validated unit of work.
#[async_trait]
pub trait Message: Send + Sync {
    /// Returns the message type.
    fn kind(&self) -> MessageKind;

    /// Checks the injected input; an empty result means the message may run.
    async fn validate(&self) -> AppResult<Violations>;

    /// Performs the work.
    async fn execute(&self) -> AppResult<()>;
}

/// Builds messages of one kind from a request body and metadata.
pub trait MessageFactory: Send + Sync {
    /// Creates a message with body and metadata injected.
    fn build(&self, body: Map<String, Value>, metadata: MessageMetadata) -> Box<dyn Message>;
}

/// Message factories keyed by message kind.
#[derive(Clone, Default)]
pub struct MessageRegistry {
    factories: HashMap<MessageKind, Arc<dyn MessageFactory>>,
}

impl MessageRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the factory for a kind, replacing any previous one.
    #[must_use]
    pub fn with_factory(mut self, kind: MessageKind, factory: Arc<dyn MessageFactory>) -> Self {
        self.factories.insert(kind, factory);
        self
    }

    /// Returns the factory for a kind.
    pub fn factory(&self, kind: MessageKind) -> AppResult<&Arc<dyn MessageFactory>> {
        self.factories
            .get(&kind)
            .ok_or_else(|| AppError::NotFound(format!("message '{kind}' is not registered")))
    }
}

/// Executes validated messages.
#[async_trait]
pub trait CommandBus: Send + Sync {
    /// Runs the message.
    async fn handle(&self, message: Box<dyn Message>) -> AppResult<()>;
}

/// Command bus that executes messages in the calling task.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineCommandBus;

#[async_trait]
impl CommandBus for InlineCommandBus {
    async fn handle(&self, message: Box<dyn Message>) -> AppResult<()> {
        let kind = message.kind();
        tracing::debug!(message = %kind, "executing message");

        match message.execute().await {
            Ok(()) => {
                tracing::info!(message = %kind, "message executed");
                Ok(())
            }
            Err(error) => {
                tracing::warn!(message = %kind, error = %error, "message failed");
                Err(error)
            }
        }
    }
}

/// Input of one dispatch.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DispatchRequest {
    /// Message named by the route.
    pub message: Option<MessageKind>,
    /// Resource named by the route, if it is resource scoped.
    pub resource: Option<ResourceKey>,
    /// Record identifier from the path.
    pub entity_id: Option<String>,
    /// Matched route parameters.
    pub route_params: BTreeMap<String, String>,
    /// Authenticated user.
    pub user_id: Option<UserId>,
    /// Decoded JSON body; non-object bodies are treated as empty.
    pub body: Value,
}

/// Result of a dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The message validated and was executed.
    Accepted,
    /// The message did not validate and was not executed.
    Rejected(Violations),
}

/// Resolves, validates and executes route messages.
#[derive(Clone)]
pub struct ResourceDispatcher {
    resources: Arc<ResourceRegistry>,
    messages: MessageRegistry,
    command_bus: Arc<dyn CommandBus>,
}

impl ResourceDispatcher {
    /// Creates a dispatcher.
    #[must_use]
    pub fn new(
        resources: Arc<ResourceRegistry>,
        messages: MessageRegistry,
        command_bus: Arc<dyn CommandBus>,
    ) -> Self {
        Self {
            resources,
            messages,
            command_bus,
        }
    }

    /// Dispatches one request.
    pub async fn dispatch(&self, request: DispatchRequest) -> AppResult<DispatchOutcome> {
        let Some(requested) = request.message else {
            return Err(AppError::Internal(
                "route does not name a message".to_owned(),
            ));
        };

        let kind = match request.resource {
            Some(resource) => self.resources.get(resource)?.resolve_message(requested),
            None => requested,
        };

        let body = match request.body {
            Value::Object(body) => body,
            _ => Map::new(),
        };

        let metadata = MessageMetadata {
            route_params: request.route_params,
            user_id: request.user_id,
            resource: request.resource,
            entity_id: request.resource.and(request.entity_id),
        };

        let message = self.messages.factory(kind)?.build(body, metadata);

        let violations = message.validate().await?;
        if !violations.is_empty() {
            tracing::debug!(message = %kind, ?violations, "message rejected");
            return Ok(DispatchOutcome::Rejected(violations));
        }

        self.command_bus.handle(message).await?;
        Ok(DispatchOutcome::Accepted)
    }
}

#[cfg(test)]
mod tests;
