use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use backoffice_core::{AppError, AppResult, UserId};
use backoffice_domain::{ListSchema, MessageKind, ResourceKey};
use serde_json::{Map, Value, json};
use tokio::sync::Mutex;

use crate::test_support::FakeRecordRepository;
use crate::{ResourceDefinition, ResourceRegistry};

use super::{
    CommandBus, DispatchOutcome, DispatchRequest, Message, MessageFactory, MessageMetadata,
    MessageRegistry, ResourceDispatcher, Violations,
};

type Built = Arc<Mutex<Vec<(MessageKind, Map<String, Value>, MessageMetadata)>>>;

struct RecordingMessage {
    kind: MessageKind,
    violations: Violations,
}

#[async_trait]
impl Message for RecordingMessage {
    fn kind(&self) -> MessageKind {
        self.kind
    }

    async fn validate(&self) -> AppResult<Violations> {
        Ok(self.violations.clone())
    }

    async fn execute(&self) -> AppResult<()> {
        Ok(())
    }
}

struct RecordingFactory {
    kind: MessageKind,
    built: Built,
    violations: Violations,
}

impl MessageFactory for RecordingFactory {
    fn build(&self, body: Map<String, Value>, metadata: MessageMetadata) -> Box<dyn Message> {
        if let Ok(mut built) = self.built.try_lock() {
            built.push((self.kind, body, metadata));
        }
        Box::new(RecordingMessage {
            kind: self.kind,
            violations: self.violations.clone(),
        })
    }
}

#[derive(Default)]
struct RecordingBus {
    handled: Mutex<Vec<MessageKind>>,
}

#[async_trait]
impl CommandBus for RecordingBus {
    async fn handle(&self, message: Box<dyn Message>) -> AppResult<()> {
        self.handled.lock().await.push(message.kind());
        message.execute().await
    }
}

struct Harness {
    dispatcher: ResourceDispatcher,
    built: Built,
    bus: Arc<RecordingBus>,
}

fn harness(rejecting: Option<MessageKind>) -> Harness {
    let built: Built = Arc::default();
    let mut messages = MessageRegistry::new();
    for kind in [
        MessageKind::Create,
        MessageKind::Update,
        MessageKind::Delete,
        MessageKind::CreateUser,
        MessageKind::UpdateUser,
        MessageKind::ChangeEmail,
    ] {
        let mut violations = Violations::new();
        if rejecting == Some(kind) {
            violations.add("email", "invalid_email");
        }
        messages = messages.with_factory(
            kind,
            Arc::new(RecordingFactory {
                kind,
                built: built.clone(),
                violations,
            }),
        );
    }

    let schema = ListSchema::new(Vec::new(), None);
    let Ok(schema) = schema else {
        panic!("schema should be valid");
    };
    let user = ResourceDefinition::new(
        ResourceKey::User,
        Arc::new(FakeRecordRepository::default()),
        schema.clone(),
    )
    .with_update_message(MessageKind::UpdateUser);
    let media = ResourceDefinition::new(
        ResourceKey::Media,
        Arc::new(FakeRecordRepository::default()),
        schema,
    );
    let registry = ResourceRegistry::builder()
        .register(user)
        .and_then(|builder| builder.register(media));
    let Ok(registry) = registry else {
        panic!("registry should build");
    };

    let bus = Arc::new(RecordingBus::default());
    Harness {
        dispatcher: ResourceDispatcher::new(Arc::new(registry.build()), messages, bus.clone()),
        built,
        bus,
    }
}

#[tokio::test]
async fn resource_override_replaces_generic_update() {
    let harness = harness(None);

    let outcome = harness
        .dispatcher
        .dispatch(DispatchRequest {
            message: Some(MessageKind::Update),
            resource: Some(ResourceKey::User),
            entity_id: Some("u-1".to_owned()),
            body: json!({"email": "new@example.com"}),
            ..DispatchRequest::default()
        })
        .await;

    assert!(matches!(outcome, Ok(DispatchOutcome::Accepted)));
    assert_eq!(
        harness.bus.handled.lock().await.as_slice(),
        &[MessageKind::UpdateUser]
    );
}

#[tokio::test]
async fn resource_without_override_keeps_generic_message() {
    let harness = harness(None);

    let outcome = harness
        .dispatcher
        .dispatch(DispatchRequest {
            message: Some(MessageKind::Update),
            resource: Some(ResourceKey::Media),
            entity_id: Some("m-1".to_owned()),
            ..DispatchRequest::default()
        })
        .await;

    assert!(matches!(outcome, Ok(DispatchOutcome::Accepted)));
    assert_eq!(
        harness.bus.handled.lock().await.as_slice(),
        &[MessageKind::Update]
    );
}

#[tokio::test]
async fn metadata_carries_user_resource_and_id() {
    let harness = harness(None);
    let user_id = UserId::new();
    let route_params = BTreeMap::from([("resource".to_owned(), "media".to_owned())]);

    let outcome = harness
        .dispatcher
        .dispatch(DispatchRequest {
            message: Some(MessageKind::Delete),
            resource: Some(ResourceKey::Media),
            entity_id: Some("m-9".to_owned()),
            route_params: route_params.clone(),
            user_id: Some(user_id),
            body: json!({"title": "x"}),
        })
        .await;
    assert!(outcome.is_ok());

    let built = harness.built.lock().await;
    assert_eq!(built.len(), 1);
    let (_, body, metadata) = &built[0];
    assert_eq!(body.get("title"), Some(&json!("x")));
    assert_eq!(
        metadata,
        &MessageMetadata {
            route_params,
            user_id: Some(user_id),
            resource: Some(ResourceKey::Media),
            entity_id: Some("m-9".to_owned()),
        }
    );
}

#[tokio::test]
async fn account_route_has_no_resource_metadata() {
    let harness = harness(None);

    let outcome = harness
        .dispatcher
        .dispatch(DispatchRequest {
            message: Some(MessageKind::ChangeEmail),
            entity_id: Some("ignored".to_owned()),
            body: json!(["not", "an", "object"]),
            ..DispatchRequest::default()
        })
        .await;
    assert!(matches!(outcome, Ok(DispatchOutcome::Accepted)));

    let built = harness.built.lock().await;
    let (_, body, metadata) = &built[0];
    assert!(body.is_empty());
    assert_eq!(metadata.resource, None);
    assert_eq!(metadata.entity_id, None);
    assert_eq!(metadata.user_id, None);
}

#[tokio::test]
async fn violations_skip_the_command_bus() {
    let harness = harness(Some(MessageKind::ChangeEmail));

    let outcome = harness
        .dispatcher
        .dispatch(DispatchRequest {
            message: Some(MessageKind::ChangeEmail),
            body: json!({"email": "bad"}),
            ..DispatchRequest::default()
        })
        .await;

    let Ok(DispatchOutcome::Rejected(violations)) = outcome else {
        panic!("dispatch should be rejected");
    };
    assert_eq!(violations.messages("email"), &["invalid_email".to_owned()]);
    assert!(harness.bus.handled.lock().await.is_empty());
}

#[tokio::test]
async fn missing_message_is_an_error() {
    let harness = harness(None);

    let outcome = harness
        .dispatcher
        .dispatch(DispatchRequest::default())
        .await;

    assert!(matches!(outcome, Err(AppError::Internal(_))));
}

#[tokio::test]
async fn unregistered_message_is_not_found() {
    let mut harness = harness(None);
    harness.dispatcher = ResourceDispatcher::new(
        Arc::new(ResourceRegistry::default()),
        MessageRegistry::new(),
        harness.bus.clone(),
    );

    let outcome = harness
        .dispatcher
        .dispatch(DispatchRequest {
            message: Some(MessageKind::ChangeEmail),
            ..DispatchRequest::default()
        })
        .await;

    assert!(matches!(outcome, Err(AppError::NotFound(_))));
}

#[test]
fn violations_serialize_as_field_map() {
    let mut violations = Violations::new();
    violations.add("email", "invalid_email");
    violations.add("email", "email_already_taken");
    violations.add("emailRepeat", "invalid_email");

    let value = serde_json::to_value(&violations);
    assert!(value.is_ok());
    assert_eq!(
        value.unwrap_or_default(),
        json!({
            "email": ["invalid_email", "email_already_taken"],
            "emailRepeat": ["invalid_email"],
        })
    );
}
