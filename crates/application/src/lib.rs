//! Application services and ports.

#![forbid(unsafe_code)]

mod account_messages;
mod auth_service;
mod authorization_service;
mod list_query;
mod record_ports;
mod resource_dispatch;
mod resource_list_service;
mod resource_messages;
mod resource_registry;
mod session_token;
mod widget_service;

#[cfg(test)]
mod test_support;

pub use account_messages::{
    ChangeEmailFactory, CreateUserFactory, EMAIL_REPEAT_FIELD, PASSWORD_FIELD, UpdateUserFactory,
};
pub use auth_service::{AuthService, IssuedSession, LoginOutcome, ResolvedSession, SessionService};
pub use authorization_service::{AuthorizationService, RoleRegistry};
pub use list_query::{MAX_KEY_DEPTH, QueryParams, QueryValue, build_criteria, coerce_integer};
pub use record_ports::{PasswordHasher, RecordRepository, UserDirectory};
pub use resource_dispatch::{
    CommandBus, DispatchOutcome, DispatchRequest, InlineCommandBus, Message, MessageFactory,
    MessageMetadata, MessageRegistry, ResourceDispatcher, Violations,
};
pub use resource_list_service::{ListResult, ResourceListService};
pub use resource_messages::{
    CREATED_AT_FIELD, CreateRecordFactory, DeleteRecordFactory, UPDATED_AT_FIELD,
    UpdateRecordFactory,
};
pub use resource_registry::{
    ResourceDefinition, ResourceRegistry, ResourceRegistryBuilder, WidgetProvider,
};
pub use session_token::{DEFAULT_SESSION_LIFETIME_SECONDS, MIN_SECRET_LENGTH, SessionTokenCodec};
pub use widget_service::WidgetService;
