//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod criteria;
mod list;
mod record;
mod resource;
mod security;
mod session;
mod user;
mod widget;

pub use criteria::{
    Criteria, CriteriaBuilder, MAX_LIMIT, Predicate, SortDirective, cap_limit, normalize_offset,
};
pub use list::{DefaultSort, ListElement, ListSchema, SortDirection};
pub use record::{AdminRecord, DELETED_AT_FIELD, ID_FIELD};
pub use resource::{MessageKind, ResourceAction, ResourceKey};
pub use security::{GLOBAL_WILDCARD, Role};
pub use session::SessionData;
pub use user::{AdminUser, EmailAddress, UserStatus, user_fields};
pub use widget::{Widget, WidgetCollector, WidgetPage, WidgetPosition, WidgetSize};
