use std::sync::Arc;

use backoffice_application::{
    AuthService, AuthorizationService, ResourceDispatcher, ResourceListService, ResourceRegistry,
    WidgetService,
};

use crate::api_config::AdminConfig;
use crate::session_cookie::SessionCookiePolicy;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub authorization_service: AuthorizationService,
    pub resource_dispatcher: ResourceDispatcher,
    pub resource_list_service: ResourceListService,
    pub widget_service: WidgetService,
    pub resources: Arc<ResourceRegistry>,
    pub admin_config: Arc<AdminConfig>,
    pub session_cookies: SessionCookiePolicy,
}
