use std::sync::Arc;

use backoffice_application::{
    AuthService, AuthorizationService, ChangeEmailFactory, CreateRecordFactory, CreateUserFactory,
    DeleteRecordFactory, InlineCommandBus, MessageRegistry, PasswordHasher, ResourceDispatcher,
    ResourceListService, SessionService, SessionTokenCodec, UpdateRecordFactory, UpdateUserFactory,
    UserDirectory, WidgetService,
};
use backoffice_core::AppError;
use backoffice_domain::MessageKind;
use backoffice_infrastructure::{Argon2PasswordHasher, RecordUserDirectory};
use sqlx::PgPool;

use crate::api_config::ApiConfig;
use crate::session_cookie::SessionCookiePolicy;
use crate::state::AppState;

mod repositories;
mod resources;
mod security;
mod widgets;

/// Application state plus the account ports the dev seed writes through.
pub struct ApiServices {
    pub app_state: AppState,
    pub user_directory: Arc<dyn UserDirectory>,
    pub password_hasher: Arc<dyn PasswordHasher>,
}

/// Wires every service; records live in PostgreSQL when a pool is given,
/// in memory otherwise.
pub fn build_api_services(
    config: &ApiConfig,
    pool: Option<&PgPool>,
) -> Result<ApiServices, AppError> {
    let repositories = repositories::build_record_repositories(pool);
    let roles = security::default_roles()?;
    let shared_roles = Arc::new(roles.clone());

    let user_directory: Arc<dyn UserDirectory> =
        Arc::new(RecordUserDirectory::new(repositories.users.clone()));
    let password_hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2PasswordHasher::new());

    let resources = Arc::new(resources::build_resource_registry(&repositories)?);

    let messages = MessageRegistry::new()
        .with_factory(
            MessageKind::Create,
            Arc::new(CreateRecordFactory::new(resources.clone())),
        )
        .with_factory(
            MessageKind::Update,
            Arc::new(UpdateRecordFactory::new(resources.clone())),
        )
        .with_factory(
            MessageKind::Delete,
            Arc::new(DeleteRecordFactory::new(resources.clone())),
        )
        .with_factory(
            MessageKind::CreateUser,
            Arc::new(CreateUserFactory::new(
                user_directory.clone(),
                shared_roles.clone(),
                password_hasher.clone(),
            )),
        )
        .with_factory(
            MessageKind::UpdateUser,
            Arc::new(UpdateUserFactory::new(user_directory.clone(), shared_roles)),
        )
        .with_factory(
            MessageKind::ChangeEmail,
            Arc::new(ChangeEmailFactory::new(user_directory.clone())),
        );

    let session_codec = SessionTokenCodec::new(
        config.session_secret.clone(),
        config.session_lifetime_seconds,
    )?;
    let auth_service = AuthService::new(
        SessionService::new(session_codec),
        user_directory.clone(),
        password_hasher.clone(),
    );

    let app_state = AppState {
        auth_service,
        authorization_service: AuthorizationService::new(roles),
        resource_dispatcher: ResourceDispatcher::new(
            resources.clone(),
            messages,
            Arc::new(InlineCommandBus),
        ),
        resource_list_service: ResourceListService::new(resources.clone()),
        widget_service: WidgetService::new(
            resources.clone(),
            widgets::dashboard_widgets(&repositories),
        ),
        resources,
        admin_config: Arc::new(config.admin.clone()),
        session_cookies: SessionCookiePolicy::new(
            config.session_domain.clone(),
            config.session_lifetime_seconds,
        ),
    };

    Ok(ApiServices {
        app_state,
        user_directory,
        password_hasher,
    })
}
