use axum::extract::{Extension, State};
use backoffice_domain::ResourceAction;

use crate::dto::{ApiReply, ClientConfigResponse};
use crate::handlers::session::session_response;
use crate::middleware::RequestSession;
use crate::state::AppState;

/// Project settings for the admin frontend, plus the signed-in user and the
/// resources it may list.
pub async fn config_handler(
    State(state): State<AppState>,
    Extension(session): Extension<RequestSession>,
) -> ApiReply<ClientConfigResponse> {
    let (user, resources) = match &session.user {
        Some(user) => {
            let resources = state
                .resources
                .keys()
                .into_iter()
                .filter(|key| {
                    state
                        .authorization_service
                        .has_permission(user, &ResourceAction::Index.permission(*key))
                })
                .map(|key| key.as_str())
                .collect();
            (Some(session_response(&state, user)), resources)
        }
        None => (None, Vec::new()),
    };

    ApiReply::Success(ClientConfigResponse {
        project: state.admin_config.as_ref().clone(),
        user,
        resources,
    })
}
