use axum::extract::{Extension, State};
use backoffice_domain::AdminUser;

use crate::dto::{ApiReply, SessionResponse, UserResponse};
use crate::middleware::CurrentUser;
use crate::state::AppState;

pub async fn session_handler(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> ApiReply<SessionResponse> {
    ApiReply::Success(session_response(&state, &user))
}

pub(crate) fn session_response(state: &AppState, user: &AdminUser) -> SessionResponse {
    let permissions = state
        .authorization_service
        .role_for(user)
        .map(|role| role.permissions().to_vec())
        .unwrap_or_default();

    SessionResponse {
        user: UserResponse::from(user),
        permissions,
    }
}
