use std::collections::BTreeMap;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderMap, Uri};
use axum::response::AppendHeaders;
use backoffice_application::LoginOutcome;

use crate::dto::{ApiReply, FailureResponse, INVALID_CREDENTIALS, LoginRequest, UserResponse};
use crate::error::ApiResult;
use crate::session_cookie::{CookieHeaders, RequestOrigin};
use crate::state::AppState;

/// Signs a user in. Wrong credentials and unreadable payloads are reported
/// in the payload, without cookies.
pub async fn login_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<(CookieHeaders, ApiReply<UserResponse>)> {
    let payload = payload.map(|Json(payload)| payload).unwrap_or_default();
    let origin = RequestOrigin::from_parts(&headers, &uri);

    match state
        .auth_service
        .login(&payload.email, &payload.password, &origin.host)
        .await?
    {
        LoginOutcome::SignedIn { session, user } => {
            let cookies = state
                .session_cookies
                .set_cookie_headers(&session, origin.secure)?;
            Ok((cookies, ApiReply::Success(UserResponse::from(&user))))
        }
        LoginOutcome::InvalidCredentials => Ok((
            AppendHeaders(Vec::new()),
            ApiReply::Failure(FailureResponse::new(INVALID_CREDENTIALS, BTreeMap::new())),
        )),
    }
}

/// Replaces the session with an anonymous one.
pub async fn logout_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
) -> ApiResult<(CookieHeaders, ApiReply<()>)> {
    let origin = RequestOrigin::from_parts(&headers, &uri);
    let session = state.auth_service.logout(&origin.host)?;
    let cookies = state
        .session_cookies
        .set_cookie_headers(&session, origin.secure)?;

    tracing::info!("session signed out");
    Ok((cookies, ApiReply::Success(())))
}
