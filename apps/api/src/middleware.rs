use axum::extract::{Request, State};
use axum::http::Method;
use axum::middleware::Next;
use axum::response::Response;
use backoffice_core::AppError;
use backoffice_domain::{AdminUser, SessionData};

use crate::error::ApiResult;
use crate::session_cookie::{read_session_token, read_xsrf_header};
use crate::state::AppState;

/// Session read from the request cookie; empty for anonymous requests.
#[derive(Debug, Clone, Default)]
pub struct RequestSession {
    pub data: Option<SessionData>,
    pub user: Option<AdminUser>,
}

/// Signed-in user of a protected request.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub AdminUser);

/// Attaches the [`RequestSession`] of every request. Never rejects: a
/// missing, forged or expired cookie is an anonymous session.
pub async fn resolve_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let session = match read_session_token(request.headers()) {
        Some(token) => state
            .auth_service
            .resolve(&token)
            .await
            .map(|resolved| RequestSession {
                data: Some(resolved.data),
                user: resolved.user,
            })
            .unwrap_or_default(),
        None => RequestSession::default(),
    };

    request.extensions_mut().insert(session);
    next.run(request).await
}

pub async fn require_auth(mut request: Request, next: Next) -> ApiResult<Response> {
    let user = request
        .extensions()
        .get::<RequestSession>()
        .and_then(|session| session.user.clone())
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}

/// Double-submit check: state-changing requests must echo the session's
/// anti-forgery token in `X-XSRF-TOKEN`.
pub async fn require_xsrf_token(request: Request, next: Next) -> ApiResult<Response> {
    check_xsrf_token(&request, false)?;
    Ok(next.run(request).await)
}

/// Like [`require_xsrf_token`], but lets requests without any session
/// through so a first sign-in can obtain one.
pub async fn require_xsrf_token_if_session(request: Request, next: Next) -> ApiResult<Response> {
    check_xsrf_token(&request, true)?;
    Ok(next.run(request).await)
}

fn check_xsrf_token(request: &Request, allow_without_session: bool) -> Result<(), AppError> {
    if !is_state_changing_method(request.method()) {
        return Ok(());
    }

    let session = request
        .extensions()
        .get::<RequestSession>()
        .and_then(|session| session.data.as_ref());

    let Some(session) = session else {
        if allow_without_session {
            return Ok(());
        }
        tracing::debug!(path = %request.uri().path(), "state-changing request without session");
        return Err(AppError::Unauthorized("session required".to_owned()));
    };

    match read_xsrf_header(request.headers()) {
        Some(token) if token == session.xsrf_token() => Ok(()),
        _ => {
            tracing::debug!(path = %request.uri().path(), "anti-forgery token mismatch");
            Err(AppError::Unauthorized("invalid anti-forgery token".to_owned()))
        }
    }
}

fn is_state_changing_method(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}
