use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, State};
use backoffice_application::DispatchRequest;
use backoffice_domain::MessageKind;
use serde_json::Value;

use crate::dto::ApiReply;
use crate::error::ApiResult;
use crate::middleware::CurrentUser;
use crate::state::AppState;

/// Changes the email of the signed-in account.
pub async fn change_email_handler(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<ApiReply<()>> {
    let outcome = state
        .resource_dispatcher
        .dispatch(DispatchRequest {
            message: Some(MessageKind::ChangeEmail),
            user_id: Some(user.id()),
            body: body.map(|Json(body)| body).unwrap_or(Value::Null),
            ..DispatchRequest::default()
        })
        .await?;

    Ok(ApiReply::from_dispatch(outcome))
}
