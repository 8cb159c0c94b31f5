use std::collections::BTreeMap;

use axum::Json;
use axum::response::{IntoResponse, Response};
use backoffice_application::{DispatchOutcome, ListResult};
use backoffice_domain::{AdminUser, Widget};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api_config::AdminConfig;

/// Error code of rejected message input.
pub const INVALID_INPUT: &str = "invalid.input";

/// Error code of a failed sign-in.
pub const INVALID_CREDENTIALS: &str = "credentials.invalid";

/// Health response payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Successful envelope.
#[derive(Debug, Serialize)]
pub struct SuccessResponse<T> {
    success: bool,
    result: T,
}

/// In-payload failure envelope, sent with HTTP 200.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureResponse {
    success: bool,
    notifications: Vec<String>,
    error_code: String,
    error_messages: BTreeMap<String, Vec<String>>,
}

impl FailureResponse {
    pub fn new(error_code: &str, error_messages: BTreeMap<String, Vec<String>>) -> Self {
        Self {
            success: false,
            notifications: Vec::new(),
            error_code: error_code.to_owned(),
            error_messages,
        }
    }
}

/// Reply of an admin endpoint: a result or a reported input failure.
#[derive(Debug)]
pub enum ApiReply<T> {
    Success(T),
    Failure(FailureResponse),
}

impl ApiReply<()> {
    pub fn from_dispatch(outcome: DispatchOutcome) -> Self {
        match outcome {
            DispatchOutcome::Accepted => Self::Success(()),
            DispatchOutcome::Rejected(violations) => Self::Failure(FailureResponse::new(
                INVALID_INPUT,
                violations.as_map().clone(),
            )),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiReply<T> {
    fn into_response(self) -> Response {
        match self {
            Self::Success(result) => Json(SuccessResponse {
                success: true,
                result,
            })
            .into_response(),
            Self::Failure(failure) => Json(failure).into_response(),
        }
    }
}

/// Incoming sign-in payload.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// API representation of a signed-in user.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub role: String,
    pub status: &'static str,
}

impl From<&AdminUser> for UserResponse {
    fn from(value: &AdminUser) -> Self {
        Self {
            id: value.id().to_string(),
            email: value.email().as_str().to_owned(),
            role: value.role().to_owned(),
            status: value.status().as_str(),
        }
    }
}

/// Current session payload.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: UserResponse,
    pub permissions: Vec<String>,
}

/// Client configuration payload.
#[derive(Debug, Serialize)]
pub struct ClientConfigResponse {
    pub project: AdminConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<SessionResponse>,
    pub resources: Vec<&'static str>,
}

/// Paged resource list.
#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub items: Vec<Value>,
    pub meta: ListMeta,
}

/// Paging metadata of a resource list.
#[derive(Debug, Serialize)]
pub struct ListMeta {
    pub count: usize,
}

impl From<ListResult> for ListResponse {
    fn from(value: ListResult) -> Self {
        Self {
            items: value.items,
            meta: ListMeta { count: value.count },
        }
    }
}

/// Widgets of one page slot.
#[derive(Debug, Serialize)]
pub struct WidgetsResponse {
    pub items: Vec<Widget>,
}
