use std::collections::BTreeMap;
use std::str::FromStr;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, Path, RawQuery, State};
use backoffice_application::{DispatchRequest, QueryParams};
use backoffice_core::{AppError, AppResult};
use backoffice_domain::{
    AdminUser, MessageKind, ResourceAction, ResourceKey, WidgetPage, WidgetPosition,
};
use serde_json::Value;

use crate::dto::{ApiReply, ListResponse, WidgetsResponse};
use crate::error::ApiResult;
use crate::middleware::CurrentUser;
use crate::state::AppState;

type RouteParams = BTreeMap<String, String>;

/// Lists records: `?sort[field]=ASC&filter[field]=text&search=text&offset=0&limit=50`.
pub async fn index_handler(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(params): Path<RouteParams>,
    RawQuery(query): RawQuery,
) -> ApiResult<ApiReply<ListResponse>> {
    let resource = authorize(&state, &user, &params, ResourceAction::Index)?;
    let query = QueryParams::parse(query.as_deref().unwrap_or_default());

    let result = state.resource_list_service.list(resource, &query).await?;

    Ok(ApiReply::Success(ListResponse::from(result)))
}

pub async fn create_handler(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(params): Path<RouteParams>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<ApiReply<()>> {
    dispatch(
        &state,
        &user,
        params,
        ResourceAction::Create,
        MessageKind::Create,
        json_body(body),
    )
    .await
}

pub async fn update_handler(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(params): Path<RouteParams>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<ApiReply<()>> {
    dispatch(
        &state,
        &user,
        params,
        ResourceAction::Update,
        MessageKind::Update,
        json_body(body),
    )
    .await
}

pub async fn delete_handler(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(params): Path<RouteParams>,
) -> ApiResult<ApiReply<()>> {
    dispatch(
        &state,
        &user,
        params,
        ResourceAction::Delete,
        MessageKind::Delete,
        Value::Null,
    )
    .await
}

/// Widgets of one resource page slot, e.g. `/widgets/above/list`.
pub async fn widgets_handler(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(params): Path<RouteParams>,
) -> ApiResult<ApiReply<WidgetsResponse>> {
    let resource = authorize(&state, &user, &params, ResourceAction::Widgets)?;
    let position = WidgetPosition::from_str(route_param(&params, "position")?)?;
    let page = WidgetPage::from_str(route_param(&params, "page")?)?;

    let items = state
        .widget_service
        .resource_widgets(resource, page, position, &user)
        .await?;

    Ok(ApiReply::Success(WidgetsResponse { items }))
}

async fn dispatch(
    state: &AppState,
    user: &AdminUser,
    params: RouteParams,
    action: ResourceAction,
    message: MessageKind,
    body: Value,
) -> ApiResult<ApiReply<()>> {
    let resource = authorize(state, user, &params, action)?;

    let outcome = state
        .resource_dispatcher
        .dispatch(DispatchRequest {
            message: Some(message),
            resource: Some(resource),
            entity_id: params.get("id").cloned(),
            route_params: params,
            user_id: Some(user.id()),
            body,
        })
        .await?;

    Ok(ApiReply::from_dispatch(outcome))
}

/// Resolves the route's resource and checks `admin.api.<resource>.<action>`.
fn authorize(
    state: &AppState,
    user: &AdminUser,
    params: &RouteParams,
    action: ResourceAction,
) -> AppResult<ResourceKey> {
    let resource = ResourceKey::from_str(route_param(params, "resource")?)?;
    state
        .authorization_service
        .require_permission(user, &action.permission(resource))?;

    Ok(resource)
}

fn route_param<'a>(params: &'a RouteParams, name: &str) -> AppResult<&'a str> {
    params
        .get(name)
        .map(String::as_str)
        .ok_or_else(|| AppError::Internal(format!("route is missing the '{name}' parameter")))
}

fn json_body(body: Result<Json<Value>, JsonRejection>) -> Value {
    match body {
        Ok(Json(body)) => body,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "unreadable request body treated as empty");
            Value::Null
        }
    }
}
