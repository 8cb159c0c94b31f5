use axum::extract::{Extension, State};

use crate::dto::{ApiReply, WidgetsResponse};
use crate::error::ApiResult;
use crate::middleware::CurrentUser;
use crate::state::AppState;

pub async fn dashboard_handler(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> ApiResult<ApiReply<WidgetsResponse>> {
    let items = state.widget_service.dashboard_widgets(&user).await?;

    Ok(ApiReply::Success(WidgetsResponse { items }))
}
