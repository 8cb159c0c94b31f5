use axum::Router;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post, put};
use backoffice_core::AppError;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{handlers, middleware};

mod cors;


pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    let protected_routes = Router::new()
        .route("/api/session", get(handlers::session::session_handler))
        .route(
            "/api/dashboard",
            get(handlers::dashboard::dashboard_handler),
        )
        .route(
            "/api/account/email",
            post(handlers::account::change_email_handler),
        )
        .route(
            "/api/resource/{resource}",
            get(handlers::resource::index_handler).post(handlers::resource::create_handler),
        )
        .route(
            "/api/resource/{resource}/{id}",
            put(handlers::resource::update_handler).delete(handlers::resource::delete_handler),
        )
        .route(
            "/api/resource/{resource}/widgets/{position}/{page}",
            get(handlers::resource::widgets_handler),
        )
        .route_layer(from_fn(middleware::require_xsrf_token))
        .route_layer(from_fn(middleware::require_auth));

    let auth_routes = Router::new()
        .route("/api/auth/login", post(handlers::auth::login_handler))
        .route("/api/auth/logout", post(handlers::auth::logout_handler))
        .route_layer(from_fn(middleware::require_xsrf_token_if_session));

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route("/api/config", get(handlers::config::config_handler))
        .merge(auth_routes)
        .merge(protected_routes)
        .layer(from_fn_with_state(
            app_state.clone(),
            middleware::resolve_session,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors::build_cors_layer(frontend_url)?)
        .with_state(app_state))
}
