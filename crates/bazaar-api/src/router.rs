//! Route definitions for the Bazaar HTTP API.
//!
//! Business routes are organized by rate-limit class and mounted under
//! `/api`. Service info, health, version and limiter diagnostics sit at
//! the root, outside the limiter. Unmatched paths get a JSON 404.

use std::time::Duration;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post, put},
};
use tower_http::compression::CompressionLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use bazaar_auth::RouteClass;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
///
/// Receives the fully-constructed `AppState` and threads it through
/// every route via `.with_state(state)`.
pub fn build_router(state: AppState) -> Router {
    let server = &state.config.server;

    let api_routes = Router::new()
        .merge(register_routes(&state))
        .merge(login_routes(&state))
        .merge(api_routes(&state));

    let mut router = Router::new()
        .nest("/api", api_routes)
        .merge(health_routes())
        .fallback(handlers::health::route_not_found);

    let storage = &state.config.storage;
    if storage.provider == "local" && storage.local.public_base_url.starts_with('/') {
        router = router.nest_service(
            storage.local.public_base_url.trim_end_matches('/'),
            ServeDir::new(&storage.local.root_path),
        );
    }

    router
        .layer(DefaultBodyLimit::max(server.body_limit_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            server.request_timeout_seconds,
        )))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::envelope::error_envelope,
        ))
        .layer(axum_middleware::from_fn(
            middleware::logging::request_logging,
        ))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(middleware::cors::build_cors_layer(&server.cors))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state)
}

fn limited(state: &AppState, class: RouteClass, routes: Router<AppState>) -> Router<AppState> {
    routes.route_layer(axum_middleware::from_fn_with_state(
        (state.clone(), class),
        middleware::rate_limit::rate_limit,
    ))
}

/// Account creation.
fn register_routes(state: &AppState) -> Router<AppState> {
    limited(
        state,
        RouteClass::Register,
        Router::new().route("/register", post(handlers::auth::register)),
    )
}

/// Credential and refresh-token exchange.
fn login_routes(state: &AppState) -> Router<AppState> {
    limited(
        state,
        RouteClass::Login,
        Router::new()
            .route("/login", post(handlers::auth::login))
            .route("/refresh", post(handlers::auth::refresh)),
    )
}

/// Everything else under `/api`.
fn api_routes(state: &AppState) -> Router<AppState> {
    let routes = Router::new()
        // Session
        .route("/logout", post(handlers::auth::logout))
        .route("/me", get(handlers::auth::me))
        // Catalog
        .route("/products", get(handlers::product::list_products))
        .route(
            "/products/{id}",
            get(handlers::product::get_product).delete(handlers::product::delete_product),
        )
        .route(
            "/products/{id}/reviews",
            get(handlers::review::list_reviews).post(handlers::review::create_review),
        )
        .route("/add-product", post(handlers::product::add_product))
        .route("/my-products", get(handlers::product::my_products))
        // Checkout
        .route("/checkout", post(handlers::checkout::checkout))
        // Admin
        .route("/admin/users", get(handlers::admin::list_users))
        .route("/admin/users/{id}/role", put(handlers::admin::set_role))
        .route("/admin/audit", get(handlers::admin::list_audit));

    limited(state, RouteClass::Api, routes)
}

/// Service info, liveness, build info and limiter diagnostics.
fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::health::service_info))
        .route("/health", get(handlers::health::health))
        .route("/version", get(handlers::health::version))
        .route("/metrics/rate-limits", get(handlers::health::rate_limit_metrics))
}
