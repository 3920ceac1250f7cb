//! Route definitions and router setup
//!
//! Configures all API routes and middleware.

mod account;
mod tasks;
mod time_trackers;
mod users;

use crate::auth::authenticate;
use crate::config::Settings;
use crate::error::AppError;
use crate::state::SharedState;
use axum::{
    extract::{FromRequest, Request},
    http::{header, HeaderMap, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::get,
    Json, Router,
};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    request_id::MakeRequestUuid,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
    ServiceBuilderExt,
};
use tracing::Level;
use validator::Validate;

/// Create the application router with all routes and middleware
pub fn create_router(state: SharedState, settings: &Settings) -> Router {
    // Build CORS layer
    let cors = build_cors_layer(settings);

    // Build tracing/logging layer
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    // Build middleware stack
    let middleware = ServiceBuilder::new()
        .set_x_request_id(MakeRequestUuid)
        .layer(trace_layer)
        .layer(CompressionLayer::new())
        .layer(cors)
        .propagate_x_request_id();

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_v1_routes(state.clone()))
        .fallback(route_not_found)
        .layer(middleware)
        .with_state(state)
}

/// Version 1 of the API. Everything except login, register and the
/// welcome message sits behind bearer authentication.
fn api_v1_routes(state: SharedState) -> Router<SharedState> {
    let protected = Router::new()
        .nest("/timeTrackers", time_trackers::routes())
        .nest("/users", users::routes())
        .nest("/tasks", tasks::routes())
        .route_layer(from_fn_with_state(state, authenticate));

    Router::new()
        .route("/", get(welcome))
        .merge(account::routes())
        .merge(protected)
}

/// Build CORS layer from settings
fn build_cors_layer(settings: &Settings) -> CorsLayer {
    let origins: Vec<HeaderValue> = settings
        .cors
        .allowed_origins
        .iter()
        .filter_map(|s| s.parse().ok())
        .collect();

    let cors = if origins.is_empty() {
        CorsLayer::new().allow_origin(Any)
    } else {
        CorsLayer::new().allow_origin(origins)
    };

    cors.allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .expose_headers([header::LOCATION])
        .max_age(Duration::from_secs(3600))
}

/// Health check endpoint
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "success": true,
        "message": "Server is running fine.",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[derive(Serialize)]
struct WelcomeResponse {
    message: &'static str,
}

async fn welcome() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: "Hooray! Welcome to version 1 of this very simple RESTful API!",
    })
}

async fn route_not_found() -> AppError {
    AppError::NotFound("The requested resource was not found.".to_string())
}

/// JSON body that has been deserialized and passed its `validator` rules.
/// Both kinds of failure are reported as 400.
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(request, state).await?;
        value.validate()?;
        Ok(Self(value))
    }
}

/// Absolute URL of a freshly created resource, built from the request's
/// Host header and the collection path it was posted to.
pub(crate) fn location(headers: &HeaderMap, collection_path: &str, id: impl std::fmt::Display) -> String {
    let path = format!("{}/{}", collection_path.trim_end_matches('/'), id);
    match headers.get(header::HOST).and_then(|h| h.to_str().ok()) {
        Some(host) => format!("http://{}{}", host, path),
        None => path,
    }
}
