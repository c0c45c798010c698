pub mod app_errors;
pub mod config;
mod doc;
pub mod modules;
pub mod routes;
pub mod utils;
pub mod validation;

use crate::app_errors::DefaultContext;
use crate::config::environment::Environment;
use crate::modules::AppState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use http::{StatusCode, Uri};
use serde_json::json;
use tracing::{error, info};
use utoipa::OpenApi;

pub const OPENAPI_URI: &str = "/api-doc/openapi.json";

pub async fn app(state: AppState) -> Router {
    let mut router = Router::new();

    info!("Environment: {}", state.environment);
    if state.environment.is_dev() {
        info!("Serving OpenAPI document at {OPENAPI_URI}");
        router = router.route(OPENAPI_URI, get(openapi_document));
    }

    info!("Spawning main router with: {state}");

    router
        .nest("/auth", routes::auth::router())
        .nest("/events", routes::events::router())
        .nest("/invitations", routes::invitations::router())
        .nest("/time_options", routes::votes::time_router())
        .nest("/location_options", routes::votes::location_router())
        .nest("/notifications", routes::notifications::router())
        .nest("/search", routes::search::router())
        .fallback(not_found)
        .with_state(state)
}

async fn openapi_document() -> impl IntoResponse {
    match doc::ApiDoc::openapi().to_json().dc() {
        Ok(body) => (
            StatusCode::OK,
            [(http::header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response(),
        Err(e) => {
            error!("Failed to render OpenAPI document: {e:?}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn not_found(State(environment): State<Environment>, uri: Uri) -> impl IntoResponse {
    let info = if environment.is_dev() && uri.path() == "/" {
        format!("Nothing here, see {OPENAPI_URI}")
    } else {
        "Not found".to_string()
    };
    (StatusCode::NOT_FOUND, Json(json!({ "error_info": info })))
}
