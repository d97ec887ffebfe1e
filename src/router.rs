use std::path::PathBuf;

use crate::docs::ApiDoc;
use crate::logging::logging_middleware;
use crate::metrics::metrics_middleware;
use crate::middleware::auth::require_admin;
use crate::modules::admit_cards::init_admit_cards_router;
use crate::modules::auth::init_auth_router;
use crate::modules::dashboard::init_dashboard_router;
use crate::modules::maintenance::init_maintenance_router;
use crate::modules::otp::init_otp_router;
use crate::modules::roll_numbers::init_roll_numbers_router;
use crate::modules::settings::{init_public_settings_router, init_settings_router};
use crate::modules::students::{init_public_students_router, init_students_router};
use crate::state::AppState;
use axum::http::{HeaderValue, Method};
use axum::{Json, Router, middleware, routing::get};
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as _};
use utoipa_swagger_ui::SwaggerUi;

async fn health() -> Json<Value> {
    Json(json!({ "status": "OK" }))
}

async fn root() -> &'static str {
    "Admit Desk API is running"
}

pub fn init_router(state: AppState) -> Router {
    let admin_only = || middleware::from_fn_with_state(state.clone(), require_admin);

    let admin_router = Router::new()
        .merge(init_settings_router())
        .merge(init_roll_numbers_router())
        .merge(init_admit_cards_router())
        .merge(init_dashboard_router())
        .merge(init_maintenance_router())
        .route_layer(admin_only())
        .merge(init_auth_router())
        .merge(init_public_settings_router());

    let students_router = init_students_router()
        .route_layer(admin_only())
        .merge(init_public_students_router(state.upload_config.max_file_size));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .route("/", get(root))
        .route("/health", get(health))
        .nest(
            "/api",
            Router::new()
                .nest("/students", students_router)
                .nest("/admin", admin_router)
                .nest("/otp", init_otp_router()),
        )
        .nest_service(
            "/uploads",
            ServeDir::new(PathBuf::from(&state.upload_config.dir)),
        )
        .with_state(state.clone())
        .layer({
            let allowed_origins: Vec<HeaderValue> = state
                .cors_config
                .allowed_origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(allowed_origins)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([
                    axum::http::header::AUTHORIZATION,
                    axum::http::header::CONTENT_TYPE,
                    axum::http::header::ACCEPT,
                ])
                .expose_headers([axum::http::header::CONTENT_DISPOSITION])
                .allow_credentials(true)
        })
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(logging_middleware))
}
