//! API router and OpenAPI document

use std::sync::Arc;
use std::time::Instant;

use axum::{
    http::Uri,
    middleware,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use super::common::{ApiError, ErrorBody};
use super::middleware::{accept_version_middleware, auth_middleware, AuthState};
use super::modules::api_keys::{self, ApiKeyHandlerState};
use super::modules::health::{self, HealthState};
use super::modules::metrics::{http_metrics_middleware, prometheus_metrics, MetricsState};
use super::modules::request_id::request_id_middleware;
use crate::application::{ApiKeyService, IdentityService};
use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::infrastructure::database::{ApiKeyRepository, UserRepository};

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT or API key access token"))
                        .build(),
                ),
            );
            components.add_security_scheme(
                "api_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-API-Key"))),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        api_keys::get_current_user,
        api_keys::list_api_keys,
        api_keys::create_api_key,
        api_keys::get_api_key,
        api_keys::delete_api_key,
    ),
    components(
        schemas(
            ErrorBody,
            health::HealthResponse,
            health::ComponentHealth,
            api_keys::ApiKeyDto,
            api_keys::UserDto,
            api_keys::CreateApiKeyRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Server health check"),
        (name = "API Keys", description = "API key management"),
    ),
    info(
        title = "API V1",
        version = "0.0.1",
        description = "Versioned API for managing API keys",
    )
)]
pub struct ApiDoc;

/// `GET /v1/swagger_doc`
async fn swagger_doc() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

async fn not_found(uri: Uri) -> impl IntoResponse {
    ApiError::not_found(format!("Route not found: {}", uri.path()))
}

/// Build the HTTP application.
///
/// The `metrics` handle is optional: when absent `/metrics` is not routed,
/// while request counters are still recorded into whatever recorder is
/// installed.
pub fn create_api_router(
    db: DatabaseConnection,
    jwt_config: JwtConfig,
    metrics: Option<PrometheusHandle>,
) -> Router {
    let user_repo = Arc::new(UserRepository::new(db.clone()));
    let api_key_repo = Arc::new(ApiKeyRepository::new(db.clone()));

    let auth_state = AuthState {
        identity: Arc::new(IdentityService::new(
            user_repo,
            api_key_repo.clone(),
            jwt_config,
        )),
    };
    let api_key_state = ApiKeyHandlerState {
        api_key_service: Arc::new(ApiKeyService::new(api_key_repo)),
    };

    // API key routes (protected)
    let api_key_routes = Router::new()
        .route(
            "/",
            get(api_keys::list_api_keys).post(api_keys::create_api_key),
        )
        .route("/user", get(api_keys::get_current_user))
        .route(
            "/{api_key_id}",
            get(api_keys::get_api_key).delete(api_keys::delete_api_key),
        )
        .route_layer(middleware::from_fn_with_state(auth_state, auth_middleware))
        .with_state(api_key_state);

    // Version negotiation wraps auth, so an unsupported version is refused
    // before credentials are looked at. Operational endpoints are unversioned.
    let v1_routes = Router::new()
        .nest("/v1/api_keys", api_key_routes)
        .route("/v1/swagger_doc", get(swagger_doc))
        .route_layer(middleware::from_fn(accept_version_middleware));

    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .with_state(HealthState {
            db,
            started_at: Arc::new(Instant::now()),
        });

    let mut router = Router::new().merge(v1_routes).merge(health_routes);

    if let Some(handle) = metrics {
        router = router.merge(
            Router::new()
                .route("/metrics", get(prometheus_metrics))
                .with_state(MetricsState { handle }),
        );
    }

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    router
        .route_layer(middleware::from_fn(http_metrics_middleware))
        .fallback(not_found)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
