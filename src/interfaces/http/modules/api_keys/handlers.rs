//! API key resource handlers
//!
//! Thin wrappers that delegate to `ApiKeyService`. Authentication has
//! already happened in `auth_middleware`; the caller arrives as
//! `CurrentUser`.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

use super::dto::{parse_api_key_id, ApiKeyDto, CreateApiKeyRequest, UserDto};
use crate::application::ApiKeyService;
use crate::infrastructure::database::ApiKeyRepository;
use crate::interfaces::http::common::{ApiError, ErrorBody, ValidatedJson};
use crate::interfaces::http::middleware::CurrentUser;

/// API key handler state is concrete over `ApiKeyRepository` for Axum compatibility.
#[derive(Clone)]
pub struct ApiKeyHandlerState {
    pub api_key_service: Arc<ApiKeyService<ApiKeyRepository>>,
}

/// The authenticated caller
#[utoipa::path(
    get,
    path = "/v1/api_keys/user",
    tag = "API Keys",
    security(("api_key" = []), ("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = UserDto),
        (status = 401, description = "Not authenticated", body = ErrorBody)
    )
)]
pub async fn get_current_user(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Json<UserDto> {
    Json(UserDto::from(user))
}

/// List every API key
#[utoipa::path(
    get,
    path = "/v1/api_keys",
    tag = "API Keys",
    security(("api_key" = []), ("bearer_auth" = [])),
    responses(
        (status = 200, description = "All API keys", body = Vec<ApiKeyDto>),
        (status = 401, description = "Not authenticated", body = ErrorBody)
    )
)]
pub async fn list_api_keys(
    State(state): State<ApiKeyHandlerState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<Vec<ApiKeyDto>>, ApiError> {
    let keys = state.api_key_service.list_api_keys(&user).await?;
    Ok(Json(keys.into_iter().map(ApiKeyDto::from).collect()))
}

/// Create an API key for a user
#[utoipa::path(
    post,
    path = "/v1/api_keys",
    tag = "API Keys",
    security(("api_key" = []), ("bearer_auth" = [])),
    request_body = CreateApiKeyRequest,
    responses(
        (status = 201, description = "API key created", body = ApiKeyDto),
        (status = 400, description = "Missing or invalid user_id", body = ErrorBody),
        (status = 401, description = "Not authenticated", body = ErrorBody),
        (status = 415, description = "Body is not JSON", body = ErrorBody),
        (status = 422, description = "Referenced user does not exist", body = ErrorBody)
    )
)]
pub async fn create_api_key(
    State(state): State<ApiKeyHandlerState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    ValidatedJson(request): ValidatedJson<CreateApiKeyRequest>,
) -> Result<(StatusCode, Json<ApiKeyDto>), ApiError> {
    let dto = request.permit()?;
    let api_key = state.api_key_service.create_api_key(&user, dto).await?;
    Ok((StatusCode::CREATED, Json(ApiKeyDto::from(api_key))))
}

/// Fetch one API key
#[utoipa::path(
    get,
    path = "/v1/api_keys/{api_key_id}",
    tag = "API Keys",
    security(("api_key" = []), ("bearer_auth" = [])),
    params(("api_key_id" = i32, Path, description = "API key ID")),
    responses(
        (status = 200, description = "API key", body = ApiKeyDto),
        (status = 400, description = "api_key_id is not an integer", body = ErrorBody),
        (status = 401, description = "Not authenticated", body = ErrorBody),
        (status = 404, description = "Not found", body = ErrorBody)
    )
)]
pub async fn get_api_key(
    State(state): State<ApiKeyHandlerState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(api_key_id): Path<String>,
) -> Result<Json<ApiKeyDto>, ApiError> {
    let id = parse_api_key_id(&api_key_id)?;
    let api_key = state.api_key_service.get_api_key(&user, id).await?;
    Ok(Json(ApiKeyDto::from(api_key)))
}

/// Delete an API key
#[utoipa::path(
    delete,
    path = "/v1/api_keys/{api_key_id}",
    tag = "API Keys",
    security(("api_key" = []), ("bearer_auth" = [])),
    params(("api_key_id" = i32, Path, description = "API key ID")),
    responses(
        (status = 204, description = "API key deleted"),
        (status = 400, description = "api_key_id is not an integer", body = ErrorBody),
        (status = 401, description = "Not authenticated", body = ErrorBody),
        (status = 404, description = "Not found", body = ErrorBody)
    )
)]
pub async fn delete_api_key(
    State(state): State<ApiKeyHandlerState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(api_key_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_api_key_id(&api_key_id)?;
    state.api_key_service.delete_api_key(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
