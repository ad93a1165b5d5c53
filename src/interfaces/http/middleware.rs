//! Request guards: API version negotiation and authentication

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::application::{Credentials, IdentityService};
use crate::domain::api_key::looks_like_access_token;
use crate::domain::User;
use crate::infrastructure::database::{ApiKeyRepository, UserRepository};
use crate::interfaces::http::common::ApiError;

/// Header used to select the API version.
pub const ACCEPT_VERSION_HEADER: &str = "accept-version";
/// The only version this router serves.
pub const API_VERSION: &str = "v1";
/// Header carrying an API key access token.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Authentication state is concrete over the SeaORM repositories for Axum compatibility.
#[derive(Clone)]
pub struct AuthState {
    pub identity: Arc<IdentityService<UserRepository, ApiKeyRepository>>,
}

/// The authenticated caller, inserted into request extensions by
/// [`auth_middleware`].
///
/// Extract in handlers: `Extension(CurrentUser(user)): Extension<CurrentUser>`
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

/// Read credentials from `X-API-Key` or `Authorization: Bearer ...`.
/// A bearer value with the access-token prefix is treated as an API key,
/// anything else as a JWT.
fn extract_credentials(headers: &HeaderMap) -> Result<Credentials, &'static str> {
    if let Some(value) = headers.get(API_KEY_HEADER) {
        let token = value.to_str().map_err(|_| "Invalid API key")?.trim();
        return Ok(Credentials::AccessToken(token.to_string()));
    }

    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Err("Missing authentication token");
    };
    let token = value
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or("Invalid authentication token")?;

    if looks_like_access_token(token) {
        Ok(Credentials::AccessToken(token.to_string()))
    } else {
        Ok(Credentials::Jwt(token.to_string()))
    }
}

/// Authentication guard. Runs before every endpoint of the resource and
/// either attaches a [`CurrentUser`] or answers 401.
pub async fn auth_middleware(
    State(auth_state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let credentials = match extract_credentials(request.headers()) {
        Ok(credentials) => credentials,
        Err(message) => return ApiError::unauthenticated(message).into_response(),
    };

    match auth_state.identity.authenticate(&credentials).await {
        Ok(user) => {
            request.extensions_mut().insert(CurrentUser(user));
            next.run(request).await
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Header-based version negotiation. A missing header falls through to
/// the current version; an unknown one is refused with 406.
pub async fn accept_version_middleware(request: Request<Body>, next: Next) -> Response {
    let supported = match request.headers().get(ACCEPT_VERSION_HEADER) {
        None => true,
        Some(value) => value
            .to_str()
            .map(|v| v.trim() == API_VERSION)
            .unwrap_or(false),
    };

    if supported {
        next.run(request).await
    } else {
        ApiError::new(
            StatusCode::NOT_ACCEPTABLE,
            "The requested version is not supported.",
        )
        .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn api_key_header_wins() {
        let creds = extract_credentials(&headers(&[
            ("x-api-key", "ak_abc"),
            ("authorization", "Bearer eyJ.jwt.token"),
        ]));
        assert_eq!(creds, Ok(Credentials::AccessToken("ak_abc".into())));
    }

    #[test]
    fn bearer_access_token_is_an_api_key() {
        let creds = extract_credentials(&headers(&[("authorization", "Bearer ak_abc")]));
        assert_eq!(creds, Ok(Credentials::AccessToken("ak_abc".into())));
    }

    #[test]
    fn other_bearer_values_are_jwts() {
        let creds = extract_credentials(&headers(&[("authorization", "Bearer eyJ.jwt.token")]));
        assert_eq!(creds, Ok(Credentials::Jwt("eyJ.jwt.token".into())));
    }

    #[test]
    fn missing_or_malformed_headers_are_rejected() {
        assert_eq!(
            extract_credentials(&HeaderMap::new()),
            Err("Missing authentication token")
        );
        assert_eq!(
            extract_credentials(&headers(&[("authorization", "Basic dXNlcjpwYXNz")])),
            Err("Invalid authentication token")
        );
        assert_eq!(
            extract_credentials(&headers(&[("authorization", "Bearer ")])),
            Err("Invalid authentication token")
        );
    }
}
