//! Authentication guard logic
//!
//! Turns the credentials presented with a request into the `User` they
//! belong to. Every failure is reported as `DomainError::Unauthenticated`
//! except storage failures, which propagate unchanged.

use std::sync::Arc;

use jsonwebtoken::errors::ErrorKind;
use tracing::debug;

use crate::domain::{ApiKeyRepositoryInterface, DomainError, DomainResult, User, UserRepositoryInterface};
use crate::infrastructure::crypto::jwt::{verify_token, JwtConfig};

/// Credentials extracted from a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    /// An API key access token
    AccessToken(String),
    /// A signed JWT bearer token
    Jwt(String),
}

pub struct IdentityService<U: UserRepositoryInterface, K: ApiKeyRepositoryInterface> {
    users: Arc<U>,
    api_keys: Arc<K>,
    jwt_config: JwtConfig,
}

impl<U: UserRepositoryInterface, K: ApiKeyRepositoryInterface> IdentityService<U, K> {
    pub fn new(users: Arc<U>, api_keys: Arc<K>, jwt_config: JwtConfig) -> Self {
        Self {
            users,
            api_keys,
            jwt_config,
        }
    }

    pub async fn authenticate(&self, credentials: &Credentials) -> DomainResult<User> {
        let user_id = match credentials {
            Credentials::AccessToken(token) => {
                let api_key = self
                    .api_keys
                    .find_by_access_token(token)
                    .await?
                    .ok_or_else(|| unauthenticated("Invalid API key"))?;
                api_key.user_id
            }
            Credentials::Jwt(token) => {
                let claims = verify_token(token, &self.jwt_config).map_err(|e| {
                    debug!("JWT rejected: {}", e);
                    match e.kind() {
                        ErrorKind::ExpiredSignature => unauthenticated("Token has expired"),
                        _ => unauthenticated("Invalid authentication token"),
                    }
                })?;
                claims
                    .user_id()
                    .ok_or_else(|| unauthenticated("Invalid authentication token"))?
            }
        };

        self.users
            .get_user_by_id(user_id)
            .await?
            .ok_or_else(|| unauthenticated("User not found"))
    }
}

fn unauthenticated(message: &str) -> DomainError {
    DomainError::Unauthenticated(message.to_string())
}
