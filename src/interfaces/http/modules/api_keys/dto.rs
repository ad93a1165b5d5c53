//! API key DTOs
//!
//! Presenters for the v1 representation of API keys and users, and the
//! allow-listed input schema for key creation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::domain::{ApiKey, CreateApiKeyDto, DomainError, DomainResult, User};

/// API key representation
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiKeyDto {
    pub id: i32,
    pub user_id: i32,
    pub access_token: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ApiKey> for ApiKeyDto {
    fn from(k: ApiKey) -> Self {
        Self {
            id: k.id,
            user_id: k.user_id,
            access_token: k.access_token,
            created_at: k.created_at,
            updated_at: k.updated_at,
        }
    }
}

/// User representation
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserDto {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserDto {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            email: u.email,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

/// Create API key request. Fields other than `user_id` are ignored.
///
/// `user_id` is kept as a raw JSON value so that a wrong type is reported
/// as a validation failure rather than a JSON parse error.
#[derive(Debug, ToSchema)]
#[schema(example = json!({ "user_id": 42 }))]
pub struct CreateApiKeyRequest {
    #[schema(value_type = i32, required = true)]
    pub user_id: Option<Value>,
}

/// Parameters are read by name from a JSON object only. Any other body
/// (array, string, number, null) carries no parameters, so `user_id`
/// is reported missing.
impl<'de> Deserialize<'de> for CreateApiKeyRequest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let user_id = match Value::deserialize(deserializer)? {
            Value::Object(mut params) => params.remove("user_id").filter(|v| !v.is_null()),
            _ => None,
        };
        Ok(Self { user_id })
    }
}

impl Validate for CreateApiKeyRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        match &self.user_id {
            None => errors.add("user_id", field_error("required", "is missing")),
            Some(value) if coerce_integer(value).is_none() => {
                errors.add("user_id", field_error("integer", "is invalid"))
            }
            Some(_) => {}
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl CreateApiKeyRequest {
    /// Convert the permitted parameters into the creation input.
    pub fn permit(self) -> DomainResult<CreateApiKeyDto> {
        let user_id = self
            .user_id
            .as_ref()
            .and_then(coerce_integer)
            .ok_or_else(|| DomainError::Validation("user_id is invalid".into()))?;

        Ok(CreateApiKeyDto { user_id })
    }
}

fn field_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

/// Integer coercion for typed parameters: JSON integers and decimal
/// strings that fit in `i32` are accepted.
pub fn coerce_integer(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n.as_i64().and_then(|n| i32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Parse the `api_key_id` path segment.
pub fn parse_api_key_id(raw: &str) -> DomainResult<i32> {
    raw.parse()
        .map_err(|_| DomainError::Validation("api_key_id is invalid".into()))
}
