//! Domain layer: records and the repository contracts the service
//! layer depends on.

pub mod api_key;
pub mod user;

pub use api_key::{ApiKey, ApiKeyRepositoryInterface, CreateApiKeyDto, NewApiKey};
pub use user::{CreateUserDto, User, UserRepositoryInterface};

pub use crate::shared::{DomainError, DomainResult, PersistenceError};
