//! API key aggregate
//!
//! Contains the ApiKey record, the creation input and the repository interface.

pub mod model;
pub mod repository;

mod dto_create;

pub use dto_create::CreateApiKeyDto;
pub use model::{looks_like_access_token, ApiKey, NewApiKey, ACCESS_TOKEN_PREFIX};
pub use repository::ApiKeyRepositoryInterface;
