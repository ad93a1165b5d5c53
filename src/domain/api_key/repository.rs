use async_trait::async_trait;

use super::{ApiKey, NewApiKey};
use crate::domain::DomainResult;

#[async_trait]
pub trait ApiKeyRepositoryInterface: Send + Sync {
    /// Every persisted key, ordered by id.
    async fn list_api_keys(&self) -> DomainResult<Vec<ApiKey>>;

    /// Fails with `DomainError::NotFound` when no key has this id.
    async fn find_api_key(&self, id: i32) -> DomainResult<ApiKey>;
    async fn find_by_access_token(&self, access_token: &str) -> DomainResult<Option<ApiKey>>;
    async fn count_api_keys(&self) -> DomainResult<u64>;

    async fn create_api_key(&self, new_key: NewApiKey) -> DomainResult<ApiKey>;
    async fn delete_api_key(&self, api_key: ApiKey) -> DomainResult<()>;
}
