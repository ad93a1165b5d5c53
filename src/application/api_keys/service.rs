//! API key service: application-layer orchestration
//!
//! Each operation receives the already-authenticated caller explicitly;
//! it is used for audit logging only, no ownership filtering is applied.

use std::sync::Arc;

use tracing::info;

use crate::domain::{
    ApiKey, ApiKeyRepositoryInterface, CreateApiKeyDto, DomainResult, NewApiKey, User,
};
use crate::infrastructure::crypto::api_key::generate_access_token;

pub struct ApiKeyService<R: ApiKeyRepositoryInterface> {
    repo: Arc<R>,
}

impl<R: ApiKeyRepositoryInterface> ApiKeyService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Every persisted key, unpaginated.
    pub async fn list_api_keys(&self, _caller: &User) -> DomainResult<Vec<ApiKey>> {
        self.repo.list_api_keys().await
    }

    pub async fn get_api_key(&self, _caller: &User, id: i32) -> DomainResult<ApiKey> {
        self.repo.find_api_key(id).await
    }

    /// Persist a new key for `dto.user_id` with freshly generated key material.
    /// Repeated calls create distinct keys.
    pub async fn create_api_key(&self, caller: &User, dto: CreateApiKeyDto) -> DomainResult<ApiKey> {
        let api_key = self
            .repo
            .create_api_key(NewApiKey {
                user_id: dto.user_id,
                access_token: generate_access_token(),
            })
            .await?;

        info!(
            caller_id = caller.id,
            api_key_id = api_key.id,
            user_id = api_key.user_id,
            "API key created"
        );
        metrics::counter!("api_keys_created_total").increment(1);
        Ok(api_key)
    }

    /// Look the key up, then hard-delete it.
    pub async fn delete_api_key(&self, caller: &User, id: i32) -> DomainResult<()> {
        let api_key = self.repo.find_api_key(id).await?;
        self.repo.delete_api_key(api_key).await?;

        info!(caller_id = caller.id, api_key_id = id, "API key deleted");
        metrics::counter!("api_keys_deleted_total").increment(1);
        Ok(())
    }

    pub async fn count_api_keys(&self) -> DomainResult<u64> {
        self.repo.count_api_keys().await
    }
}
