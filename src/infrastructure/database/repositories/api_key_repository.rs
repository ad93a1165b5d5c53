use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};

use super::db_err;
use crate::domain::{ApiKey, ApiKeyRepositoryInterface, DomainError, DomainResult, NewApiKey};
use crate::infrastructure::database::entities::api_key;

pub struct ApiKeyRepository {
    db: DatabaseConnection,
}

impl ApiKeyRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn api_key_model_to_domain(model: api_key::Model) -> ApiKey {
    ApiKey {
        id: model.id,
        user_id: model.user_id,
        access_token: model.access_token,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

#[async_trait]
impl ApiKeyRepositoryInterface for ApiKeyRepository {
    async fn list_api_keys(&self) -> DomainResult<Vec<ApiKey>> {
        let models = api_key::Entity::find()
            .order_by_asc(api_key::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(models.into_iter().map(api_key_model_to_domain).collect())
    }

    async fn find_api_key(&self, id: i32) -> DomainResult<ApiKey> {
        api_key::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(api_key_model_to_domain)
            .ok_or_else(|| DomainError::not_found("ApiKey", "id", id))
    }

    async fn find_by_access_token(&self, access_token: &str) -> DomainResult<Option<ApiKey>> {
        let model = api_key::Entity::find()
            .filter(api_key::Column::AccessToken.eq(access_token))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(model.map(api_key_model_to_domain))
    }

    async fn count_api_keys(&self) -> DomainResult<u64> {
        api_key::Entity::find().count(&self.db).await.map_err(db_err)
    }

    async fn create_api_key(&self, new_key: NewApiKey) -> DomainResult<ApiKey> {
        let now = Utc::now();

        let model = api_key::ActiveModel {
            id: NotSet,
            user_id: Set(new_key.user_id),
            access_token: Set(new_key.access_token),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .map_err(db_err)?;

        Ok(api_key_model_to_domain(model))
    }

    async fn delete_api_key(&self, api_key: ApiKey) -> DomainResult<()> {
        let result = api_key::Entity::delete_by_id(api_key.id)
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        // Removed by a concurrent request between lookup and delete.
        if result.rows_affected == 0 {
            return Err(DomainError::not_found("ApiKey", "id", api_key.id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CreateUserDto, PersistenceError, UserRepositoryInterface};
    use crate::infrastructure::database::repositories::UserRepository;
    use crate::infrastructure::database::test_database;

    async fn setup() -> (ApiKeyRepository, i32) {
        let db = test_database().await;
        let user = UserRepository::new(db.clone())
            .create_user(CreateUserDto {
                username: "owner".into(),
                email: "owner@example.com".into(),
            })
            .await
            .unwrap();
        (ApiKeyRepository::new(db), user.id)
    }

    fn new_key(user_id: i32, token: &str) -> NewApiKey {
        NewApiKey {
            user_id,
            access_token: token.to_string(),
        }
    }

    #[tokio::test]
    async fn create_then_find() {
        let (repo, user_id) = setup().await;

        let created = repo.create_api_key(new_key(user_id, "ak_one")).await.unwrap();
        assert_eq!(created.user_id, user_id);

        let found = repo.find_api_key(created.id).await.unwrap();
        assert_eq!(found, created);

        let by_token = repo.find_by_access_token("ak_one").await.unwrap();
        assert_eq!(by_token, Some(created));
    }

    #[tokio::test]
    async fn missing_key_is_not_found() {
        let (repo, _) = setup().await;

        let err = repo.find_api_key(999).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "ApiKey", .. }));
        assert!(repo.find_by_access_token("ak_nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unknown_owner_violates_foreign_key() {
        let (repo, user_id) = setup().await;

        let err = repo
            .create_api_key(new_key(user_id + 100, "ak_orphan"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::Persistence(PersistenceError::ForeignKey(_))
        ));
        assert_eq!(repo.count_api_keys().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn duplicate_token_violates_unique() {
        let (repo, user_id) = setup().await;

        repo.create_api_key(new_key(user_id, "ak_dup")).await.unwrap();
        let err = repo.create_api_key(new_key(user_id, "ak_dup")).await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::Persistence(PersistenceError::Unique(_))
        ));
    }

    #[tokio::test]
    async fn identifiers_are_not_reused_after_delete() {
        let (repo, user_id) = setup().await;

        let first = repo.create_api_key(new_key(user_id, "ak_a")).await.unwrap();
        repo.delete_api_key(first.clone()).await.unwrap();
        let second = repo.create_api_key(new_key(user_id, "ak_b")).await.unwrap();

        assert!(second.id > first.id);
        assert_eq!(repo.list_api_keys().await.unwrap(), vec![second]);
    }

    #[tokio::test]
    async fn deleting_twice_reports_not_found() {
        let (repo, user_id) = setup().await;

        let key = repo.create_api_key(new_key(user_id, "ak_gone")).await.unwrap();
        repo.delete_api_key(key.clone()).await.unwrap();
        let err = repo.delete_api_key(key).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }
}
