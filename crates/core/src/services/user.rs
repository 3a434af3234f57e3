//! Staff account service.
//!
//! Accounts are keyed by an external platform identity; there are no
//! passwords. Sessions are opaque bearer tokens rotated on every login.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use reportd_common::{AppError, AppResult};
use reportd_db::{
    entities::user::{self, Role},
    repositories::UserRepository,
};
use sea_orm::Set;

use super::access;

/// Input for logging a staff member in.
#[derive(Debug, Clone)]
pub struct LoginInput {
    pub external_id: String,
    pub username: String,
    pub avatar_url: Option<String>,
    pub email: Option<String>,
}

/// Staff account service.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository) -> Self {
        Self { user_repo }
    }

    /// Log a staff member in, upserting their profile.
    ///
    /// First login creates the account at support rank; subsequent logins
    /// refresh the profile fields. The session token is rotated either way.
    pub async fn login(&self, input: LoginInput) -> AppResult<user::Model> {
        if input.external_id.trim().is_empty() {
            return Err(AppError::Validation("External id is required".to_string()));
        }
        if input.username.trim().is_empty() {
            return Err(AppError::Validation("Username is required".to_string()));
        }

        let token = generate_token();
        let now = chrono::Utc::now();

        if let Some(existing) = self.user_repo.find_by_external_id(&input.external_id).await? {
            let mut model: user::ActiveModel = existing.into();
            model.username = Set(input.username);
            model.avatar_url = Set(input.avatar_url);
            model.email = Set(input.email);
            model.token = Set(Some(token));
            model.last_login_at = Set(Some(now.into()));
            model.updated_at = Set(Some(now.into()));
            return self.user_repo.update(model).await;
        }

        let model = user::ActiveModel {
            external_id: Set(input.external_id),
            username: Set(input.username),
            avatar_url: Set(input.avatar_url),
            email: Set(input.email),
            role: Set(Role::Support),
            token: Set(Some(token)),
            last_login_at: Set(Some(now.into())),
            created_at: Set(now.into()),
            ..Default::default()
        };
        self.user_repo.create(model).await
    }

    /// Resolve a session token to its account.
    pub async fn authenticate(&self, token: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// Invalidate the account's session token.
    pub async fn logout(&self, account: user::Model) -> AppResult<()> {
        let mut model: user::ActiveModel = account.into();
        model.token = Set(None);
        self.user_repo.update(model).await?;
        Ok(())
    }

    /// Get an account by id.
    pub async fn get(&self, id: i32) -> AppResult<user::Model> {
        self.user_repo.get_by_id(id).await
    }

    /// List accounts.
    pub async fn list(&self, limit: u64, offset: u64) -> AppResult<Vec<user::Model>> {
        self.user_repo.list(limit, offset).await
    }

    /// Change another account's role.
    ///
    /// The actor must hold admin rank, must strictly outrank the target,
    /// and cannot grant a role above their own.
    pub async fn update_role(
        &self,
        actor: &user::Model,
        target_id: i32,
        new_role: Role,
    ) -> AppResult<user::Model> {
        if !access::dominates(actor.role, Role::Admin) {
            return Err(AppError::Forbidden("Admin rank required".to_string()));
        }
        if actor.id == target_id {
            return Err(AppError::BadRequest(
                "Cannot change your own role".to_string(),
            ));
        }

        let target = self.user_repo.get_by_id(target_id).await?;

        if access::rank(target.role) >= access::rank(actor.role) {
            return Err(AppError::Forbidden(
                "Cannot change the role of a peer or superior".to_string(),
            ));
        }
        if !access::dominates(actor.role, new_role) {
            return Err(AppError::Forbidden(
                "Cannot grant a role above your own".to_string(),
            ));
        }

        let mut model: user::ActiveModel = target.into();
        model.role = Set(new_role);
        model.updated_at = Set(Some(chrono::Utc::now().into()));
        self.user_repo.update(model).await
    }

    /// Delete an account. Owner only, and never themselves.
    pub async fn delete(&self, actor: &user::Model, target_id: i32) -> AppResult<()> {
        if actor.role != Role::Owner {
            return Err(AppError::Forbidden("Owner rank required".to_string()));
        }
        if actor.id == target_id {
            return Err(AppError::BadRequest(
                "Cannot delete your own account".to_string(),
            ));
        }
        self.user_repo.delete(target_id).await
    }
}

/// Generate an opaque session token.
fn generate_token() -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    let mut bytes = [0u8; 32];
    rng.fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn staff(id: i32, role: Role) -> user::Model {
        user::Model {
            id,
            external_id: format!("ext-{id}"),
            username: format!("user{id}"),
            avatar_url: None,
            email: None,
            role,
            token: None,
            last_login_at: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn service_with(db: sea_orm::DatabaseConnection) -> UserService {
        UserService::new(UserRepository::new(Arc::new(db)))
    }

    #[test]
    fn test_generate_token_is_opaque() {
        let a = generate_token();
        let b = generate_token();
        assert_ne!(a, b);
        assert!(a.len() >= 40);
        assert!(!a.contains('='));
    }

    #[tokio::test]
    async fn test_update_role_requires_admin() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let service = service_with(db);

        let moderator = staff(1, Role::Moderator);
        let err = service
            .update_role(&moderator, 2, Role::Support)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_update_role_rejects_self() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let service = service_with(db);

        let admin = staff(1, Role::Admin);
        let err = service.update_role(&admin, 1, Role::Owner).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_update_role_rejects_peer() {
        let target = staff(2, Role::Admin);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[target]])
            .into_connection();
        let service = service_with(db);

        let admin = staff(1, Role::Admin);
        let err = service
            .update_role(&admin, 2, Role::Support)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_update_role_rejects_grant_above_own() {
        let target = staff(2, Role::Moderator);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[target]])
            .into_connection();
        let service = service_with(db);

        let admin = staff(1, Role::Admin);
        let err = service.update_role(&admin, 2, Role::Owner).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_login_validates_input() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let service = service_with(db);

        let err = service
            .login(LoginInput {
                external_id: " ".to_string(),
                username: "someone".to_string(),
                avatar_url: None,
                email: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_delete_requires_owner() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let service = service_with(db);

        let admin = staff(1, Role::Admin);
        let err = service.delete(&admin, 2).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }
}
