use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use super::PostgresRepository;
use crate::models::{User, UserCredentials, UserProfile};

/// UserRepository
///
/// Persistence contract for identity records. Used by the login/registration
/// handlers and by the `AuthUser` extractor on every authenticated request.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_user(&self, id: Uuid) -> sqlx::Result<Option<User>>;
    async fn get_profile(&self, id: Uuid) -> sqlx::Result<Option<UserProfile>>;
    /// Includes the stored password digest; only the login handler calls this.
    async fn find_by_email(&self, email: &str) -> sqlx::Result<Option<UserCredentials>>;
    async fn create_user(
        &self,
        email: &str,
        password_digest: &str,
        role: &str,
    ) -> sqlx::Result<User>;
}

pub type UserRepositoryState = Arc<dyn UserRepository>;

#[async_trait]
impl UserRepository for PostgresRepository {
    async fn get_user(&self, id: Uuid) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>("SELECT id, email, role FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await
    }

    async fn get_profile(&self, id: Uuid) -> sqlx::Result<Option<UserProfile>> {
        sqlx::query_as::<_, UserProfile>(
            "SELECT id, email, role, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
    }

    async fn find_by_email(&self, email: &str) -> sqlx::Result<Option<UserCredentials>> {
        sqlx::query_as::<_, UserCredentials>(
            "SELECT id, email, role, password_digest FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(self.pool())
        .await
    }

    async fn create_user(
        &self,
        email: &str,
        password_digest: &str,
        role: &str,
    ) -> sqlx::Result<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, password_digest, role, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            RETURNING id, email, role
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(password_digest)
        .bind(role)
        .fetch_one(self.pool())
        .await
    }
}
