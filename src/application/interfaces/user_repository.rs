use async_trait::async_trait;

use crate::domain::{DomainError, NewUser, User};

/// Persistence for accounts and their auth tokens.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Stores the user, a default profile of the requested type and the
    /// token in one transaction.
    async fn create(&self, user: NewUser) -> Result<User, DomainError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DomainError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError>;

    async fn find_by_token(&self, token: &str) -> Result<Option<User>, DomainError>;

    async fn token_for(&self, user_id: i64) -> Result<Option<String>, DomainError>;

    async fn save_token(&self, user_id: i64, token: &str) -> Result<(), DomainError>;

    async fn username_exists(&self, username: &str) -> Result<bool, DomainError>;
}
