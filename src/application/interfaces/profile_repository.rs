use async_trait::async_trait;

use crate::domain::{DomainError, Profile, ProfileType};

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn find_by_user(&self, user_id: i64) -> Result<Option<Profile>, DomainError>;

    async fn list_by_type(&self, profile_type: ProfileType) -> Result<Vec<Profile>, DomainError>;

    async fn count_by_type(&self, profile_type: ProfileType) -> Result<u64, DomainError>;

    /// Whether any profile other than `except_user` uses `email`
    /// (case-insensitive).
    async fn email_taken(&self, email: &str, except_user: Option<i64>) -> Result<bool, DomainError>;

    async fn update(&self, profile: &Profile) -> Result<(), DomainError>;
}
