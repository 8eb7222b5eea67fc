use async_trait::async_trait;

use crate::domain::{DomainError, NewReview, Review, ReviewQuery, ReviewStats};

#[async_trait]
pub trait ReviewRepository: Send + Sync {
    async fn create(&self, review: NewReview) -> Result<Review, DomainError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Review>, DomainError>;

    async fn exists_for_pair(&self, reviewer_id: i64, business_user_id: i64) -> Result<bool, DomainError>;

    async fn list(&self, query: &ReviewQuery) -> Result<Vec<Review>, DomainError>;

    async fn update(&self, review: &Review) -> Result<(), DomainError>;

    async fn delete(&self, id: i64) -> Result<(), DomainError>;

    async fn stats(&self) -> Result<ReviewStats, DomainError>;
}
