use async_trait::async_trait;

use crate::domain::{DomainError, NewOrder, Order, OrderStatus};

#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn create(&self, order: NewOrder) -> Result<Order, DomainError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Order>, DomainError>;

    /// Orders where the user is either customer or business, newest first.
    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Order>, DomainError>;

    async fn update(&self, order: &Order) -> Result<(), DomainError>;

    async fn delete(&self, id: i64) -> Result<(), DomainError>;

    async fn count_for_business(
        &self,
        business_user_id: i64,
        statuses: &[OrderStatus],
    ) -> Result<u64, DomainError>;
}
