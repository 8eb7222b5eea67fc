use async_trait::async_trait;

use crate::domain::{DomainError, NewOffer, Offer, OfferDetail, OfferPage, OfferQuery};

/// Persistence for offers together with their tiers.
#[async_trait]
pub trait OfferRepository: Send + Sync {
    async fn create(&self, offer: NewOffer) -> Result<Offer, DomainError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Offer>, DomainError>;

    async fn find_detail(&self, detail_id: i64) -> Result<Option<OfferDetail>, DomainError>;

    async fn search(&self, query: &OfferQuery) -> Result<OfferPage, DomainError>;

    /// Writes the offer row and every tier it carries.
    async fn update(&self, offer: &Offer) -> Result<(), DomainError>;

    /// Removes the offer and its tiers.
    async fn delete(&self, id: i64) -> Result<(), DomainError>;

    async fn count(&self) -> Result<u64, DomainError>;
}
