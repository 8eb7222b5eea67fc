use std::sync::Arc;

use crate::application::{OfferRepository, ProfileRepository, ReviewRepository};
use crate::domain::{BaseInfo, DomainError, ProfileType};

pub struct BaseInfoUseCase {
    review_repo: Arc<dyn ReviewRepository>,
    profile_repo: Arc<dyn ProfileRepository>,
    offer_repo: Arc<dyn OfferRepository>,
}

impl BaseInfoUseCase {
    pub fn new(
        review_repo: Arc<dyn ReviewRepository>,
        profile_repo: Arc<dyn ProfileRepository>,
        offer_repo: Arc<dyn OfferRepository>,
    ) -> Self {
        Self {
            review_repo,
            profile_repo,
            offer_repo,
        }
    }

    pub async fn execute(&self) -> Result<BaseInfo, DomainError> {
        let reviews = self.review_repo.stats().await?;
        let businesses = self.profile_repo.count_by_type(ProfileType::Business).await?;
        let offers = self.offer_repo.count().await?;
        Ok(BaseInfo::new(reviews, businesses, offers))
    }
}
