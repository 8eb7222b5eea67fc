use anyhow::Result;

use crate::domain::BaseInfo;

use super::super::Container;

pub struct StatsController<'a> {
    container: &'a Container,
}

impl<'a> StatsController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn stats(&self) -> Result<String> {
        let use_case = self.container.base_info_use_case();
        let info = use_case.execute().await?;
        Ok(self.format_stats(&info))
    }

    fn format_stats(&self, info: &BaseInfo) -> String {
        let storage = if self.container.memory_storage() {
            "(in memory)"
        } else {
            self.container.data_dir()
        };

        format!(
            "Coderr Statistics\n=================\nReviews:            {}\nAverage Rating:     {:.1}\nBusiness Profiles:  {}\nOffers:             {}\nData Dir:           {}",
            info.review_count,
            info.average_rating,
            info.business_profile_count,
            info.offer_count,
            storage
        )
    }
}
