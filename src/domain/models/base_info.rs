use serde::Serialize;

use super::ReviewStats;

/// Platform-wide figures shown on the landing page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaseInfo {
    pub review_count: u64,
    pub average_rating: f64,
    pub business_profile_count: u64,
    pub offer_count: u64,
}

impl BaseInfo {
    pub fn new(reviews: ReviewStats, business_profile_count: u64, offer_count: u64) -> Self {
        let average_rating = reviews
            .average_rating
            .map(|avg| (avg * 10.0).round() / 10.0)
            .unwrap_or(0.0);
        Self {
            review_count: reviews.count,
            average_rating,
            business_profile_count,
            offer_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_rounded_to_one_decimal() {
        let info = BaseInfo::new(
            ReviewStats {
                count: 3,
                average_rating: Some(4.666_666),
            },
            2,
            5,
        );
        assert_eq!(info.average_rating, 4.7);
        assert_eq!(info.review_count, 3);
    }

    #[test]
    fn test_no_reviews_average_zero() {
        let info = BaseInfo::new(ReviewStats::default(), 0, 0);
        assert_eq!(info.average_rating, 0.0);
    }
}
