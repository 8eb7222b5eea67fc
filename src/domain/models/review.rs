use std::ops::RangeInclusive;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const RATING_RANGE: RangeInclusive<i32> = 1..=5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub business_user_id: i64,
    pub reviewer_id: i64,
    pub rating: i32,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewReview {
    pub business_user_id: i64,
    pub reviewer_id: i64,
    pub rating: i32,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReviewOrdering {
    UpdatedAtAsc,
    #[default]
    UpdatedAtDesc,
    RatingAsc,
    RatingDesc,
}

impl ReviewOrdering {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "updated_at" => Some(ReviewOrdering::UpdatedAtAsc),
            "-updated_at" => Some(ReviewOrdering::UpdatedAtDesc),
            "rating" => Some(ReviewOrdering::RatingAsc),
            "-rating" => Some(ReviewOrdering::RatingDesc),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewQuery {
    pub business_user_id: Option<i64>,
    pub reviewer_id: Option<i64>,
    pub ordering: ReviewOrdering,
}

/// Aggregate over all reviews.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ReviewStats {
    pub count: u64,
    pub average_rating: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_range_bounds() {
        assert!(RATING_RANGE.contains(&1));
        assert!(RATING_RANGE.contains(&5));
        assert!(!RATING_RANGE.contains(&0));
        assert!(!RATING_RANGE.contains(&6));
    }

    #[test]
    fn test_ordering_parse() {
        assert_eq!(ReviewOrdering::parse("rating"), Some(ReviewOrdering::RatingAsc));
        assert_eq!(ReviewOrdering::parse("-updated_at"), Some(ReviewOrdering::UpdatedAtDesc));
        assert_eq!(ReviewOrdering::parse("created_at"), None);
    }
}
