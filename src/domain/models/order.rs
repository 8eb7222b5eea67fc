use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{OfferDetail, OfferType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    #[default]
    InProgress,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::InProgress,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    /// Statuses counted as work the business still has to deliver.
    pub const OPEN: [OrderStatus; 2] = [OrderStatus::Pending, OrderStatus::InProgress];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::InProgress => "in_progress",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == s.trim())
    }

    pub fn is_open(&self) -> bool {
        Self::OPEN.contains(self)
    }
}

/// A customer's purchase of one offer tier. The tier's terms are copied at
/// order time so later offer edits do not change existing orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub customer_user_id: i64,
    pub business_user_id: i64,
    pub offer_detail_id: i64,
    pub title: String,
    pub revisions: i32,
    pub delivery_time_in_days: i32,
    pub price: f64,
    pub features: Vec<String>,
    pub offer_type: OfferType,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn set_status(&mut self, status: OrderStatus, now: DateTime<Utc>) {
        self.status = status;
        self.updated_at = now;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub customer_user_id: i64,
    pub business_user_id: i64,
    pub offer_detail_id: i64,
    pub title: String,
    pub revisions: i32,
    pub delivery_time_in_days: i32,
    pub price: f64,
    pub features: Vec<String>,
    pub offer_type: OfferType,
    pub status: OrderStatus,
}

impl NewOrder {
    /// Snapshots `detail` for `customer_user_id`; the business side is the
    /// offer's owner.
    pub fn from_detail(detail: &OfferDetail, customer_user_id: i64, business_user_id: i64) -> Self {
        Self {
            customer_user_id,
            business_user_id,
            offer_detail_id: detail.id,
            title: detail.title.clone(),
            revisions: detail.revisions,
            delivery_time_in_days: detail.delivery_time_in_days,
            price: detail.price,
            features: detail.features.clone(),
            offer_type: detail.offer_type,
            status: OrderStatus::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_str() {
        for status in OrderStatus::ALL {
            assert_eq!(OrderStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(OrderStatus::parse("done"), None);
        assert_eq!(OrderStatus::parse("In_Progress"), None);
    }

    #[test]
    fn test_open_statuses() {
        assert!(OrderStatus::Pending.is_open());
        assert!(OrderStatus::InProgress.is_open());
        assert!(!OrderStatus::Completed.is_open());
        assert!(!OrderStatus::Cancelled.is_open());
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&OrderStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
    }

    #[test]
    fn test_new_order_snapshots_detail() {
        let detail = OfferDetail {
            id: 4,
            offer_id: 2,
            title: "Premium logo".to_string(),
            revisions: -1,
            delivery_time_in_days: 3,
            price: 499.99,
            features: vec!["Logo".to_string(), "Visitenkarte".to_string()],
            offer_type: OfferType::Premium,
        };

        let order = NewOrder::from_detail(&detail, 11, 22);

        assert_eq!(order.offer_detail_id, 4);
        assert_eq!(order.customer_user_id, 11);
        assert_eq!(order.business_user_id, 22);
        assert_eq!(order.price, 499.99);
        assert_eq!(order.features.len(), 2);
        assert_eq!(order.status, OrderStatus::InProgress);
    }
}
