use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::validation::{optional_text, required_text, round_price, REQUIRED};
use crate::domain::FieldErrors;

pub const DEFAULT_PAGE_SIZE: u32 = 6;
pub const MAX_PAGE_SIZE: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferType {
    Basic,
    Standard,
    Premium,
}

impl OfferType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OfferType::Basic => "basic",
            OfferType::Standard => "standard",
            OfferType::Premium => "premium",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "basic" => Some(OfferType::Basic),
            "standard" => Some(OfferType::Standard),
            "premium" => Some(OfferType::Premium),
            _ => None,
        }
    }
}

/// One priced tier of an offer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferDetail {
    pub id: i64,
    pub offer_id: i64,
    pub title: String,
    /// `-1` means unlimited revisions.
    pub revisions: i32,
    pub delivery_time_in_days: i32,
    pub price: f64,
    pub features: Vec<String>,
    pub offer_type: OfferType,
}

impl OfferDetail {
    pub fn apply(&mut self, changes: OfferDetailChanges) {
        if let Some(v) = changes.title {
            self.title = v;
        }
        if let Some(v) = changes.revisions {
            self.revisions = v;
        }
        if let Some(v) = changes.delivery_time_in_days {
            self.delivery_time_in_days = v;
        }
        if let Some(v) = changes.price {
            self.price = round_price(v);
        }
        if let Some(v) = changes.features {
            self.features = v;
        }
        if let Some(v) = changes.offer_type {
            self.offer_type = v;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewOfferDetail {
    pub title: String,
    pub revisions: i32,
    pub delivery_time_in_days: i32,
    pub price: f64,
    pub features: Vec<String>,
    pub offer_type: OfferType,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OfferDetailChanges {
    pub title: Option<String>,
    pub revisions: Option<i32>,
    pub delivery_time_in_days: Option<i32>,
    pub price: Option<f64>,
    pub features: Option<Vec<String>>,
    pub offer_type: Option<OfferType>,
}

/// A tier as it arrives from a client, before validation. `id` is only
/// meaningful on updates.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OfferDetailInput {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub revisions: Option<i32>,
    pub delivery_time_in_days: Option<i32>,
    pub price: Option<f64>,
    pub features: Option<Vec<String>>,
    pub offer_type: Option<String>,
}

impl OfferDetailInput {
    /// Full validation for a new tier: every field is required.
    pub fn validate_new(&self) -> Result<NewOfferDetail, FieldErrors> {
        let mut errors = FieldErrors::new();
        let title = required_text(&mut errors, "title", self.title.as_deref());
        let presence = [
            ("revisions", self.revisions.is_some()),
            ("delivery_time_in_days", self.delivery_time_in_days.is_some()),
            ("price", self.price.is_some()),
            ("features", self.features.is_some()),
            ("offer_type", self.offer_type.is_some()),
        ];
        for (field, present) in presence {
            if !present {
                errors.add(field, REQUIRED);
            }
        }

        let changes = self.check_values(&mut errors);
        if !errors.is_empty() {
            return Err(errors);
        }

        match (
            title,
            changes.revisions,
            changes.delivery_time_in_days,
            changes.price,
            changes.features,
            changes.offer_type,
        ) {
            (Some(title), Some(revisions), Some(delivery), Some(price), Some(features), Some(offer_type)) => {
                Ok(NewOfferDetail {
                    title,
                    revisions,
                    delivery_time_in_days: delivery,
                    price: round_price(price),
                    features,
                    offer_type,
                })
            }
            _ => Err(errors),
        }
    }

    /// Validation for a partial update: only present fields are checked.
    pub fn validate_changes(&self) -> Result<OfferDetailChanges, FieldErrors> {
        let mut errors = FieldErrors::new();
        let mut changes = self.check_values(&mut errors);
        changes.title = optional_text(&mut errors, "title", self.title.as_deref());
        if errors.is_empty() {
            Ok(changes)
        } else {
            Err(errors)
        }
    }

    fn check_values(&self, errors: &mut FieldErrors) -> OfferDetailChanges {
        let mut changes = OfferDetailChanges::default();

        if let Some(revisions) = self.revisions {
            if revisions < -1 {
                errors.add("revisions", "Revisions must be -1 (unlimited) or a positive number.");
            } else {
                changes.revisions = Some(revisions);
            }
        }
        if let Some(days) = self.delivery_time_in_days {
            if days < 1 {
                errors.add("delivery_time_in_days", "Delivery time must be at least 1 day.");
            } else {
                changes.delivery_time_in_days = Some(days);
            }
        }
        if let Some(price) = self.price {
            // Checked after rounding so the stored value keeps the bound.
            let price = round_price(price);
            if !price.is_finite() || price <= 1.0 {
                errors.add("price", "Price must be greater than 1.");
            } else {
                changes.price = Some(price);
            }
        }
        if let Some(features) = &self.features {
            let features = normalize_features(features.clone());
            if features.is_empty() {
                errors.add("features", "At least one feature is required.");
            } else {
                changes.features = Some(features);
            }
        }
        if let Some(raw) = &self.offer_type {
            match OfferType::parse(raw) {
                Some(t) => changes.offer_type = Some(t),
                None => errors.add(
                    "offer_type",
                    format!("\"{}\" is not a valid choice (basic, standard, premium).", raw),
                ),
            }
        }

        changes
    }
}

fn normalize_features(features: Vec<String>) -> Vec<String> {
    features
        .into_iter()
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    id: i64,
    user_id: i64,
    title: String,
    description: String,
    image: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    details: Vec<OfferDetail>,
}

impl Offer {
    /// Reconstitutes from persisted data (used by adapters).
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: i64,
        user_id: i64,
        title: String,
        description: String,
        image: Option<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        details: Vec<OfferDetail>,
    ) -> Self {
        Self {
            id,
            user_id,
            title,
            description,
            image,
            created_at,
            updated_at,
            details,
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn details(&self) -> &[OfferDetail] {
        &self.details
    }

    pub fn min_price(&self) -> Option<f64> {
        self.details.iter().map(|d| d.price).reduce(f64::min)
    }

    pub fn min_delivery_time(&self) -> Option<i32> {
        self.details.iter().map(|d| d.delivery_time_in_days).min()
    }

    /// Finds the tier an update refers to: by id when given, else by type.
    pub fn find_detail_index(&self, id: Option<i64>, offer_type: Option<OfferType>) -> Option<usize> {
        match (id, offer_type) {
            (Some(id), _) => self.details.iter().position(|d| d.id == id),
            (None, Some(t)) => self.details.iter().position(|d| d.offer_type == t),
            (None, None) => None,
        }
    }

    pub fn apply(&mut self, changes: OfferChanges, now: DateTime<Utc>) {
        if let Some(v) = changes.title {
            self.title = v;
        }
        if let Some(v) = changes.description {
            self.description = v;
        }
        if let Some(image) = changes.image {
            self.image = if image.trim().is_empty() { None } else { Some(image) };
        }
        for (index, detail_changes) in changes.details {
            if let Some(detail) = self.details.get_mut(index) {
                detail.apply(detail_changes);
            }
        }
        self.updated_at = now;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewOffer {
    pub user_id: i64,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub details: Vec<NewOfferDetail>,
}

/// Validated offer update. Tier changes are addressed by position in
/// [`Offer::details`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OfferChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub details: Vec<(usize, OfferDetailChanges)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OfferOrdering {
    CreatedAtAsc,
    CreatedAtDesc,
    MinPriceAsc,
    MinPriceDesc,
    UpdatedAtAsc,
    #[default]
    UpdatedAtDesc,
}

impl OfferOrdering {
    /// Unknown orderings fall back to newest-updated first.
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "created_at" => OfferOrdering::CreatedAtAsc,
            "-created_at" => OfferOrdering::CreatedAtDesc,
            "min_price" => OfferOrdering::MinPriceAsc,
            "-min_price" => OfferOrdering::MinPriceDesc,
            "updated_at" => OfferOrdering::UpdatedAtAsc,
            "-updated_at" => OfferOrdering::UpdatedAtDesc,
            unknown => {
                debug!("Unknown offer ordering '{}', using -updated_at", unknown);
                OfferOrdering::default()
            }
        }
    }
}

/// Filters, ordering and page window for the public offer listing.
#[derive(Debug, Clone, PartialEq)]
pub struct OfferQuery {
    creator_id: Option<i64>,
    min_price: Option<f64>,
    max_delivery_time: Option<i32>,
    search: Option<String>,
    ordering: OfferOrdering,
    page: u32,
    page_size: u32,
}

impl Default for OfferQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl OfferQuery {
    pub fn new() -> Self {
        Self {
            creator_id: None,
            min_price: None,
            max_delivery_time: None,
            search: None,
            ordering: OfferOrdering::default(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_creator(mut self, user_id: i64) -> Self {
        self.creator_id = Some(user_id);
        self
    }

    pub fn with_min_price(mut self, price: f64) -> Self {
        self.min_price = Some(price);
        self
    }

    pub fn with_max_delivery_time(mut self, days: i32) -> Self {
        self.max_delivery_time = Some(days);
        self
    }

    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        let term = term.into();
        let term = term.trim();
        self.search = if term.is_empty() {
            None
        } else {
            Some(term.to_lowercase())
        };
        self
    }

    pub fn with_ordering(mut self, ordering: OfferOrdering) -> Self {
        self.ordering = ordering;
        self
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    pub fn creator_id(&self) -> Option<i64> {
        self.creator_id
    }

    pub fn min_price(&self) -> Option<f64> {
        self.min_price
    }

    pub fn max_delivery_time(&self) -> Option<i32> {
        self.max_delivery_time
    }

    /// Lowercased search term.
    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn ordering(&self) -> OfferOrdering {
        self.ordering
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.page_size)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OfferPage {
    pub count: u64,
    pub offers: Vec<Offer>,
}

impl OfferPage {
    pub fn has_next(&self, query: &OfferQuery) -> bool {
        query.offset() + (self.offers.len() as u64) < self.count
    }

    pub fn has_previous(&self, query: &OfferQuery) -> bool {
        query.page() > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(id: i64, price: f64, days: i32, offer_type: OfferType) -> OfferDetail {
        OfferDetail {
            id,
            offer_id: 1,
            title: format!("{} tier", offer_type.as_str()),
            revisions: 2,
            delivery_time_in_days: days,
            price,
            features: vec!["Logo".to_string()],
            offer_type,
        }
    }

    fn offer() -> Offer {
        let now = Utc::now();
        Offer::reconstitute(
            1,
            10,
            "Logo design".to_string(),
            "Clean logos".to_string(),
            None,
            now,
            now,
            vec![
                detail(1, 100.0, 7, OfferType::Basic),
                detail(2, 250.0, 5, OfferType::Standard),
                detail(3, 500.0, 3, OfferType::Premium),
            ],
        )
    }

    fn valid_input() -> OfferDetailInput {
        OfferDetailInput {
            id: None,
            title: Some("Basic".to_string()),
            revisions: Some(-1),
            delivery_time_in_days: Some(5),
            price: Some(100.556),
            features: Some(vec!["Logo".to_string(), "  ".to_string()]),
            offer_type: Some("basic".to_string()),
        }
    }

    #[test]
    fn test_min_aggregates() {
        let offer = offer();
        assert_eq!(offer.min_price(), Some(100.0));
        assert_eq!(offer.min_delivery_time(), Some(3));
    }

    #[test]
    fn test_min_aggregates_without_details() {
        let now = Utc::now();
        let offer = Offer::reconstitute(1, 1, "t".into(), "d".into(), None, now, now, vec![]);
        assert_eq!(offer.min_price(), None);
        assert_eq!(offer.min_delivery_time(), None);
    }

    #[test]
    fn test_validate_new_detail_normalizes() {
        let detail = valid_input().validate_new().expect("valid");
        assert_eq!(detail.price, 100.56);
        assert_eq!(detail.features, vec!["Logo".to_string()]);
        assert_eq!(detail.offer_type, OfferType::Basic);
        assert_eq!(detail.revisions, -1);
    }

    #[test]
    fn test_validate_new_detail_collects_every_error() {
        let input = OfferDetailInput {
            title: Some(" ".to_string()),
            revisions: Some(-2),
            delivery_time_in_days: Some(0),
            price: Some(1.0),
            features: Some(vec![]),
            offer_type: Some("gold".to_string()),
            ..Default::default()
        };
        let errors = input.validate_new().unwrap_err();
        for field in ["title", "revisions", "delivery_time_in_days", "price", "features", "offer_type"] {
            assert!(errors.contains(field), "missing error for {}", field);
        }
    }

    #[test]
    fn test_validate_new_detail_requires_fields() {
        let errors = OfferDetailInput::default().validate_new().unwrap_err();
        assert!(errors.contains("price"));
        assert!(errors.contains("offer_type"));
    }

    #[test]
    fn test_price_bound_checked_after_rounding() {
        let mut input = valid_input();
        input.price = Some(1.004);
        let errors = input.validate_new().unwrap_err();
        assert!(errors.contains("price"));

        input.price = Some(1.006);
        assert_eq!(input.validate_new().unwrap().price, 1.01);
    }

    #[test]
    fn test_validate_changes_only_checks_present_fields() {
        let input = OfferDetailInput {
            price: Some(80.0),
            ..Default::default()
        };
        let changes = input.validate_changes().expect("valid");
        assert_eq!(changes.price, Some(80.0));
        assert_eq!(changes.title, None);
    }

    #[test]
    fn test_find_detail_by_id_then_type() {
        let offer = offer();
        assert_eq!(offer.find_detail_index(Some(3), None), Some(2));
        assert_eq!(offer.find_detail_index(None, Some(OfferType::Standard)), Some(1));
        assert_eq!(offer.find_detail_index(Some(99), Some(OfferType::Basic)), None);
        assert_eq!(offer.find_detail_index(None, None), None);
    }

    #[test]
    fn test_apply_changes_updates_tier_and_timestamp() {
        let mut offer = offer();
        let later = offer.updated_at() + chrono::Duration::seconds(60);
        offer.apply(
            OfferChanges {
                title: Some("Better logos".to_string()),
                details: vec![(
                    0,
                    OfferDetailChanges {
                        price: Some(120.499),
                        ..Default::default()
                    },
                )],
                ..Default::default()
            },
            later,
        );

        assert_eq!(offer.title(), "Better logos");
        assert_eq!(offer.details()[0].price, 120.5);
        assert_eq!(offer.details()[1].price, 250.0);
        assert_eq!(offer.updated_at(), later);
    }

    #[test]
    fn test_ordering_parse_falls_back() {
        assert_eq!(OfferOrdering::parse("min_price"), OfferOrdering::MinPriceAsc);
        assert_eq!(OfferOrdering::parse("-created_at"), OfferOrdering::CreatedAtDesc);
        assert_eq!(OfferOrdering::parse("rating"), OfferOrdering::UpdatedAtDesc);
    }

    #[test]
    fn test_query_page_window() {
        let query = OfferQuery::new().with_page(3).with_page_size(50);
        assert_eq!(query.page_size(), MAX_PAGE_SIZE);
        assert_eq!(query.offset(), 12);

        let query = OfferQuery::new().with_page(0).with_page_size(0);
        assert_eq!(query.page(), 1);
        assert_eq!(query.page_size(), 1);
    }

    #[test]
    fn test_page_links() {
        let query = OfferQuery::new().with_page(2).with_page_size(2);
        let page = OfferPage {
            count: 5,
            offers: vec![offer(), offer()],
        };
        assert!(page.has_next(&query));
        assert!(page.has_previous(&query));

        let last = OfferQuery::new().with_page(3).with_page_size(2);
        let page = OfferPage {
            count: 5,
            offers: vec![offer()],
        };
        assert!(!page.has_next(&last));
    }

    #[test]
    fn test_search_term_is_lowercased() {
        let query = OfferQuery::new().with_search("  Logo ");
        assert_eq!(query.search(), Some("logo"));
        assert_eq!(OfferQuery::new().with_search("   ").search(), None);
    }
}
