use std::str::FromStr;

use axum::extract::{OriginalUri, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::{CreateOfferInput, OfferListing, UpdateOfferInput};
use crate::connector::api::Container;
use crate::domain::{DomainError, FieldErrors, Offer, OfferDetail, OfferOrdering, OfferQuery, OfferType, Profile};

use super::super::error::ApiResult;
use super::super::extract::{ApiJson, ApiPath, ApiQuery, CurrentUser};
use super::super::pagination::{page_url, Paginated};

/// Raw listing parameters; empty values count as absent.
#[derive(Debug, Default, Deserialize)]
pub struct OfferListParams {
    pub creator_id: Option<String>,
    pub min_price: Option<String>,
    pub max_delivery_time: Option<String>,
    pub search: Option<String>,
    pub ordering: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

fn parse_param<T: FromStr>(errors: &mut FieldErrors, name: &str, raw: Option<&str>) -> Option<T> {
    let raw = raw.map(str::trim).filter(|v| !v.is_empty())?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            errors.add(name, format!("\"{}\" is not a valid number.", raw));
            None
        }
    }
}

impl OfferListParams {
    pub fn into_query(self) -> Result<OfferQuery, FieldErrors> {
        let mut errors = FieldErrors::new();
        let creator_id = parse_param::<i64>(&mut errors, "creator_id", self.creator_id.as_deref());
        let min_price = parse_param::<f64>(&mut errors, "min_price", self.min_price.as_deref());
        let max_delivery = parse_param::<i32>(&mut errors, "max_delivery_time", self.max_delivery_time.as_deref());
        let page = parse_param::<u32>(&mut errors, "page", self.page.as_deref());
        let page_size = parse_param::<u32>(&mut errors, "page_size", self.page_size.as_deref());
        if !errors.is_empty() {
            return Err(errors);
        }

        let mut query = OfferQuery::new();
        if let Some(id) = creator_id {
            query = query.with_creator(id);
        }
        if let Some(price) = min_price {
            query = query.with_min_price(price);
        }
        if let Some(days) = max_delivery {
            query = query.with_max_delivery_time(days);
        }
        if let Some(term) = self.search {
            query = query.with_search(term);
        }
        if let Some(ordering) = self.ordering {
            query = query.with_ordering(OfferOrdering::parse(&ordering));
        }
        if let Some(page) = page {
            query = query.with_page(page);
        }
        if let Some(size) = page_size {
            query = query.with_page_size(size);
        }
        Ok(query)
    }
}

#[derive(Debug, Serialize)]
pub struct DetailLink {
    pub id: i64,
    pub url: String,
}

impl DetailLink {
    fn new(detail: &OfferDetail) -> Self {
        Self {
            id: detail.id,
            url: format!("/api/offerdetails/{}/", detail.id),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserDetails {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
}

impl From<&Profile> for UserDetails {
    fn from(p: &Profile) -> Self {
        Self {
            first_name: p.first_name.clone(),
            last_name: p.last_name.clone(),
            username: p.username.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OfferSummary {
    pub id: i64,
    pub user: i64,
    pub title: String,
    pub image: Option<String>,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub details: Vec<DetailLink>,
    pub min_price: Option<f64>,
    pub min_delivery_time: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_details: Option<UserDetails>,
}

impl OfferSummary {
    fn new(offer: &Offer, owner: Option<&Profile>) -> Self {
        Self {
            id: offer.id(),
            user: offer.user_id(),
            title: offer.title().to_string(),
            image: offer.image().map(str::to_string),
            description: offer.description().to_string(),
            created_at: offer.created_at(),
            updated_at: offer.updated_at(),
            details: offer.details().iter().map(DetailLink::new).collect(),
            min_price: offer.min_price(),
            min_delivery_time: offer.min_delivery_time(),
            user_details: owner.map(UserDetails::from),
        }
    }
}

impl From<OfferListing> for OfferSummary {
    fn from(listing: OfferListing) -> Self {
        Self::new(&listing.offer, listing.owner.as_ref())
    }
}

#[derive(Debug, Serialize)]
pub struct DetailResponse {
    pub id: i64,
    pub title: String,
    pub revisions: i32,
    pub delivery_time_in_days: i32,
    pub price: f64,
    pub features: Vec<String>,
    pub offer_type: OfferType,
}

impl From<&OfferDetail> for DetailResponse {
    fn from(d: &OfferDetail) -> Self {
        Self {
            id: d.id,
            title: d.title.clone(),
            revisions: d.revisions,
            delivery_time_in_days: d.delivery_time_in_days,
            price: d.price,
            features: d.features.clone(),
            offer_type: d.offer_type,
        }
    }
}

/// Body returned after creating or editing an offer.
#[derive(Debug, Serialize)]
pub struct OfferWithDetails {
    pub id: i64,
    pub title: String,
    pub image: Option<String>,
    pub description: String,
    pub details: Vec<DetailResponse>,
}

impl From<&Offer> for OfferWithDetails {
    fn from(offer: &Offer) -> Self {
        Self {
            id: offer.id(),
            title: offer.title().to_string(),
            image: offer.image().map(str::to_string),
            description: offer.description().to_string(),
            details: offer.details().iter().map(DetailResponse::from).collect(),
        }
    }
}

pub async fn list_offers(
    State(container): State<Container>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    ApiQuery(params): ApiQuery<OfferListParams>,
) -> ApiResult<Json<Paginated<OfferSummary>>> {
    let query = params.into_query().map_err(DomainError::Validation)?;
    let page = container.offers_use_case().list(&query).await?;

    let next = page
        .has_next
        .then(|| page_url(&headers, &uri, query.page() + 1))
        .flatten();
    let previous = page
        .has_previous
        .then(|| page_url(&headers, &uri, query.page() - 1))
        .flatten();

    Ok(Json(Paginated {
        count: page.count,
        next,
        previous,
        results: page.entries.into_iter().map(OfferSummary::from).collect(),
    }))
}

pub async fn create_offer(
    State(container): State<Container>,
    CurrentUser(user): CurrentUser,
    ApiJson(input): ApiJson<CreateOfferInput>,
) -> ApiResult<(StatusCode, Json<OfferWithDetails>)> {
    let offer = container.offers_use_case().create(&user, input).await?;
    Ok((StatusCode::CREATED, Json(OfferWithDetails::from(&offer))))
}

pub async fn get_offer(
    State(container): State<Container>,
    CurrentUser(_user): CurrentUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<OfferSummary>> {
    let offer = container.offers_use_case().get(id).await?;
    Ok(Json(OfferSummary::new(&offer, None)))
}

pub async fn update_offer(
    State(container): State<Container>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<UpdateOfferInput>,
) -> ApiResult<Json<OfferWithDetails>> {
    let offer = container.offers_use_case().update(&user, id, input).await?;
    Ok(Json(OfferWithDetails::from(&offer)))
}

pub async fn delete_offer(
    State(container): State<Container>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
    container.offers_use_case().delete(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_offer_detail(
    State(container): State<Container>,
    CurrentUser(_user): CurrentUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<DetailResponse>> {
    let detail = container.offers_use_case().get_detail(id).await?;
    Ok(Json(DetailResponse::from(&detail)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_params_use_defaults() {
        let query = OfferListParams {
            creator_id: Some(String::new()),
            ..Default::default()
        }
        .into_query()
        .unwrap();
        assert_eq!(query, OfferQuery::new());
    }

    #[test]
    fn test_non_numeric_filters_rejected() {
        let errors = OfferListParams {
            min_price: Some("cheap".to_string()),
            max_delivery_time: Some("soon".to_string()),
            ..Default::default()
        }
        .into_query()
        .unwrap_err();
        assert!(errors.contains("min_price"));
        assert!(errors.contains("max_delivery_time"));
    }

    #[test]
    fn test_page_size_capped() {
        let query = OfferListParams {
            page_size: Some("50".to_string()),
            page: Some("2".to_string()),
            ordering: Some("min_price".to_string()),
            ..Default::default()
        }
        .into_query()
        .unwrap();
        assert_eq!(query.page_size(), 6);
        assert_eq!(query.page(), 2);
        assert_eq!(query.ordering(), OfferOrdering::MinPriceAsc);
    }
}
