use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::{CreateReviewInput, UpdateReviewInput};
use crate::connector::api::Container;
use crate::domain::{DomainError, FieldErrors, Review, ReviewOrdering, ReviewQuery};

use super::super::error::ApiResult;
use super::super::extract::{ApiJson, ApiPath, ApiQuery, CurrentUser};

#[derive(Debug, Default, Deserialize)]
pub struct ReviewListParams {
    pub business_user_id: Option<String>,
    pub reviewer_id: Option<String>,
    pub ordering: Option<String>,
}

impl ReviewListParams {
    pub fn into_query(self) -> Result<ReviewQuery, FieldErrors> {
        let mut errors = FieldErrors::new();
        let mut id = |name: &str, raw: Option<String>| -> Option<i64> {
            let raw = raw.filter(|v| !v.trim().is_empty())?;
            match raw.trim().parse() {
                Ok(v) => Some(v),
                Err(_) => {
                    errors.add(name, format!("\"{}\" is not a valid number.", raw));
                    None
                }
            }
        };
        let business_user_id = id("business_user_id", self.business_user_id);
        let reviewer_id = id("reviewer_id", self.reviewer_id);

        // Unknown orderings fall back to the default.
        let ordering = self
            .ordering
            .as_deref()
            .and_then(ReviewOrdering::parse)
            .unwrap_or_default();

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(ReviewQuery {
            business_user_id,
            reviewer_id,
            ordering,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub id: i64,
    pub business_user: i64,
    pub reviewer: i64,
    pub rating: i32,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Review> for ReviewResponse {
    fn from(r: Review) -> Self {
        Self {
            id: r.id,
            business_user: r.business_user_id,
            reviewer: r.reviewer_id,
            rating: r.rating,
            description: r.description,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

pub async fn list_reviews(
    State(container): State<Container>,
    CurrentUser(_user): CurrentUser,
    ApiQuery(params): ApiQuery<ReviewListParams>,
) -> ApiResult<Json<Vec<ReviewResponse>>> {
    let query = params.into_query().map_err(DomainError::Validation)?;
    let reviews = container.reviews_use_case().list(&query).await?;
    Ok(Json(reviews.into_iter().map(Into::into).collect()))
}

pub async fn create_review(
    State(container): State<Container>,
    CurrentUser(user): CurrentUser,
    ApiJson(input): ApiJson<CreateReviewInput>,
) -> ApiResult<(StatusCode, Json<ReviewResponse>)> {
    let review = container.reviews_use_case().create(&user, input).await?;
    Ok((StatusCode::CREATED, Json(review.into())))
}

pub async fn get_review(
    State(container): State<Container>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<ReviewResponse>> {
    let review = container.reviews_use_case().get(id).await?;
    Ok(Json(review.into()))
}

pub async fn update_review(
    State(container): State<Container>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<UpdateReviewInput>,
) -> ApiResult<Json<ReviewResponse>> {
    let review = container.reviews_use_case().update(&user, id, input).await?;
    Ok(Json(review.into()))
}

pub async fn delete_review(
    State(container): State<Container>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
    container.reviews_use_case().delete(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filters_and_ordering() {
        let query = ReviewListParams {
            business_user_id: Some("4".to_string()),
            reviewer_id: None,
            ordering: Some("-rating".to_string()),
        }
        .into_query()
        .unwrap();
        assert_eq!(query.business_user_id, Some(4));
        assert_eq!(query.ordering, ReviewOrdering::RatingDesc);
    }

    #[test]
    fn test_bad_ids_rejected_unknown_ordering_ignored() {
        let errors = ReviewListParams {
            business_user_id: Some("abc".to_string()),
            reviewer_id: None,
            ordering: Some("stars".to_string()),
        }
        .into_query()
        .unwrap_err();
        assert!(errors.contains("business_user_id"));
        assert!(!errors.contains("ordering"));
    }
}
