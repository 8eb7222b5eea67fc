use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use crate::application::{ProfileRepository, ReviewRepository};
use crate::domain::validation::{optional_text, required_text, REQUIRED};
use crate::domain::{DomainError, FieldErrors, NewReview, ProfileType, Review, ReviewQuery, User, RATING_RANGE};

use super::permissions::{ensure_owner_or_staff, require_role};

const RATING_OUT_OF_RANGE: &str = "Rating must be between 1 and 5.";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateReviewInput {
    pub business_user: Option<i64>,
    pub rating: Option<i32>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateReviewInput {
    pub rating: Option<i32>,
    pub description: Option<String>,
}

pub struct ManageReviewsUseCase {
    review_repo: Arc<dyn ReviewRepository>,
    profile_repo: Arc<dyn ProfileRepository>,
}

impl ManageReviewsUseCase {
    pub fn new(review_repo: Arc<dyn ReviewRepository>, profile_repo: Arc<dyn ProfileRepository>) -> Self {
        Self {
            review_repo,
            profile_repo,
        }
    }

    pub async fn list(&self, query: &ReviewQuery) -> Result<Vec<Review>, DomainError> {
        self.review_repo.list(query).await
    }

    pub async fn get(&self, id: i64) -> Result<Review, DomainError> {
        self.review_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Review {} not found", id)))
    }

    /// Customers review business users, once per business.
    pub async fn create(&self, caller: &User, input: CreateReviewInput) -> Result<Review, DomainError> {
        require_role(
            self.profile_repo.as_ref(),
            caller,
            ProfileType::Customer,
            "Only customers can write reviews.",
        )
        .await?;

        let mut errors = FieldErrors::new();
        let description = required_text(&mut errors, "description", input.description.as_deref());
        match input.rating {
            None => errors.add("rating", REQUIRED),
            Some(rating) if !RATING_RANGE.contains(&rating) => errors.add("rating", RATING_OUT_OF_RANGE),
            Some(_) => {}
        }
        match input.business_user {
            None => errors.add("business_user", REQUIRED),
            Some(target) => match self.profile_repo.find_by_user(target).await? {
                Some(profile) if profile.is_business() => {
                    if self.review_repo.exists_for_pair(caller.id(), target).await? {
                        errors.add("business_user", "You have already reviewed this business user.");
                    }
                }
                Some(_) => errors.add("business_user", "Reviews can only be written for business users."),
                None => errors.add("business_user", format!("User {} does not exist.", target)),
            },
        }
        errors.into_result()?;

        let (Some(business_user_id), Some(rating), Some(description)) = (input.business_user, input.rating, description)
        else {
            return Err(DomainError::internal("review passed validation with missing fields"));
        };
        let review = self
            .review_repo
            .create(NewReview {
                business_user_id,
                reviewer_id: caller.id(),
                rating,
                description,
            })
            .await?;

        info!(
            "Customer {} reviewed business {} with rating {}",
            caller.id(),
            review.business_user_id,
            review.rating
        );
        Ok(review)
    }

    pub async fn update(&self, caller: &User, id: i64, input: UpdateReviewInput) -> Result<Review, DomainError> {
        let mut review = self.get(id).await?;
        ensure_owner_or_staff(caller, review.reviewer_id, "Only the author can edit this review.")?;

        let mut errors = FieldErrors::new();
        if let Some(rating) = input.rating {
            if RATING_RANGE.contains(&rating) {
                review.rating = rating;
            } else {
                errors.add("rating", RATING_OUT_OF_RANGE);
            }
        }
        if let Some(description) = optional_text(&mut errors, "description", input.description.as_deref()) {
            review.description = description;
        }
        errors.into_result()?;
        review.updated_at = Utc::now();

        self.review_repo.update(&review).await?;
        info!("Review {} updated by user {}", review.id, caller.id());
        Ok(review)
    }

    pub async fn delete(&self, caller: &User, id: i64) -> Result<(), DomainError> {
        let review = self.get(id).await?;
        ensure_owner_or_staff(caller, review.reviewer_id, "Only the author can delete this review.")?;

        self.review_repo.delete(review.id).await?;
        info!("Review {} deleted by user {}", review.id, caller.id());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::RegistrationInput;
    use crate::connector::{Container, ContainerConfig};

    async fn register(container: &Container, name: &str, profile_type: &str) -> User {
        let session = container
            .register_use_case()
            .execute(RegistrationInput {
                username: Some(name.to_string()),
                email: Some(format!("{}@example.com", name)),
                password: Some("pw".to_string()),
                repeated_password: Some("pw".to_string()),
                profile_type: Some(profile_type.to_string()),
            })
            .await
            .unwrap();
        container.authenticate_use_case().execute(&session.token).await.unwrap()
    }

    #[tokio::test]
    async fn test_description_required_and_not_blank() {
        let container = Container::new(ContainerConfig::in_memory().with_password_iterations(1))
            .await
            .unwrap();
        let anna = register(&container, "anna", "business").await;
        let carl = register(&container, "carl", "customer").await;
        let reviews = container.reviews_use_case();

        for description in [None, Some(" ".to_string())] {
            let err = reviews
                .create(
                    &carl,
                    CreateReviewInput {
                        business_user: Some(anna.id()),
                        rating: Some(4),
                        description,
                    },
                )
                .await
                .unwrap_err();
            match err {
                DomainError::Validation(errors) => assert!(errors.contains("description")),
                other => panic!("expected validation error, got {:?}", other),
            }
        }

        let review = reviews
            .create(
                &carl,
                CreateReviewInput {
                    business_user: Some(anna.id()),
                    rating: Some(4),
                    description: Some(" Fast and friendly ".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(review.description, "Fast and friendly");

        let err = reviews
            .update(
                &carl,
                review.id,
                UpdateReviewInput {
                    rating: Some(9),
                    description: Some(String::new()),
                },
            )
            .await
            .unwrap_err();
        match err {
            DomainError::Validation(errors) => {
                assert!(errors.contains("rating"));
                assert!(errors.contains("description"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
        assert_eq!(reviews.get(review.id).await.unwrap().rating, 4);
    }
}
