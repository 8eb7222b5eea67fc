use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, info};

use crate::application::{OfferRepository, ProfileRepository};
use crate::domain::validation::{optional_text, required_text, REQUIRED};
use crate::domain::{
    DomainError, FieldErrors, NewOffer, NewOfferDetail, Offer, OfferChanges, OfferDetail, OfferDetailInput,
    OfferQuery, OfferType, Profile, ProfileType, User,
};

use super::permissions::{ensure_owner_or_staff, require_role};

const DUPLICATE_TIER_TYPE: &str = "Another detail of this offer already has this offer_type.";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateOfferInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub details: Option<Vec<OfferDetailInput>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateOfferInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub details: Option<Vec<OfferDetailInput>>,
}

/// An offer together with its owner's profile, as shown in listings.
#[derive(Debug, Clone, PartialEq)]
pub struct OfferListing {
    pub offer: Offer,
    pub owner: Option<Profile>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OfferListingPage {
    pub count: u64,
    pub has_next: bool,
    pub has_previous: bool,
    pub entries: Vec<OfferListing>,
}

pub struct ManageOffersUseCase {
    offer_repo: Arc<dyn OfferRepository>,
    profile_repo: Arc<dyn ProfileRepository>,
}

impl ManageOffersUseCase {
    pub fn new(offer_repo: Arc<dyn OfferRepository>, profile_repo: Arc<dyn ProfileRepository>) -> Self {
        Self {
            offer_repo,
            profile_repo,
        }
    }

    /// Runs the filtered listing. A page beyond the last one is an error,
    /// except for the first page of an empty result.
    pub async fn list(&self, query: &OfferQuery) -> Result<OfferListingPage, DomainError> {
        let page = self.offer_repo.search(query).await?;
        if page.offers.is_empty() && query.page() > 1 {
            return Err(DomainError::not_found("Invalid page."));
        }
        debug!("Offer listing page {} returned {} of {}", query.page(), page.offers.len(), page.count);

        let has_next = page.has_next(query);
        let has_previous = page.has_previous(query);

        let mut owners: HashMap<i64, Option<Profile>> = HashMap::new();
        let mut entries = Vec::with_capacity(page.offers.len());
        for offer in page.offers {
            let owner = match owners.get(&offer.user_id()) {
                Some(cached) => cached.clone(),
                None => {
                    let profile = self.profile_repo.find_by_user(offer.user_id()).await?;
                    owners.insert(offer.user_id(), profile.clone());
                    profile
                }
            };
            entries.push(OfferListing { offer, owner });
        }

        Ok(OfferListingPage {
            count: page.count,
            has_next,
            has_previous,
            entries,
        })
    }

    pub async fn get(&self, id: i64) -> Result<Offer, DomainError> {
        self.offer_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Offer {} not found", id)))
    }

    pub async fn get_detail(&self, id: i64) -> Result<OfferDetail, DomainError> {
        self.offer_repo
            .find_detail(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Offer detail {} not found", id)))
    }

    pub async fn create(&self, caller: &User, input: CreateOfferInput) -> Result<Offer, DomainError> {
        require_role(
            self.profile_repo.as_ref(),
            caller,
            ProfileType::Business,
            "Only business users can create offers.",
        )
        .await?;

        let mut errors = FieldErrors::new();
        let title = required_text(&mut errors, "title", input.title.as_deref());
        let description = required_text(&mut errors, "description", input.description.as_deref());
        let image = input.image.filter(|i| !i.trim().is_empty());

        let mut details: Vec<NewOfferDetail> = Vec::new();
        match input.details {
            None => errors.add("details", REQUIRED),
            Some(inputs) if inputs.is_empty() => errors.add("details", "An offer needs at least one detail."),
            Some(inputs) => {
                for (i, detail) in inputs.iter().enumerate() {
                    match detail.validate_new() {
                        Ok(valid) => {
                            if details.iter().any(|d| d.offer_type == valid.offer_type) {
                                errors.add(format!("details[{}].offer_type", i), DUPLICATE_TIER_TYPE);
                            }
                            details.push(valid);
                        }
                        Err(detail_errors) => errors.extend_prefixed(&format!("details[{}]", i), detail_errors),
                    }
                }
            }
        }
        errors.into_result()?;

        let (Some(title), Some(description)) = (title, description) else {
            return Err(DomainError::internal("offer passed validation without a title or description"));
        };
        let offer = self
            .offer_repo
            .create(NewOffer {
                user_id: caller.id(),
                title,
                description,
                image,
                details,
            })
            .await?;

        info!(
            "User {} created offer {} with {} tier(s)",
            caller.id(),
            offer.id(),
            offer.details().len()
        );
        Ok(offer)
    }

    pub async fn update(&self, caller: &User, id: i64, input: UpdateOfferInput) -> Result<Offer, DomainError> {
        let mut offer = self.get(id).await?;
        ensure_owner_or_staff(caller, offer.user_id(), "Only the owner can edit this offer.")?;

        let mut errors = FieldErrors::new();
        let mut changes = OfferChanges {
            title: optional_text(&mut errors, "title", input.title.as_deref()),
            description: optional_text(&mut errors, "description", input.description.as_deref()),
            image: input.image,
            details: Vec::new(),
        };

        // Tier types as they will be after the patch, to keep them unique.
        let mut tier_types: Vec<OfferType> = offer.details().iter().map(|d| d.offer_type).collect();
        let mut retyped = Vec::new();

        for (i, detail) in input.details.unwrap_or_default().iter().enumerate() {
            let prefix = format!("details[{}]", i);
            let target_type = detail.offer_type.as_deref().and_then(OfferType::parse);
            let Some(index) = offer.find_detail_index(detail.id, target_type) else {
                errors.add(
                    prefix,
                    "No matching detail on this offer. Give the detail id or an existing offer_type.",
                );
                continue;
            };
            match detail.validate_changes() {
                Ok(detail_changes) => {
                    if let Some(new_type) = detail_changes.offer_type {
                        tier_types[index] = new_type;
                        retyped.push((prefix, new_type));
                    }
                    changes.details.push((index, detail_changes));
                }
                Err(detail_errors) => errors.extend_prefixed(&prefix, detail_errors),
            }
        }
        for (prefix, new_type) in retyped {
            if tier_types.iter().filter(|t| **t == new_type).count() > 1 {
                errors.add(format!("{}.offer_type", prefix), DUPLICATE_TIER_TYPE);
            }
        }
        errors.into_result()?;

        offer.apply(changes, Utc::now());
        self.offer_repo.update(&offer).await?;

        info!("User {} updated offer {}", caller.id(), offer.id());
        Ok(offer)
    }

    pub async fn delete(&self, caller: &User, id: i64) -> Result<(), DomainError> {
        let offer = self.get(id).await?;
        ensure_owner_or_staff(caller, offer.user_id(), "Only the owner can delete this offer.")?;

        self.offer_repo.delete(offer.id()).await?;
        info!("User {} deleted offer {}", caller.id(), offer.id());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::RegistrationInput;
    use crate::connector::{Container, ContainerConfig};

    async fn setup() -> (Container, User) {
        let container = Container::new(ContainerConfig::in_memory().with_password_iterations(1))
            .await
            .unwrap();
        let session = container
            .register_use_case()
            .execute(RegistrationInput {
                username: Some("anna".to_string()),
                email: Some("anna@example.com".to_string()),
                password: Some("pw".to_string()),
                repeated_password: Some("pw".to_string()),
                profile_type: Some("business".to_string()),
            })
            .await
            .unwrap();
        let anna = container.authenticate_use_case().execute(&session.token).await.unwrap();
        (container, anna)
    }

    fn tier(offer_type: &str, price: f64) -> OfferDetailInput {
        OfferDetailInput {
            title: Some(format!("{} package", offer_type)),
            revisions: Some(2),
            delivery_time_in_days: Some(5),
            price: Some(price),
            features: Some(vec!["Logo".to_string()]),
            offer_type: Some(offer_type.to_string()),
            ..Default::default()
        }
    }

    fn input(description: Option<&str>, details: Vec<OfferDetailInput>) -> CreateOfferInput {
        CreateOfferInput {
            title: Some("Logo design".to_string()),
            description: description.map(str::to_string),
            image: None,
            details: Some(details),
        }
    }

    fn validation_errors(err: DomainError) -> FieldErrors {
        match err {
            DomainError::Validation(errors) => errors,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_description_required_and_not_blank() {
        let (container, anna) = setup().await;
        let offers = container.offers_use_case();

        for description in [None, Some("   ")] {
            let err = offers
                .create(&anna, input(description, vec![tier("basic", 100.0)]))
                .await
                .unwrap_err();
            assert!(validation_errors(err).contains("description"));
        }

        let offer = offers
            .create(&anna, input(Some("Clean logos"), vec![tier("basic", 100.0)]))
            .await
            .unwrap();
        assert_eq!(offer.description(), "Clean logos");

        let err = offers
            .update(
                &anna,
                offer.id(),
                UpdateOfferInput {
                    description: Some(String::new()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(validation_errors(err).contains("description"));
    }

    #[tokio::test]
    async fn test_tier_types_stay_unique() {
        let (container, anna) = setup().await;
        let offers = container.offers_use_case();

        let err = offers
            .create(
                &anna,
                input(Some("Clean logos"), vec![tier("basic", 100.0), tier("basic", 200.0)]),
            )
            .await
            .unwrap_err();
        assert!(validation_errors(err).contains("details[1].offer_type"));

        let offer = offers
            .create(
                &anna,
                input(Some("Clean logos"), vec![tier("basic", 100.0), tier("premium", 400.0)]),
            )
            .await
            .unwrap();
        let premium_id = offer.details()[1].id;

        let err = offers
            .update(
                &anna,
                offer.id(),
                UpdateOfferInput {
                    details: Some(vec![OfferDetailInput {
                        id: Some(premium_id),
                        offer_type: Some("basic".to_string()),
                        ..Default::default()
                    }]),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(validation_errors(err).contains("details[0].offer_type"));

        let unchanged = offers.get(offer.id()).await.unwrap();
        let types: Vec<OfferType> = unchanged.details().iter().map(|d| d.offer_type).collect();
        assert_eq!(types, vec![OfferType::Basic, OfferType::Premium]);

        let updated = offers
            .update(
                &anna,
                offer.id(),
                UpdateOfferInput {
                    details: Some(vec![OfferDetailInput {
                        id: Some(premium_id),
                        offer_type: Some("standard".to_string()),
                        ..Default::default()
                    }]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.details()[1].offer_type, OfferType::Standard);
    }
}
