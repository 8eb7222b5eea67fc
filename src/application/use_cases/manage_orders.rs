use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use crate::application::{OfferRepository, OrderRepository, ProfileRepository};
use crate::domain::validation::REQUIRED;
use crate::domain::{DomainError, NewOrder, Order, OrderStatus, ProfileType, User};

use super::permissions::{ensure_owner, ensure_staff, require_role};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateOrderInput {
    pub offer_detail_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateOrderInput {
    pub status: Option<String>,
}

pub struct ManageOrdersUseCase {
    order_repo: Arc<dyn OrderRepository>,
    offer_repo: Arc<dyn OfferRepository>,
    profile_repo: Arc<dyn ProfileRepository>,
}

impl ManageOrdersUseCase {
    pub fn new(
        order_repo: Arc<dyn OrderRepository>,
        offer_repo: Arc<dyn OfferRepository>,
        profile_repo: Arc<dyn ProfileRepository>,
    ) -> Self {
        Self {
            order_repo,
            offer_repo,
            profile_repo,
        }
    }

    pub async fn list(&self, caller: &User) -> Result<Vec<Order>, DomainError> {
        self.order_repo.list_for_user(caller.id()).await
    }

    pub async fn get(&self, id: i64) -> Result<Order, DomainError> {
        self.order_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Order {} not found", id)))
    }

    /// Places an order for one offer tier, copying the tier's terms so later
    /// edits to the offer leave the order untouched.
    pub async fn create(&self, caller: &User, input: CreateOrderInput) -> Result<Order, DomainError> {
        require_role(
            self.profile_repo.as_ref(),
            caller,
            ProfileType::Customer,
            "Only customers can place orders.",
        )
        .await?;

        let detail_id = input
            .offer_detail_id
            .ok_or_else(|| DomainError::field("offer_detail_id", REQUIRED))?;
        let detail = self
            .offer_repo
            .find_detail(detail_id)
            .await?
            .ok_or_else(|| DomainError::field("offer_detail_id", format!("Offer detail {} does not exist.", detail_id)))?;
        let offer = self
            .offer_repo
            .find_by_id(detail.offer_id)
            .await?
            .ok_or_else(|| DomainError::field("offer_detail_id", "The offer of this detail no longer exists."))?;

        let order = self
            .order_repo
            .create(NewOrder::from_detail(&detail, caller.id(), offer.user_id()))
            .await?;

        info!(
            "Customer {} ordered detail {} from business {} (order {})",
            caller.id(),
            detail.id,
            order.business_user_id,
            order.id
        );
        Ok(order)
    }

    pub async fn update_status(&self, caller: &User, id: i64, input: UpdateOrderInput) -> Result<Order, DomainError> {
        let mut order = self.get(id).await?;
        ensure_owner(
            caller,
            order.business_user_id,
            "Only the business user of this order can change its status.",
        )?;

        let raw = input.status.ok_or_else(|| DomainError::field("status", REQUIRED))?;
        let status = OrderStatus::parse(&raw).ok_or_else(|| {
            DomainError::field(
                "status",
                format!("\"{}\" is not a valid choice (pending, in_progress, completed, cancelled).", raw),
            )
        })?;

        order.set_status(status, Utc::now());
        self.order_repo.update(&order).await?;

        info!("Order {} moved to {}", order.id, status.as_str());
        Ok(order)
    }

    pub async fn delete(&self, caller: &User, id: i64) -> Result<(), DomainError> {
        let order = self.get(id).await?;
        ensure_staff(caller, "Only staff members can delete orders.")?;

        self.order_repo.delete(order.id).await?;
        info!("Staff user {} deleted order {}", caller.id(), order.id);
        Ok(())
    }

    /// Orders still waiting to be delivered by `business_user_id`.
    pub async fn open_count(&self, business_user_id: i64) -> Result<u64, DomainError> {
        self.ensure_business(business_user_id).await?;
        self.order_repo
            .count_for_business(business_user_id, &OrderStatus::OPEN)
            .await
    }

    pub async fn completed_count(&self, business_user_id: i64) -> Result<u64, DomainError> {
        self.ensure_business(business_user_id).await?;
        self.order_repo
            .count_for_business(business_user_id, &[OrderStatus::Completed])
            .await
    }

    async fn ensure_business(&self, user_id: i64) -> Result<(), DomainError> {
        match self.profile_repo.find_by_user(user_id).await? {
            Some(profile) if profile.is_business() => Ok(()),
            _ => Err(DomainError::not_found(format!("No business user with id {}", user_id))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{CreateOfferInput, RegistrationInput, UpdateOfferInput};
    use crate::connector::{Container, ContainerConfig};
    use crate::domain::OfferDetailInput;

    async fn container() -> Container {
        Container::new(ContainerConfig::in_memory().with_password_iterations(1))
            .await
            .unwrap()
    }

    async fn register(container: &Container, name: &str, profile_type: &str, staff: bool) -> User {
        let input = RegistrationInput {
            username: Some(name.to_string()),
            email: Some(format!("{}@example.com", name)),
            password: Some("pw".to_string()),
            repeated_password: Some("pw".to_string()),
            profile_type: Some(profile_type.to_string()),
        };
        let use_case = container.register_use_case();
        let session = if staff {
            use_case.create_staff(input).await.unwrap()
        } else {
            use_case.execute(input).await.unwrap()
        };
        container.authenticate_use_case().execute(&session.token).await.unwrap()
    }

    fn basic_tier(price: f64) -> OfferDetailInput {
        OfferDetailInput {
            title: Some("Basic".to_string()),
            revisions: Some(1),
            delivery_time_in_days: Some(5),
            price: Some(price),
            features: Some(vec!["Logo".to_string()]),
            offer_type: Some("basic".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_order_keeps_terms_after_offer_edit() {
        let container = container().await;
        let anna = register(&container, "anna", "business", false).await;
        let carl = register(&container, "carl", "customer", false).await;

        let offers = container.offers_use_case();
        let offer = offers
            .create(
                &anna,
                CreateOfferInput {
                    title: Some("Logo".to_string()),
                    description: Some("Logos for small shops".to_string()),
                    details: Some(vec![basic_tier(100.0)]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let detail_id = offer.details()[0].id;

        let orders = container.orders_use_case();
        let order = orders
            .create(&carl, CreateOrderInput { offer_detail_id: Some(detail_id) })
            .await
            .unwrap();
        assert_eq!(order.business_user_id, anna.id());
        assert_eq!(order.status, OrderStatus::InProgress);

        offers
            .update(
                &anna,
                offer.id(),
                UpdateOfferInput {
                    details: Some(vec![OfferDetailInput {
                        id: Some(detail_id),
                        price: Some(250.0),
                        ..Default::default()
                    }]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(orders.get(order.id).await.unwrap().price, 100.0);
        assert_eq!(offers.get_detail(detail_id).await.unwrap().price, 250.0);
    }

    #[tokio::test]
    async fn test_missing_detail_id_is_a_field_error() {
        let container = container().await;
        let carl = register(&container, "carl", "customer", false).await;

        let err = container
            .orders_use_case()
            .create(&carl, CreateOrderInput::default())
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_only_staff_delete_orders() {
        let container = container().await;
        let anna = register(&container, "anna", "business", false).await;
        let carl = register(&container, "carl", "customer", false).await;
        let root = register(&container, "root", "business", true).await;

        let offer = container
            .offers_use_case()
            .create(
                &anna,
                CreateOfferInput {
                    title: Some("Logo".to_string()),
                    description: Some("Logos for small shops".to_string()),
                    details: Some(vec![basic_tier(100.0)]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let orders = container.orders_use_case();
        let order = orders
            .create(&carl, CreateOrderInput { offer_detail_id: Some(offer.details()[0].id) })
            .await
            .unwrap();

        assert!(orders.delete(&carl, order.id).await.unwrap_err().is_permission_denied());
        assert!(orders.delete(&anna, order.id).await.unwrap_err().is_permission_denied());
        orders.delete(&root, order.id).await.unwrap();
        assert!(orders.get(order.id).await.unwrap_err().is_not_found());
    }
}
