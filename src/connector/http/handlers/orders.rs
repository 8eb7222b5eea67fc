use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::application::{CreateOrderInput, UpdateOrderInput};
use crate::connector::api::Container;
use crate::domain::{OfferType, Order, OrderStatus};

use super::super::error::ApiResult;
use super::super::extract::{ApiJson, ApiPath, CurrentUser};

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: i64,
    pub customer_user: i64,
    pub business_user: i64,
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

impl From<Order> for OrderResponse {
    fn from(o: Order) -> Self {
        Self {
            id: o.id,
            customer_user: o.customer_user_id,
            business_user: o.business_user_id,
            offer_detail_id: o.offer_detail_id,
            title: o.title,
            revisions: o.revisions,
            delivery_time_in_days: o.delivery_time_in_days,
            price: o.price,
            features: o.features,
            offer_type: o.offer_type,
            status: o.status,
            created_at: o.created_at,
            updated_at: o.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrderCount {
    pub order_count: u64,
}

#[derive(Debug, Serialize)]
pub struct CompletedOrderCount {
    pub completed_order_count: u64,
}

pub async fn list_orders(
    State(container): State<Container>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<OrderResponse>>> {
    let orders = container.orders_use_case().list(&user).await?;
    Ok(Json(orders.into_iter().map(Into::into).collect()))
}

pub async fn create_order(
    State(container): State<Container>,
    CurrentUser(user): CurrentUser,
    ApiJson(input): ApiJson<CreateOrderInput>,
) -> ApiResult<(StatusCode, Json<OrderResponse>)> {
    let order = container.orders_use_case().create(&user, input).await?;
    Ok((StatusCode::CREATED, Json(order.into())))
}

pub async fn get_order(
    State(container): State<Container>,
    CurrentUser(_user): CurrentUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<OrderResponse>> {
    let order = container.orders_use_case().get(id).await?;
    Ok(Json(order.into()))
}

pub async fn update_order(
    State(container): State<Container>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<UpdateOrderInput>,
) -> ApiResult<Json<OrderResponse>> {
    let order = container.orders_use_case().update_status(&user, id, input).await?;
    Ok(Json(order.into()))
}

pub async fn delete_order(
    State(container): State<Container>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
    container.orders_use_case().delete(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn order_count(
    State(container): State<Container>,
    CurrentUser(_user): CurrentUser,
    ApiPath(business_user_id): ApiPath<i64>,
) -> ApiResult<Json<OrderCount>> {
    let order_count = container.orders_use_case().open_count(business_user_id).await?;
    Ok(Json(OrderCount { order_count }))
}

pub async fn completed_order_count(
    State(container): State<Container>,
    CurrentUser(_user): CurrentUser,
    ApiPath(business_user_id): ApiPath<i64>,
) -> ApiResult<Json<CompletedOrderCount>> {
    let completed_order_count = container
        .orders_use_case()
        .completed_count(business_user_id)
        .await?;
    Ok(Json(CompletedOrderCount { completed_order_count }))
}
