use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use super::{ApiError, ApiResponse, AppState, OrderDto, OrderItemDto};
use crate::api::validation::{validate_quantity, validate_total_amount};
use crate::db::OrderItemInput;
use crate::entities::orders;
use sea_orm::Set;

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub user_id: Uuid,
    #[serde(default)]
    pub items: Vec<OrderItemRequest>,
}

#[derive(Deserialize)]
pub struct OrderItemRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

/// Only the total can be patched after the fact; the item list is fixed
/// once the order is placed.
#[derive(Deserialize, Default)]
pub struct UpdateOrderRequest {
    pub total_amount: Option<f64>,
}

pub async fn list_orders(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<OrderDto>>>, ApiError> {
    let orders = state.store().orders().get_all().await?;
    Ok(Json(ApiResponse::success(
        orders.into_iter().map(OrderDto::from).collect(),
    )))
}

pub async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<OrderDto>>, ApiError> {
    let order = state
        .store()
        .orders()
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Order", id))?;

    Ok(Json(ApiResponse::success(order.into())))
}

pub async fn create_order(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<Json<ApiResponse<OrderDto>>, ApiError> {
    if req.items.is_empty() {
        return Err(ApiError::validation("Order must contain at least one item"));
    }
    for item in &req.items {
        validate_quantity(item.quantity)?;
    }

    state
        .store()
        .users()
        .get(req.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User", req.user_id))?;

    let items = req
        .items
        .into_iter()
        .map(|i| OrderItemInput {
            product_id: i.product_id,
            quantity: i.quantity,
        })
        .collect();

    let order = state
        .store()
        .orders()
        .create_with_items(req.user_id, items)
        .await?;

    tracing::info!(
        order_id = %order.id,
        user_id = %order.user_id,
        total = order.total_amount,
        "Created order"
    );
    Ok(Json(ApiResponse::success(order.into())))
}

pub async fn update_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateOrderRequest>,
) -> Result<Json<ApiResponse<OrderDto>>, ApiError> {
    // An empty patch is a no-op read, not an empty UPDATE.
    let Some(total_amount) = req.total_amount else {
        let order = state
            .store()
            .orders()
            .get(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Order", id))?;
        return Ok(Json(ApiResponse::success(order.into())));
    };

    validate_total_amount(total_amount)?;

    let patch = orders::ActiveModel {
        id: Set(id),
        total_amount: Set(total_amount),
        ..Default::default()
    };

    let order = state.store().orders().update(patch).await?;
    Ok(Json(ApiResponse::success(order.into())))
}

/// Removing an order cascades to its items; products are untouched.
pub async fn delete_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<bool>>, ApiError> {
    let deleted = state.store().orders().delete(id).await?;
    if deleted {
        tracing::info!(order_id = %id, "Deleted order");
    }
    Ok(Json(ApiResponse::success(deleted)))
}

pub async fn get_order_items(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<OrderItemDto>>>, ApiError> {
    state
        .store()
        .orders()
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Order", id))?;

    let items = state.store().order_items().get_for_order(id).await?;
    Ok(Json(ApiResponse::success(
        items.into_iter().map(OrderItemDto::from).collect(),
    )))
}
