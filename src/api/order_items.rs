use axum::{
    Json,
    extract::{Path, State},
};
use std::sync::Arc;
use uuid::Uuid;

use super::{ApiError, ApiResponse, AppState, OrderItemDto};

pub async fn list_order_items(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<OrderItemDto>>>, ApiError> {
    let items = state.store().order_items().get_all().await?;
    Ok(Json(ApiResponse::success(
        items.into_iter().map(OrderItemDto::from).collect(),
    )))
}

pub async fn get_order_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<OrderItemDto>>, ApiError> {
    let item = state
        .store()
        .order_items()
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Order item", id))?;

    Ok(Json(ApiResponse::success(item.into())))
}
