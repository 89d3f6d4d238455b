use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use super::{ApiError, ApiResponse, AppState, ProductDto, double_option};
use crate::api::validation::{validate_price, validate_product_name, validate_stock};
use crate::entities::products;
use sea_orm::{ActiveModelTrait, Set};

#[derive(Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub stock: i32,
    pub category: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

const fn default_true() -> bool {
    true
}

#[derive(Deserialize, Default)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub price: Option<f64>,
    pub stock: Option<i32>,
    #[serde(default, deserialize_with = "double_option")]
    pub category: Option<Option<String>>,
    pub is_active: Option<bool>,
}

pub async fn list_products(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<ProductDto>>>, ApiError> {
    let products = state.store().products().get_all().await?;
    Ok(Json(ApiResponse::success(
        products.into_iter().map(ProductDto::from).collect(),
    )))
}

pub async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ProductDto>>, ApiError> {
    let product = state
        .store()
        .products()
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", id))?;

    Ok(Json(ApiResponse::success(product.into())))
}

pub async fn get_product_by_name(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<ProductDto>>, ApiError> {
    let product = state
        .store()
        .products()
        .get_by_name(&name)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Product '{name}' not found")))?;

    Ok(Json(ApiResponse::success(product.into())))
}

pub async fn create_product(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateProductRequest>,
) -> Result<Json<ApiResponse<ProductDto>>, ApiError> {
    validate_product_name(&req.name)?;
    validate_price(req.price)?;
    validate_stock(req.stock)?;

    let product = state
        .store()
        .products()
        .create(products::ActiveModel {
            name: Set(req.name),
            description: Set(req.description),
            price: Set(req.price),
            stock: Set(req.stock),
            category: Set(req.category),
            is_active: Set(req.is_active),
            ..Default::default()
        })
        .await?;

    tracing::info!(product_id = %product.id, "Created product '{}'", product.name);
    Ok(Json(ApiResponse::success(product.into())))
}

pub async fn update_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateProductRequest>,
) -> Result<Json<ApiResponse<ProductDto>>, ApiError> {
    let mut patch = <products::ActiveModel as sea_orm::ActiveModelTrait>::default();

    if let Some(name) = req.name {
        validate_product_name(&name)?;
        patch.name = Set(name);
    }
    if let Some(description) = req.description {
        patch.description = Set(description);
    }
    if let Some(price) = req.price {
        validate_price(price)?;
        patch.price = Set(price);
    }
    if let Some(stock) = req.stock {
        validate_stock(stock)?;
        patch.stock = Set(stock);
    }
    if let Some(category) = req.category {
        patch.category = Set(category);
    }
    if let Some(is_active) = req.is_active {
        patch.is_active = Set(is_active);
    }

    // An empty patch is a no-op read, not an empty UPDATE.
    if !patch.is_changed() {
        let product = state
            .store()
            .products()
            .get(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Product", id))?;
        return Ok(Json(ApiResponse::success(product.into())));
    }

    patch.id = Set(id);
    let product = state.store().products().update(patch).await?;
    Ok(Json(ApiResponse::success(product.into())))
}

/// Products are soft-deleted so existing order items keep a valid
/// reference; the row stays but is marked inactive.
pub async fn delete_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<bool>>, ApiError> {
    let deleted = state.store().products().soft_delete(id).await?;
    if deleted {
        tracing::info!(product_id = %id, "Deactivated product");
    }
    Ok(Json(ApiResponse::success(deleted)))
}
