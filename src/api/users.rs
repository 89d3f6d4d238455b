use axum::{
    Json,
    extract::{Path, State},
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use super::{ApiError, ApiResponse, AppState, OrderDto, UserDto, double_option};
use crate::api::validation::{
    validate_email, validate_password, validate_person_name, validate_username,
};
use crate::db::repositories::user::hash_password_blocking;
use crate::entities::users;
use sea_orm::{ActiveModelTrait, Set};

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub gender: Option<users::Gender>,
    pub birthdate: Option<NaiveDate>,
    pub phone_number: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_superuser: bool,
}

const fn default_true() -> bool {
    true
}

#[derive(Deserialize, Default)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub gender: Option<Option<users::Gender>>,
    #[serde(default, deserialize_with = "double_option")]
    pub birthdate: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "double_option")]
    pub phone_number: Option<Option<String>>,
    pub is_active: Option<bool>,
    pub is_superuser: Option<bool>,
}

pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<UserDto>>>, ApiError> {
    let users = state.store().users().get_all().await?;
    Ok(Json(ApiResponse::success(
        users.into_iter().map(UserDto::from).collect(),
    )))
}

pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let user = state
        .store()
        .users()
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("User", id))?;

    Ok(Json(ApiResponse::success(user.into())))
}

pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateUserRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    validate_username(&req.username)?;
    validate_email(&req.email)?;
    validate_password(&req.password)?;
    validate_person_name("First name", &req.first_name)?;
    validate_person_name("Last name", &req.last_name)?;

    let security = state.config().read().await.security.clone();
    let password_hash = hash_password_blocking(&req.password, &security).await?;

    let user = state
        .store()
        .users()
        .create(users::ActiveModel {
            username: Set(req.username),
            email: Set(req.email),
            password: Set(password_hash),
            first_name: Set(req.first_name),
            last_name: Set(req.last_name),
            gender: Set(req.gender),
            birthdate: Set(req.birthdate),
            phone_number: Set(req.phone_number),
            is_active: Set(req.is_active),
            is_superuser: Set(req.is_superuser),
            ..Default::default()
        })
        .await?;

    tracing::info!(user_id = %user.id, "Created user '{}'", user.username);
    Ok(Json(ApiResponse::success(user.into())))
}

pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let mut patch = <users::ActiveModel as sea_orm::ActiveModelTrait>::default();

    if let Some(username) = req.username {
        validate_username(&username)?;
        patch.username = Set(username);
    }
    if let Some(email) = req.email {
        validate_email(&email)?;
        patch.email = Set(email);
    }
    if let Some(password) = req.password {
        validate_password(&password)?;
        let security = state.config().read().await.security.clone();
        patch.password = Set(hash_password_blocking(&password, &security).await?);
    }
    if let Some(first_name) = req.first_name {
        validate_person_name("First name", &first_name)?;
        patch.first_name = Set(first_name);
    }
    if let Some(last_name) = req.last_name {
        validate_person_name("Last name", &last_name)?;
        patch.last_name = Set(last_name);
    }
    if let Some(gender) = req.gender {
        patch.gender = Set(gender);
    }
    if let Some(birthdate) = req.birthdate {
        patch.birthdate = Set(birthdate);
    }
    if let Some(phone_number) = req.phone_number {
        patch.phone_number = Set(phone_number);
    }
    if let Some(is_active) = req.is_active {
        patch.is_active = Set(is_active);
    }
    if let Some(is_superuser) = req.is_superuser {
        patch.is_superuser = Set(is_superuser);
    }

    // An empty patch is a no-op read, not an empty UPDATE.
    if !patch.is_changed() {
        let user = state
            .store()
            .users()
            .get(id)
            .await?
            .ok_or_else(|| ApiError::not_found("User", id))?;
        return Ok(Json(ApiResponse::success(user.into())));
    }

    patch.id = Set(id);
    let user = state.store().users().update(patch).await?;
    Ok(Json(ApiResponse::success(user.into())))
}

pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<bool>>, ApiError> {
    let deleted = state.store().users().delete(id).await?;
    if deleted {
        tracing::info!(user_id = %id, "Deleted user");
    }
    Ok(Json(ApiResponse::success(deleted)))
}

pub async fn get_user_orders(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<OrderDto>>>, ApiError> {
    state
        .store()
        .users()
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("User", id))?;

    let orders = state.store().orders().get_by_user_id(id).await?;
    Ok(Json(ApiResponse::success(
        orders.into_iter().map(OrderDto::from).collect(),
    )))
}
