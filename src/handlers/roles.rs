// src/handlers/roles.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::rbac::CreateRolePayload,
};

// GET /api/roles
pub async fn get_all(
    State(app_state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let roles = app_state.role_service.list_roles(&principal).await?;
    Ok(Json(roles))
}

// POST /api/roles
pub async fn create(
    State(app_state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Json(payload): Json<CreateRolePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let role = app_state
        .role_service
        .create_role(&principal, &payload)
        .await?;

    Ok((StatusCode::CREATED, Json(role)))
}
