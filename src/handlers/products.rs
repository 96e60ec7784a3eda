// src/handlers/products.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::catalog::{CreateProductPayload, PurchaseProductPayload, UpdateProductPayload},
    services::product_service::DeletionOutcome,
};

// GET /api/products
pub async fn get_all(
    State(app_state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let products = app_state.product_service.list_products(&principal).await?;
    Ok(Json(products))
}

// GET /api/products/{id}
pub async fn get_by_id(
    State(app_state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let product = app_state.product_service.get_product(&principal, id).await?;
    Ok(Json(product))
}

// POST /api/products
pub async fn create(
    State(app_state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Json(payload): Json<CreateProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let product = app_state
        .product_service
        .create_product(&principal, &payload)
        .await?;

    Ok((StatusCode::CREATED, Json(product)))
}

// PUT /api/products/{id}
pub async fn update(
    State(app_state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    app_state
        .product_service
        .update_product(&principal, id, &payload)
        .await?;

    Ok(Json(json!({ "message": "Produto atualizado com sucesso" })))
}

// DELETE /api/products/{id}
// Admin remove na hora; funcionário abre uma solicitação de deleção.
pub async fn delete(
    State(app_state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = app_state
        .product_service
        .delete_product(&principal, id)
        .await?;

    let message = match outcome {
        DeletionOutcome::Deleted => "Produto deletado com sucesso",
        DeletionOutcome::PendingApproval => {
            "Solicitação de deleção enviada para aprovação do admin"
        }
    };

    Ok(Json(json!({ "message": message })))
}

// GET /api/products/pending-deletion
pub async fn get_pending_deletion(
    State(app_state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let products = app_state
        .product_service
        .list_pending_deletion(&principal)
        .await?;
    Ok(Json(products))
}

// POST /api/products/{id}/approve-deletion
pub async fn approve_deletion(
    State(app_state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .product_service
        .approve_deletion(&principal, id)
        .await?;

    Ok(Json(json!({ "message": "Deleção aprovada e produto removido" })))
}

// POST /api/products/{id}/reject-deletion
pub async fn reject_deletion(
    State(app_state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .product_service
        .reject_deletion(&principal, id)
        .await?;

    Ok(Json(json!({ "message": "Solicitação de deleção rejeitada" })))
}

// POST /api/products/purchase
pub async fn purchase(
    State(app_state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Json(payload): Json<PurchaseProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let purchase = app_state
        .purchase_service
        .purchase_product(&principal, &payload)
        .await?;

    Ok((StatusCode::CREATED, Json(purchase)))
}

// GET /api/products/my-products
pub async fn get_my_products(
    State(app_state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let purchases = app_state.purchase_service.my_purchases(&principal).await?;
    Ok(Json(purchases))
}
