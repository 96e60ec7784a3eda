// src/services/product_service.rs

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::{deny, AppError},
    db::{ProductRepository, UserRepository},
    models::auth::{Principal, User},
    models::catalog::{
        round_price, CreateProductPayload, ProductView, ProductWithUsers, UpdateProductPayload,
    },
    models::rbac::role_level,
};

/// Desfecho de um pedido de deleção: admin remove na hora, funcionário
/// abre uma solicitação que espera aprovação.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionOutcome {
    Deleted,
    PendingApproval,
}

#[derive(Clone)]
pub struct ProductService {
    product_repo: ProductRepository,
    user_repo: UserRepository,
    pool: PgPool,
}

impl ProductService {
    pub fn new(product_repo: ProductRepository, user_repo: UserRepository, pool: PgPool) -> Self {
        Self {
            product_repo,
            user_repo,
            pool,
        }
    }

    // Admin (nível 3) enxerga inativos e pendentes; os demais só veem o
    // catálogo "público". Leitura exige ao menos nível 1: um claim
    // corrompido nega, nunca degrada para a visão pública.
    pub async fn list_products(&self, principal: &Principal) -> Result<Vec<ProductView>, AppError> {
        if !principal.has_level(role_level::USUARIO) {
            return Err(AppError::PermissionDenied(deny::INSUFFICIENT_PERMISSIONS));
        }
        let include_hidden = principal.has_level(role_level::ADMIN);
        let products = self.product_repo.list(include_hidden).await?;
        Ok(products.into_iter().map(ProductWithUsers::into_view).collect())
    }

    pub async fn get_product(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> Result<ProductView, AppError> {
        if !principal.has_level(role_level::USUARIO) {
            return Err(AppError::PermissionDenied(deny::INSUFFICIENT_PERMISSIONS));
        }
        let product = self
            .product_repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::ProductNotFound)?;
        Ok(product.into_view())
    }

    pub async fn create_product(
        &self,
        principal: &Principal,
        payload: &CreateProductPayload,
    ) -> Result<ProductView, AppError> {
        if !principal.has_level(role_level::FUNCIONARIO) {
            return Err(AppError::PermissionDenied(deny::ONLY_EMPLOYEES_CAN_CREATE));
        }

        let current_user = self.resolve_acting_user(principal).await?;

        let product = self
            .product_repo
            .create(
                &self.pool,
                &payload.name,
                payload.description.as_deref(),
                round_price(payload.price),
                payload.stock,
                current_user.id,
            )
            .await?;

        // Produto recém-criado: criador conhecido, nenhum fluxo de deleção.
        Ok(ProductView {
            id: product.id,
            name: product.name,
            description: product.description,
            price: product.price,
            stock: product.stock,
            is_active: product.is_active,
            created_at: product.created_at,
            updated_at: product.updated_at,
            created_by_username: Some(current_user.username),
            pending_deletion: false,
            requested_deletion_by_username: None,
            deletion_requested_at: None,
        })
    }

    pub async fn update_product(
        &self,
        principal: &Principal,
        id: Uuid,
        payload: &UpdateProductPayload,
    ) -> Result<(), AppError> {
        if !principal.has_level(role_level::FUNCIONARIO) {
            return Err(AppError::PermissionDenied(deny::ONLY_EMPLOYEES_CAN_EDIT));
        }

        let product = self
            .product_repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::ProductNotFound)?;

        // Produto aguardando decisão do admin fica congelado.
        if product.deletion_state().is_pending() {
            return Err(AppError::CannotEditPendingDeletion);
        }

        let name = payload.name.as_deref().filter(|n| !n.is_empty());
        let price = payload.price.map(round_price);

        self.product_repo
            .update_partial(
                &self.pool,
                id,
                name,
                payload.description.is_some(),
                payload.description.as_ref().and_then(|d| d.as_deref()),
                price,
                payload.stock,
                payload.is_active,
            )
            .await
    }

    pub async fn delete_product(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> Result<DeletionOutcome, AppError> {
        let product = self
            .product_repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::ProductNotFound)?;

        match resolve_delete_action(principal)? {
            DeleteAction::HardDelete => {
                self.product_repo.delete(&self.pool, product.id).await?;
                Ok(DeletionOutcome::Deleted)
            }
            DeleteAction::RequestApproval => {
                let current_user = self.resolve_acting_user(principal).await?;
                self.product_repo
                    .mark_pending_deletion(&self.pool, product.id, current_user.id, Utc::now())
                    .await?;
                Ok(DeletionOutcome::PendingApproval)
            }
        }
    }

    pub async fn list_pending_deletion(
        &self,
        principal: &Principal,
    ) -> Result<Vec<ProductView>, AppError> {
        if !principal.has_level(role_level::ADMIN) {
            return Err(AppError::PermissionDenied(deny::ONLY_ADMINS_CAN_VIEW_PENDING));
        }
        let products = self.product_repo.list_pending_deletion().await?;
        Ok(products.into_iter().map(ProductWithUsers::into_view).collect())
    }

    pub async fn approve_deletion(&self, principal: &Principal, id: Uuid) -> Result<(), AppError> {
        if !principal.has_level(role_level::ADMIN) {
            return Err(AppError::PermissionDenied(deny::ONLY_ADMINS_CAN_APPROVE));
        }

        let product = self
            .product_repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::ProductNotFound)?;

        if !product.deletion_state().is_pending() {
            return Err(AppError::NotPendingDeletion);
        }

        self.product_repo.delete(&self.pool, product.id).await
    }

    pub async fn reject_deletion(&self, principal: &Principal, id: Uuid) -> Result<(), AppError> {
        if !principal.has_level(role_level::ADMIN) {
            return Err(AppError::PermissionDenied(deny::ONLY_ADMINS_CAN_REJECT));
        }

        let product = self
            .product_repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::ProductNotFound)?;

        if !product.deletion_state().is_pending() {
            return Err(AppError::NotPendingDeletion);
        }

        self.product_repo
            .clear_pending_deletion(&self.pool, product.id)
            .await
    }

    // O principal carrega só claims; o usuário de verdade vem do banco.
    async fn resolve_acting_user(&self, principal: &Principal) -> Result<User, AppError> {
        self.user_repo
            .find_by_id(principal.user_id)
            .await?
            .ok_or(AppError::UserNotFound)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DeleteAction {
    HardDelete,
    RequestApproval,
}

/// Decisão pura do fluxo de deleção: admin remove direto (sem passar pelo
/// estado pendente), funcionário abre solicitação, abaixo disso nega.
pub(crate) fn resolve_delete_action(principal: &Principal) -> Result<DeleteAction, AppError> {
    if principal.has_level(role_level::ADMIN) {
        Ok(DeleteAction::HardDelete)
    } else if principal.has_level(role_level::FUNCIONARIO) {
        Ok(DeleteAction::RequestApproval)
    } else {
        Err(AppError::PermissionDenied(deny::ONLY_EMPLOYEES_CAN_DELETE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal_with_level(level: &str) -> Principal {
        Principal {
            user_id: Uuid::new_v4(),
            display_name: "teste@exemplo.com".to_string(),
            role_name: "qualquer".to_string(),
            role_level: level.to_string(),
        }
    }

    #[test]
    fn admin_deleta_direto() {
        let action = resolve_delete_action(&principal_with_level("3")).unwrap();
        assert_eq!(action, DeleteAction::HardDelete);
    }

    #[test]
    fn funcionario_abre_solicitacao() {
        let action = resolve_delete_action(&principal_with_level("2")).unwrap();
        assert_eq!(action, DeleteAction::RequestApproval);
    }

    #[test]
    fn usuario_comum_e_negado() {
        assert!(matches!(
            resolve_delete_action(&principal_with_level("1")),
            Err(AppError::PermissionDenied(_))
        ));
    }

    #[test]
    fn claim_corrompido_e_negado() {
        assert!(matches!(
            resolve_delete_action(&principal_with_level("tres")),
            Err(AppError::PermissionDenied(_))
        ));
    }

    #[test]
    fn nivel_acima_de_admin_tambem_deleta_direto() {
        let action = resolve_delete_action(&principal_with_level("5")).unwrap();
        assert_eq!(action, DeleteAction::HardDelete);
    }
}
