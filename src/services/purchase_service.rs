// src/services/purchase_service.rs

use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::{
    common::error::{deny, AppError},
    db::{ProductRepository, PurchaseRepository, UserRepository},
    models::auth::Principal,
    models::catalog::{round_price, Product, PurchaseProductPayload},
    models::purchase::{PurchaseView, PurchaseWithProduct},
    models::rbac::role_level,
};

#[derive(Clone)]
pub struct PurchaseService {
    product_repo: ProductRepository,
    purchase_repo: PurchaseRepository,
    user_repo: UserRepository,
    pool: PgPool,
}

impl PurchaseService {
    pub fn new(
        product_repo: ProductRepository,
        purchase_repo: PurchaseRepository,
        user_repo: UserRepository,
        pool: PgPool,
    ) -> Self {
        Self {
            product_repo,
            purchase_repo,
            user_repo,
            pool,
        }
    }

    pub async fn purchase_product(
        &self,
        principal: &Principal,
        payload: &PurchaseProductPayload,
    ) -> Result<PurchaseView, AppError> {
        if !principal.has_level(role_level::USUARIO) {
            return Err(AppError::PermissionDenied(deny::INSUFFICIENT_PERMISSIONS));
        }

        let current_user = self
            .user_repo
            .find_by_id(principal.user_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        // --- INÍCIO DA TRANSAÇÃO ---
        // A linha do produto fica travada (FOR UPDATE) até o commit, então
        // duas compras simultâneas do mesmo produto serializam aqui.
        let mut tx = self.pool.begin().await?;

        let product = self
            .product_repo
            .find_for_update(&mut *tx, payload.product_id)
            .await?
            .ok_or(AppError::ProductNotFound)?;

        let snapshot_price = check_purchasable(&product, payload.quantity)?;

        // Baixa de estoque e registro da compra entram juntos, ou nada entra.
        // Qualquer erro antes do commit derruba a transação inteira (drop).
        self.product_repo
            .decrement_stock(&mut *tx, product.id, payload.quantity)
            .await?;

        let purchase = self
            .purchase_repo
            .insert(
                &mut *tx,
                current_user.id,
                product.id,
                payload.quantity,
                snapshot_price,
            )
            .await?;

        tx.commit().await?;
        // --- FIM DA TRANSAÇÃO ---

        Ok(PurchaseView {
            id: purchase.id,
            product_name: product.name,
            quantity: purchase.quantity,
            purchase_price: purchase.purchase_price,
            purchased_at: purchase.purchased_at,
        })
    }

    pub async fn my_purchases(&self, principal: &Principal) -> Result<Vec<PurchaseView>, AppError> {
        if !principal.has_level(role_level::USUARIO) {
            return Err(AppError::PermissionDenied(deny::INSUFFICIENT_PERMISSIONS));
        }

        // Usuário não resolvível devolve lista vazia, não erro.
        let Some(current_user) = self.user_repo.find_by_id(principal.user_id).await? else {
            return Ok(Vec::new());
        };

        let purchases = self.purchase_repo.list_by_user(current_user.id).await?;
        Ok(purchases
            .into_iter()
            .map(PurchaseWithProduct::into_view)
            .collect())
    }
}

/// Pré-condições de compra, na ordem do contrato: disponibilidade
/// (ativo e fora do fluxo de deleção) e saldo. Devolve o preço arredondado
/// que será congelado no registro.
pub(crate) fn check_purchasable(product: &Product, quantity: i32) -> Result<Decimal, AppError> {
    if !product.is_active || product.deletion_state().is_pending() {
        return Err(AppError::ProductUnavailable);
    }
    if product.stock < quantity {
        return Err(AppError::InsufficientStock(product.stock));
    }
    Ok(round_price(product.price))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn product(stock: i32, is_active: bool, pending: bool) -> Product {
        let requester = pending.then(Uuid::new_v4);
        Product {
            id: Uuid::new_v4(),
            name: "Caderno".to_string(),
            description: None,
            price: "19.999".parse().unwrap(),
            stock,
            is_active,
            created_at: Utc::now(),
            updated_at: None,
            created_by_user_id: Uuid::new_v4(),
            pending_deletion: pending,
            requested_deletion_by_user_id: requester,
            deletion_requested_at: pending.then(Utc::now),
        }
    }

    #[test]
    fn compra_congela_o_preco_arredondado() {
        let price = check_purchasable(&product(10, true, false), 3).unwrap();
        assert_eq!(price, "20.00".parse::<Decimal>().unwrap());
    }

    #[test]
    fn produto_inativo_esta_indisponivel() {
        assert!(matches!(
            check_purchasable(&product(10, false, false), 1),
            Err(AppError::ProductUnavailable)
        ));
    }

    #[test]
    fn produto_pendente_de_delecao_esta_indisponivel() {
        assert!(matches!(
            check_purchasable(&product(10, true, true), 1),
            Err(AppError::ProductUnavailable)
        ));
    }

    #[test]
    fn saldo_insuficiente_informa_o_disponivel() {
        assert!(matches!(
            check_purchasable(&product(2, true, false), 3),
            Err(AppError::InsufficientStock(2))
        ));
    }

    #[test]
    fn quantidade_igual_ao_saldo_e_aceita() {
        assert!(check_purchasable(&product(3, true, false), 3).is_ok());
    }
}
