// src/db/purchase_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::purchase::{Purchase, PurchaseWithProduct},
};

// Livro-razão de compras (tabela user_products). Registros são imutáveis:
// só existem insert e listagem.
#[derive(Clone)]
pub struct PurchaseRepository {
    pool: PgPool,
}

impl PurchaseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
        purchase_price: Decimal,
    ) -> Result<Purchase, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let purchase = sqlx::query_as::<_, Purchase>(
            r#"
            INSERT INTO user_products (user_id, product_id, quantity, purchase_price)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, product_id, quantity, purchase_price, purchased_at
            "#,
        )
        .bind(user_id)
        .bind(product_id)
        .bind(quantity)
        .bind(purchase_price)
        .fetch_one(executor)
        .await?;
        Ok(purchase)
    }

    pub async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<PurchaseWithProduct>, AppError> {
        let purchases = sqlx::query_as::<_, PurchaseWithProduct>(
            r#"
            SELECT
                up.id, up.user_id, up.product_id, up.quantity,
                up.purchase_price, up.purchased_at,
                p.name AS product_name
            FROM user_products up
            LEFT JOIN products p ON p.id = up.product_id
            WHERE up.user_id = $1
            ORDER BY up.purchased_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(purchases)
    }
}
