// src/db/product_repo.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::catalog::{Product, ProductWithUsers},
};

// Projeção com os usernames de criador/solicitante resolvidos.
// O LEFT JOIN tolera usuários removidos: o nome vem como NULL.
const SELECT_WITH_USERS: &str = r#"
    SELECT
        p.id, p.name, p.description, p.price, p.stock, p.is_active,
        p.created_at, p.updated_at,
        p.created_by_user_id,
        cu.username AS created_by_username,
        p.pending_deletion,
        p.requested_deletion_by_user_id,
        ru.username AS requested_deletion_by_username,
        p.deletion_requested_at
    FROM products p
    LEFT JOIN users cu ON cu.id = p.created_by_user_id
    LEFT JOIN users ru ON ru.id = p.requested_deletion_by_user_id
"#;

#[derive(Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Leituras
    // ---

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<ProductWithUsers>, AppError> {
        let query = format!("{SELECT_WITH_USERS} WHERE p.id = $1");
        let maybe_product = sqlx::query_as::<_, ProductWithUsers>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe_product)
    }

    // Admin enxerga tudo; os demais só veem produtos ativos e fora do
    // fluxo de deleção.
    pub async fn list(&self, include_hidden: bool) -> Result<Vec<ProductWithUsers>, AppError> {
        let query = if include_hidden {
            format!("{SELECT_WITH_USERS} ORDER BY p.created_at DESC")
        } else {
            format!(
                "{SELECT_WITH_USERS} WHERE p.is_active AND NOT p.pending_deletion \
                 ORDER BY p.created_at DESC"
            )
        };
        let products = sqlx::query_as::<_, ProductWithUsers>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    pub async fn list_pending_deletion(&self) -> Result<Vec<ProductWithUsers>, AppError> {
        let query = format!(
            "{SELECT_WITH_USERS} WHERE p.pending_deletion ORDER BY p.deletion_requested_at ASC"
        );
        let products = sqlx::query_as::<_, ProductWithUsers>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    /// Carrega o produto travando a linha (`FOR UPDATE`): compras
    /// concorrentes sobre o mesmo produto serializam aqui.
    pub async fn find_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let maybe_product = sqlx::query_as::<_, Product>(
            r#"
            SELECT
                id, name, description, price, stock, is_active,
                created_at, updated_at, created_by_user_id,
                pending_deletion, requested_deletion_by_user_id, deletion_requested_at
            FROM products
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(maybe_product)
    }

    // ---
    // Escritas
    // ---

    pub async fn create<'e, E>(
        &self,
        executor: E,
        name: &str,
        description: Option<&str>,
        price: Decimal,
        stock: i32,
        created_by_user_id: Uuid,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (name, description, price, stock, is_active, created_by_user_id)
            VALUES ($1, $2, $3, $4, TRUE, $5)
            RETURNING
                id, name, description, price, stock, is_active,
                created_at, updated_at, created_by_user_id,
                pending_deletion, requested_deletion_by_user_id, deletion_requested_at
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(price)
        .bind(stock)
        .bind(created_by_user_id)
        .fetch_one(executor)
        .await?;
        Ok(product)
    }

    // Patch parcial: campos NULL mantêm o valor atual. A descrição tem um
    // flag próprio ($3) porque NULL nela é um valor legítimo ("limpar").
    pub async fn update_partial<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        name: Option<&str>,
        description_present: bool,
        description: Option<&str>,
        price: Option<Decimal>,
        stock: Option<i32>,
        is_active: Option<bool>,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE products SET
                name = COALESCE($2, name),
                description = CASE WHEN $3 THEN $4 ELSE description END,
                price = COALESCE($5, price),
                stock = COALESCE($6, stock),
                is_active = COALESCE($7, is_active),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(description_present)
        .bind(description)
        .bind(price)
        .bind(stock)
        .bind(is_active)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn mark_pending_deletion<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        requested_by: Uuid,
        requested_at: DateTime<Utc>,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE products SET
                pending_deletion = TRUE,
                requested_deletion_by_user_id = $2,
                deletion_requested_at = $3,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(requested_by)
        .bind(requested_at)
        .execute(executor)
        .await?;
        Ok(())
    }

    // Rejeição: o produto volta ao estado ativo, sem solicitante.
    pub async fn clear_pending_deletion<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE products SET
                pending_deletion = FALSE,
                requested_deletion_by_user_id = NULL,
                deletion_requested_at = NULL,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(())
    }

    // A checagem de saldo acontece antes, sob o lock de find_for_update.
    pub async fn decrement_stock<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        quantity: i32,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE products SET
                stock = stock - $2,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(quantity)
        .execute(executor)
        .await?;
        Ok(())
    }
}
