// src/db/role_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::rbac::{role_level, Role, RoleWithParent},
};

#[derive(Clone)]
pub struct RoleRepository {
    pool: PgPool,
}

impl RoleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Role>, AppError> {
        let maybe_role = sqlx::query_as::<_, Role>(
            r#"
            SELECT id, name, level, parent_role_id, created_at
            FROM roles
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(maybe_role)
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<Role>, AppError> {
        let maybe_role = sqlx::query_as::<_, Role>(
            r#"
            SELECT id, name, level, parent_role_id, created_at
            FROM roles
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(maybe_role)
    }

    // Lista todas as roles com o nome da role-pai resolvido (exibição)
    pub async fn list_all(&self) -> Result<Vec<RoleWithParent>, AppError> {
        let roles = sqlx::query_as::<_, RoleWithParent>(
            r#"
            SELECT
                r.id, r.name, r.level, r.parent_role_id,
                p.name AS parent_role_name,
                r.created_at
            FROM roles r
            LEFT JOIN roles p ON p.id = r.parent_role_id
            ORDER BY r.level ASC, r.name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(roles)
    }

    pub async fn create_role<'e, E>(
        &self,
        executor: E,
        name: &str,
        level: i32,
        parent_role_id: Option<Uuid>,
    ) -> Result<Role, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Role>(
            r#"
            INSERT INTO roles (name, level, parent_role_id)
            VALUES ($1, $2, $3)
            RETURNING id, name, level, parent_role_id, created_at
            "#,
        )
        .bind(name)
        .bind(level)
        .bind(parent_role_id)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::UniqueConstraintViolation(
                        "Já existe uma role com esse nome.".into(),
                    );
                }
            }
            e.into()
        })
    }

    // Garante as três roles fixas da hierarquia. Idempotente: rodar de novo
    // em um banco já semeado não altera nada.
    pub async fn seed_defaults(&self) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO roles (name, level)
            VALUES ($1, $2), ($3, $4), ($5, $6)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind("Usuario")
        .bind(role_level::USUARIO)
        .bind("Funcionario")
        .bind(role_level::FUNCIONARIO)
        .bind("Admin")
        .bind(role_level::ADMIN)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
