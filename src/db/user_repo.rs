// src/db/user_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::auth::User};

// O repositório de usuários, responsável por todas as interações com a tabela 'users'
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let maybe_user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, cpf, password_hash, role_id, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(maybe_user)
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let maybe_user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, cpf, password_hash, role_id, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(maybe_user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let maybe_user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, cpf, password_hash, role_id, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(maybe_user)
    }

    // CPF é consultado já normalizado (11 dígitos).
    pub async fn find_by_cpf(&self, cpf: &str) -> Result<Option<User>, AppError> {
        let maybe_user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, cpf, password_hash, role_id, created_at
            FROM users
            WHERE cpf = $1
            "#,
        )
        .bind(cpf)
        .fetch_optional(&self.pool)
        .await?;
        Ok(maybe_user)
    }

    // Cria um novo usuário, traduzindo violações de unicidade do Postgres
    // para os erros de negócio específicos.
    pub async fn create_user<'e, E>(
        &self,
        executor: E,
        username: &str,
        email: Option<&str>,
        cpf: &str,
        password_hash: &str,
        role_id: Uuid,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, cpf, password_hash, role_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, username, email, cpf, password_hash, role_id, created_at
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(cpf)
        .bind(password_hash)
        .bind(role_id)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    if let Some(constraint) = db_err.constraint() {
                        return match constraint {
                            "users_username_key" => AppError::UserAlreadyExists,
                            "users_email_key" => AppError::EmailAlreadyExists,
                            "users_cpf_key" => AppError::CpfAlreadyExists,
                            _ => AppError::UniqueConstraintViolation(constraint.to_string()),
                        };
                    }
                }
            }
            e.into()
        })
    }
}
