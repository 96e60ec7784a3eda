// src/config.rs

use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};

use crate::{
    db::{ProductRepository, PurchaseRepository, RoleRepository, UserRepository},
    services::{
        auth::AuthService, product_service::ProductService, purchase_service::PurchaseService,
        role_service::RoleService,
    },
};

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub auth_service: AuthService,
    pub role_service: RoleService,
    pub product_service: ProductService,
    pub purchase_service: PurchaseService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");

        // Segredo curto demais inviabiliza o HMAC; melhor nem subir.
        if jwt_secret.len() < 16 {
            anyhow::bail!("JWT_SECRET muito curto: use ao menos 16 bytes.");
        }

        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let role_repo = RoleRepository::new(db_pool.clone());
        let product_repo = ProductRepository::new(db_pool.clone());
        let purchase_repo = PurchaseRepository::new(db_pool.clone());

        let auth_service = AuthService::new(
            user_repo.clone(),
            role_repo.clone(),
            jwt_secret,
            db_pool.clone(),
        );
        let role_service = RoleService::new(role_repo, db_pool.clone());
        let product_service =
            ProductService::new(product_repo.clone(), user_repo.clone(), db_pool.clone());
        let purchase_service =
            PurchaseService::new(product_repo, purchase_repo, user_repo, db_pool.clone());

        Ok(Self {
            db_pool,
            auth_service,
            role_service,
            product_service,
            purchase_service,
        })
    }
}
