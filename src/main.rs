//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;

// Declaração dos nossos módulos
mod common;
mod config;
mod db;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::middleware::auth::auth_middleware;

#[tokio::main]
async fn main() {
    // Inicializa o logger.
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Garante as três roles fixas (Usuario=1, Funcionario=2, Admin=3).
    app_state
        .role_service
        .ensure_default_roles()
        .await
        .expect("Falha ao semear as roles padrão.");
    tracing::info!("✅ Roles padrão verificadas (Usuario, Funcionario, Admin).");

    // Define as rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    // Define as rotas de usuário (protegidas pelo middleware)
    let user_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ));

    let product_routes = Router::new()
        .route(
            "/",
            post(handlers::products::create).get(handlers::products::get_all),
        )
        .route("/pending-deletion", get(handlers::products::get_pending_deletion))
        .route("/my-products", get(handlers::products::get_my_products))
        .route("/purchase", post(handlers::products::purchase))
        .route(
            "/{id}",
            get(handlers::products::get_by_id)
                .put(handlers::products::update)
                .delete(handlers::products::delete),
        )
        .route(
            "/{id}/approve-deletion",
            post(handlers::products::approve_deletion),
        )
        .route(
            "/{id}/reject-deletion",
            post(handlers::products::reject_deletion),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ));

    let role_routes = Router::new()
        .route(
            "/",
            post(handlers::roles::create).get(handlers::roles::get_all),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest("/api/products", product_routes)
        .nest("/api/roles", role_routes)
        .with_state(app_state);

    // Inicia o servidor
    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.expect("Erro no servidor Axum");
}
