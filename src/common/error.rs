// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Mensagens de negação de permissão, por operação.
// A resposta nunca diferencia "claim ausente" de "nível insuficiente".
pub mod deny {
    pub const ONLY_EMPLOYEES_CAN_CREATE: &str =
        "Apenas funcionários ou admins podem criar produtos";
    pub const ONLY_EMPLOYEES_CAN_EDIT: &str =
        "Apenas funcionários ou admins podem editar produtos";
    pub const ONLY_EMPLOYEES_CAN_DELETE: &str =
        "Você não tem permissão para deletar produtos";
    pub const ONLY_ADMINS_CAN_VIEW_PENDING: &str =
        "Apenas admins podem visualizar solicitações de deleção";
    pub const ONLY_ADMINS_CAN_APPROVE: &str = "Apenas admins podem aprovar deleções";
    pub const ONLY_ADMINS_CAN_REJECT: &str = "Apenas admins podem rejeitar deleções";
    pub const INSUFFICIENT_PERMISSIONS: &str =
        "Permissões insuficientes para realizar esta ação";
}

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
// Condições de negócio esperadas viajam por aqui; pânico só em misconfiguração.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Usuário já existe")]
    UserAlreadyExists,

    #[error("Email já cadastrado")]
    EmailAlreadyExists,

    #[error("CPF já cadastrado")]
    CpfAlreadyExists,

    #[error("CPF inválido")]
    InvalidCpf,

    #[error("Senha fraca")]
    WeakPassword,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Role não encontrada")]
    RoleNotFound,

    #[error("Produto não encontrado")]
    ProductNotFound,

    #[error("Produto não disponível para compra")]
    ProductUnavailable,

    #[error("Estoque insuficiente. Disponível: {0}")]
    InsufficientStock(i32),

    #[error("Produto pendente de deleção não pode ser editado")]
    CannotEditPendingDeletion,

    #[error("Este produto não está pendente de deleção")]
    NotPendingDeletion,

    #[error("{0}")]
    PermissionDenied(&'static str),

    #[error("Violação de unicidade: {0}")]
    UniqueConstraintViolation(String),

    // Variante para erros de banco de dados (sqlx)
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }

            AppError::UserAlreadyExists => {
                (StatusCode::CONFLICT, "Usuário já existe.".to_string())
            }
            AppError::EmailAlreadyExists => {
                (StatusCode::CONFLICT, "Email já cadastrado.".to_string())
            }
            AppError::CpfAlreadyExists => (StatusCode::CONFLICT, "CPF já cadastrado.".to_string()),
            AppError::InvalidCpf => (StatusCode::BAD_REQUEST, "CPF inválido.".to_string()),
            AppError::WeakPassword => (
                StatusCode::BAD_REQUEST,
                "Senha fraca. Use ao menos 6 caracteres, com letras e números.".to_string(),
            ),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "Usuário ou senha inválidos.".to_string(),
            ),
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "Token de autenticação inválido ou ausente.".to_string(),
            ),
            AppError::UserNotFound => {
                (StatusCode::NOT_FOUND, "Usuário não encontrado.".to_string())
            }
            AppError::RoleNotFound => (StatusCode::NOT_FOUND, "Role não encontrada.".to_string()),
            AppError::ProductNotFound => {
                (StatusCode::NOT_FOUND, "Produto não encontrado.".to_string())
            }
            AppError::ProductUnavailable => (
                StatusCode::BAD_REQUEST,
                "Produto não disponível para compra.".to_string(),
            ),
            AppError::InsufficientStock(available) => (
                StatusCode::BAD_REQUEST,
                format!("Estoque insuficiente. Disponível: {}", available),
            ),
            AppError::CannotEditPendingDeletion => (
                StatusCode::CONFLICT,
                "Produto pendente de deleção não pode ser editado.".to_string(),
            ),
            AppError::NotPendingDeletion => (
                StatusCode::CONFLICT,
                "Este produto não está pendente de deleção.".to_string(),
            ),
            AppError::PermissionDenied(message) => (StatusCode::FORBIDDEN, message.to_string()),
            AppError::UniqueConstraintViolation(detail) => (StatusCode::CONFLICT, detail),

            // Todos os outros erros (DatabaseError, InternalServerError) viram 500.
            // O `tracing` loga a mensagem detalhada; o cliente recebe uma genérica.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocorreu um erro inesperado.".to_string(),
                )
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
