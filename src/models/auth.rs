// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: Option<String>,
    pub cpf: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    pub password_hash: String,

    pub role_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl User {
    // Nome exibido nos claims: email quando houver, senão o username.
    pub fn display_name(&self) -> String {
        self.email.clone().unwrap_or_else(|| self.username.clone())
    }
}

/// Normaliza um CPF: descarta tudo que não for dígito e exige
/// exatamente 11 dígitos restantes ("529.982.247-25" -> "52998224725").
pub fn normalize_cpf(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() == 11 {
        Some(digits)
    } else {
        None
    }
}

/// Política de senha: mínimo 6 caracteres, ao menos uma letra e um dígito.
pub fn password_is_strong(password: &str) -> bool {
    password.len() >= 6
        && password.chars().any(|c| c.is_ascii_alphabetic())
        && password.chars().any(|c| c.is_ascii_digit())
}

fn validate_cpf(cpf: &str) -> Result<(), ValidationError> {
    if normalize_cpf(cpf).is_none() {
        let mut err = ValidationError::new("cpf");
        err.message = Some("CPF inválido.".into());
        return Err(err);
    }
    Ok(())
}

fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    if !password_is_strong(password) {
        let mut err = ValidationError::new("weak_password");
        err.message =
            Some("Senha fraca. Use ao menos 6 caracteres, com letras e números.".into());
        return Err(err);
    }
    Ok(())
}

// Dados para registro de um novo usuário
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserPayload {
    #[validate(length(min = 1, message = "Username obrigatório."))]
    pub username: String,

    #[validate(custom(function = "validate_password_strength"))]
    pub password: String,

    #[validate(custom(function = "validate_cpf"))]
    pub cpf: String,

    #[validate(email(message = "Email inválido."))]
    pub email: Option<String>,

    // Nome da role; ausente assume "Usuario"
    pub role: Option<String>,
}

// Dados para login. O campo aceita email ou username.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginUserPayload {
    #[validate(length(min = 1, message = "Informe o email ou username."))]
    pub email: String,

    #[validate(length(min = 1, message = "Senha obrigatória."))]
    pub password: String,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,         // Subject (ID do usuário)
    pub name: String,      // Email ou username, para exibição
    pub role: String,      // Nome da role
    pub role_level: String, // Nível numérico, transportado como string
    pub exp: usize,        // Expiration time (quando o token expira)
    pub iat: usize,        // Issued At (quando o token foi criado)
}

/// Identidade autenticada de uma requisição, derivada dos claims do token.
/// O nível de role fica cru (string): autorização nega qualquer claim
/// ausente ou não numérico, nunca permite.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user_id: Uuid,
    pub display_name: String,
    pub role_name: String,
    pub role_level: String,
}

impl Principal {
    pub fn level(&self) -> Option<i32> {
        self.role_level.trim().parse().ok()
    }

    /// Negação por padrão: claim ausente/corrompido nunca satisfaz.
    pub fn has_level(&self, required: i32) -> bool {
        self.level().is_some_and(|level| level >= required)
    }
}

impl From<Claims> for Principal {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            display_name: claims.name,
            role_name: claims.role,
            role_level: claims.role_level,
        }
    }
}

// Ecoa os claims do usuário autenticado (GET /api/users/me)
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub user_id: Uuid,
    pub email_or_name: String,
    pub role: String,
    pub role_level: String,
}

impl From<Principal> for MeResponse {
    fn from(principal: Principal) -> Self {
        Self {
            user_id: principal.user_id,
            email_or_name: principal.display_name,
            role: principal.role_name,
            role_level: principal.role_level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal_with_level(level: &str) -> Principal {
        Principal {
            user_id: Uuid::new_v4(),
            display_name: "maria@exemplo.com".to_string(),
            role_name: "Funcionario".to_string(),
            role_level: level.to_string(),
        }
    }

    #[test]
    fn normalize_cpf_aceita_formatado_e_cru() {
        assert_eq!(
            normalize_cpf("529.982.247-25").as_deref(),
            Some("52998224725")
        );
        assert_eq!(normalize_cpf("52998224725").as_deref(), Some("52998224725"));
    }

    #[test]
    fn normalize_cpf_rejeita_tamanho_errado() {
        assert_eq!(normalize_cpf("123"), None);
        assert_eq!(normalize_cpf("529.982.247-256"), None);
        assert_eq!(normalize_cpf(""), None);
    }

    #[test]
    fn politica_de_senha_exige_letras_e_numeros() {
        assert!(password_is_strong("abc123"));
        assert!(!password_is_strong("abcdef")); // sem dígito
        assert!(!password_is_strong("123456")); // sem letra
        assert!(!password_is_strong("a1")); // curta demais
    }

    #[test]
    fn nivel_maior_ou_igual_satisfaz() {
        assert!(principal_with_level("2").has_level(2));
        assert!(principal_with_level("3").has_level(2));
        assert!(!principal_with_level("1").has_level(2));
    }

    #[test]
    fn claim_ausente_ou_corrompido_nega() {
        assert!(!principal_with_level("").has_level(1));
        assert!(!principal_with_level("admin").has_level(1));
        assert!(!principal_with_level("2.5").has_level(1));
    }

    #[test]
    fn principal_preserva_os_claims() {
        let sub = Uuid::new_v4();
        let principal = Principal::from(Claims {
            sub,
            name: "joao@exemplo.com".to_string(),
            role: "Admin".to_string(),
            role_level: "3".to_string(),
            exp: 0,
            iat: 0,
        });
        assert_eq!(principal.user_id, sub);
        assert_eq!(principal.level(), Some(3));
        assert_eq!(principal.role_name, "Admin");
    }
}
