// src/models/rbac.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

// Níveis fixos da hierarquia. A autorização compara somente o número;
// o nome da role e a role-pai são apenas para exibição.
pub mod role_level {
    pub const USUARIO: i32 = 1;
    pub const FUNCIONARIO: i32 = 2;
    pub const ADMIN: i32 = 3;
}

// O que sai do banco (Tabela roles)
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: Uuid,
    pub name: String,
    pub level: i32,
    pub parent_role_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

// Role com o nome da role-pai resolvido (listagem)
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RoleWithParent {
    pub id: Uuid,
    pub name: String,
    pub level: i32,
    pub parent_role_id: Option<Uuid>,
    pub parent_role_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

// O Payload para criar uma role
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRolePayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    #[validate(range(min = 1, message = "O nível deve ser no mínimo 1."))]
    pub level: i32,

    pub parent_role_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_rejeita_nivel_zero() {
        let payload = CreateRolePayload {
            name: "Estagiario".to_string(),
            level: 0,
            parent_role_id: None,
        };
        assert!(payload.validate().is_err());
    }

    #[test]
    fn payload_aceita_nivel_arbitrario_positivo() {
        let payload = CreateRolePayload {
            name: "Gerente".to_string(),
            level: 5,
            parent_role_id: None,
        };
        assert!(payload.validate().is_ok());
    }
}
