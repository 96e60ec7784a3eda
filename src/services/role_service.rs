// src/services/role_service.rs

use sqlx::PgPool;

use crate::{
    common::error::{deny, AppError},
    db::RoleRepository,
    models::auth::Principal,
    models::rbac::{role_level, CreateRolePayload, Role, RoleWithParent},
};

#[derive(Clone)]
pub struct RoleService {
    role_repo: RoleRepository,
    pool: PgPool,
}

impl RoleService {
    pub fn new(role_repo: RoleRepository, pool: PgPool) -> Self {
        Self { role_repo, pool }
    }

    // Chamado na subida da aplicação; idempotente.
    pub async fn ensure_default_roles(&self) -> Result<(), AppError> {
        self.role_repo.seed_defaults().await
    }

    pub async fn list_roles(&self, principal: &Principal) -> Result<Vec<RoleWithParent>, AppError> {
        if !principal.has_level(role_level::FUNCIONARIO) {
            return Err(AppError::PermissionDenied(deny::INSUFFICIENT_PERMISSIONS));
        }
        self.role_repo.list_all().await
    }

    // Apenas admins criam roles; o nível é livre (>= 1), e a role-pai é
    // informativa, nunca consultada pela autorização.
    pub async fn create_role(
        &self,
        principal: &Principal,
        payload: &CreateRolePayload,
    ) -> Result<Role, AppError> {
        if !principal.has_level(role_level::ADMIN) {
            return Err(AppError::PermissionDenied(deny::INSUFFICIENT_PERMISSIONS));
        }

        self.role_repo
            .create_role(&self.pool, &payload.name, payload.level, payload.parent_role_id)
            .await
    }
}
