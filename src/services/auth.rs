// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::{RoleRepository, UserRepository},
    models::auth::{normalize_cpf, Claims, Principal, RegisterUserPayload, User},
    models::rbac::Role,
};

const TOKEN_VALIDITY_HOURS: i64 = 8;
const DEFAULT_ROLE: &str = "Usuario";

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    role_repo: RoleRepository,
    jwt_secret: String,
    pool: PgPool,
}

impl AuthService {
    pub fn new(
        user_repo: UserRepository,
        role_repo: RoleRepository,
        jwt_secret: String,
        pool: PgPool,
    ) -> Self {
        Self {
            user_repo,
            role_repo,
            jwt_secret,
            pool,
        }
    }

    pub async fn register_user(&self, payload: &RegisterUserPayload) -> Result<User, AppError> {
        // O validator já barrou formatos inválidos; aqui só normalizamos.
        let cpf = normalize_cpf(&payload.cpf).ok_or(AppError::InvalidCpf)?;

        // Unicidade com mensagens específicas. A corrida entre o check e o
        // INSERT é coberta pelas constraints do banco (ver create_user).
        if self
            .user_repo
            .find_by_username(&payload.username)
            .await?
            .is_some()
        {
            return Err(AppError::UserAlreadyExists);
        }
        if let Some(email) = &payload.email {
            if self.user_repo.find_by_email(email).await?.is_some() {
                return Err(AppError::EmailAlreadyExists);
            }
        }
        if self.user_repo.find_by_cpf(&cpf).await?.is_some() {
            return Err(AppError::CpfAlreadyExists);
        }

        // Role informada precisa existir; ausente assume a padrão.
        let role_name = payload.role.as_deref().unwrap_or(DEFAULT_ROLE);
        let role = self
            .role_repo
            .find_by_name(role_name)
            .await?
            .ok_or(AppError::RoleNotFound)?;

        // Hashing em um thread separado, fora do event loop.
        let password_clone = payload.password.clone();
        let hashed_password =
            tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        let new_user = self
            .user_repo
            .create_user(
                &self.pool,
                &payload.username,
                payload.email.as_deref(),
                &cpf,
                &hashed_password,
                role.id,
            )
            .await?;

        Ok(new_user)
    }

    // O identificador pode ser email ou username. A resposta não
    // diferencia usuário inexistente de senha errada.
    pub async fn login_user(&self, identifier: &str, password: &str) -> Result<String, AppError> {
        let user = match self.user_repo.find_by_email(identifier).await? {
            Some(user) => Some(user),
            None => self.user_repo.find_by_username(identifier).await?,
        }
        .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid =
            tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        let role = self
            .role_repo
            .find_by_id(user.role_id)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        self.create_token(&user, &role)
    }

    /// Valida o token e devolve o principal com os claims de identidade e
    /// nível de role. Não consulta o banco.
    pub fn validate_token(&self, token: &str) -> Result<Principal, AppError> {
        let claims = decode_token(token, &self.jwt_secret)?;
        Ok(Principal::from(claims))
    }

    fn create_token(&self, user: &User, role: &Role) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::hours(TOKEN_VALIDITY_HOURS);

        let claims = Claims {
            sub: user.id,
            name: user.display_name(),
            role: role.name.clone(),
            role_level: role.level.to_string(),
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        encode_token(&claims, &self.jwt_secret)
    }
}

// Emissão e validação destacadas do service para permitir testes sem banco.

pub(crate) fn encode_token(claims: &Claims, secret: &str) -> Result<String, AppError> {
    Ok(encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?)
}

pub(crate) fn decode_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    let validation = Validation::default();
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &validation,
    )
    .map_err(|_| AppError::InvalidToken)?;
    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    const SECRET: &str = "segredo-de-teste-com-tamanho-bom";

    fn claims_expiring_in(seconds: i64) -> Claims {
        let now = Utc::now();
        Claims {
            sub: Uuid::new_v4(),
            name: "ana@exemplo.com".to_string(),
            role: "Funcionario".to_string(),
            role_level: "2".to_string(),
            exp: (now + chrono::Duration::seconds(seconds)).timestamp() as usize,
            iat: now.timestamp() as usize,
        }
    }

    #[test]
    fn token_preserva_claims_no_round_trip() {
        let claims = claims_expiring_in(3600);
        let token = encode_token(&claims, SECRET).unwrap();
        let decoded = decode_token(&token, SECRET).unwrap();

        assert_eq!(decoded.sub, claims.sub);
        assert_eq!(decoded.role, "Funcionario");
        assert_eq!(decoded.role_level, "2");
    }

    #[test]
    fn token_expirado_e_rejeitado() {
        // bem além do leeway padrão de validação
        let claims = claims_expiring_in(-7200);
        let token = encode_token(&claims, SECRET).unwrap();
        assert!(matches!(
            decode_token(&token, SECRET),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn token_com_segredo_errado_e_rejeitado() {
        let claims = claims_expiring_in(3600);
        let token = encode_token(&claims, SECRET).unwrap();
        assert!(matches!(
            decode_token(&token, "outro-segredo-qualquer-comprido"),
            Err(AppError::InvalidToken)
        ));
    }
}
