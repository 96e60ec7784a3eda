// src/models/catalog.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Arredonda um preço para 2 casas decimais antes de persistir/exibir.
pub fn round_price(price: Decimal) -> Decimal {
    price.round_dp(2)
}

// ---
// Estado de deleção
// ---
// O par (solicitante, momento) só existe na variante Pending; a invariante
// "pendente <=> solicitante registrado" fica garantida pelo tipo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletionState {
    Active,
    Pending {
        requested_by: Uuid,
        requested_at: DateTime<Utc>,
    },
}

impl DeletionState {
    /// Reconstrói o estado a partir das três colunas persistidas.
    /// Uma linha marcada pendente sem solicitante é tratada como ativa.
    pub fn from_columns(
        pending: bool,
        requested_by: Option<Uuid>,
        requested_at: Option<DateTime<Utc>>,
    ) -> Self {
        match (pending, requested_by, requested_at) {
            (true, Some(by), Some(at)) => Self::Pending {
                requested_by: by,
                requested_at: at,
            },
            _ => Self::Active,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }
}

// ---
// Produto (tabela products, sem joins)
// ---
#[derive(Debug, Clone, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub created_by_user_id: Uuid,
    pub pending_deletion: bool,
    pub requested_deletion_by_user_id: Option<Uuid>,
    pub deletion_requested_at: Option<DateTime<Utc>>,
}

impl Product {
    pub fn deletion_state(&self) -> DeletionState {
        DeletionState::from_columns(
            self.pending_deletion,
            self.requested_deletion_by_user_id,
            self.deletion_requested_at,
        )
    }
}

// Produto com os usernames de criador/solicitante resolvidos (leituras)
#[derive(Debug, Clone, FromRow)]
pub struct ProductWithUsers {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub created_by_user_id: Uuid,
    pub created_by_username: Option<String>,
    pub pending_deletion: bool,
    pub requested_deletion_by_user_id: Option<Uuid>,
    pub requested_deletion_by_username: Option<String>,
    pub deletion_requested_at: Option<DateTime<Utc>>,
}

impl ProductWithUsers {
    pub fn deletion_state(&self) -> DeletionState {
        DeletionState::from_columns(
            self.pending_deletion,
            self.requested_deletion_by_user_id,
            self.deletion_requested_at,
        )
    }

    pub fn into_view(self) -> ProductView {
        ProductView {
            id: self.id,
            name: self.name,
            description: self.description,
            price: round_price(self.price),
            stock: self.stock,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
            created_by_username: self.created_by_username,
            pending_deletion: self.pending_deletion,
            requested_deletion_by_username: self.requested_deletion_by_username,
            deletion_requested_at: self.deletion_requested_at,
        }
    }
}

// O que a API devolve para um produto
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub created_by_username: Option<String>,
    pub pending_deletion: bool,
    pub requested_deletion_by_username: Option<String>,
    pub deletion_requested_at: Option<DateTime<Utc>>,
}

// ---
// Validação customizada
// ---
fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

// Distingue "campo ausente" (None) de "campo presente com null"
// (Some(None)) — necessário para limpar a descrição explicitamente.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

// ---
// Payload: CreateProduct
// ---
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    pub description: Option<String>,

    #[validate(custom(function = "validate_not_negative"))]
    pub price: Decimal,

    #[validate(range(min = 0, message = "O estoque não pode ser negativo."))]
    pub stock: i32,
}

// ---
// Payload: UpdateProduct (semântica de patch)
// ---
// Campo ausente mantém o valor atual; `description: null` limpa o campo.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductPayload {
    #[validate(length(min = 1, message = "O nome não pode ser vazio."))]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,

    #[validate(custom(function = "validate_not_negative"))]
    pub price: Option<Decimal>,

    #[validate(range(min = 0, message = "O estoque não pode ser negativo."))]
    pub stock: Option<i32>,

    pub is_active: Option<bool>,
}

// ---
// Payload: Purchase
// ---
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseProductPayload {
    pub product_id: Uuid,

    #[validate(range(min = 1, message = "A quantidade deve ser maior que zero."))]
    pub quantity: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preco_arredonda_para_duas_casas() {
        let price: Decimal = "19.999".parse().unwrap();
        assert_eq!(round_price(price), "20.00".parse::<Decimal>().unwrap());

        let exact: Decimal = "10.50".parse().unwrap();
        assert_eq!(round_price(exact), exact);
    }

    #[test]
    fn estado_pendente_exige_solicitante_e_momento() {
        let by = Uuid::new_v4();
        let at = Utc::now();

        let pending = DeletionState::from_columns(true, Some(by), Some(at));
        assert_eq!(
            pending,
            DeletionState::Pending {
                requested_by: by,
                requested_at: at
            }
        );

        // linha inconsistente no banco degrada para Active
        assert_eq!(
            DeletionState::from_columns(true, None, None),
            DeletionState::Active
        );
        assert_eq!(
            DeletionState::from_columns(true, Some(by), None),
            DeletionState::Active
        );
        assert_eq!(
            DeletionState::from_columns(false, None, None),
            DeletionState::Active
        );
    }

    #[test]
    fn patch_distingue_ausente_de_null() {
        let absent: UpdateProductPayload = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(absent.description, None);

        let cleared: UpdateProductPayload =
            serde_json::from_str(r#"{"description": null}"#).unwrap();
        assert_eq!(cleared.description, Some(None));

        let set: UpdateProductPayload =
            serde_json::from_str(r#"{"description": "novo texto"}"#).unwrap();
        assert_eq!(set.description, Some(Some("novo texto".to_string())));
    }

    #[test]
    fn payload_de_criacao_rejeita_valores_negativos() {
        let negative_price: CreateProductPayload =
            serde_json::from_str(r#"{"name": "Caneta", "price": -1.0, "stock": 10}"#).unwrap();
        assert!(negative_price.validate().is_err());

        let negative_stock: CreateProductPayload =
            serde_json::from_str(r#"{"name": "Caneta", "price": 2.5, "stock": -3}"#).unwrap();
        assert!(negative_stock.validate().is_err());
    }

    #[test]
    fn payload_de_update_valida_somente_campos_presentes() {
        let ok: UpdateProductPayload = serde_json::from_str(r#"{"price": 12.345}"#).unwrap();
        assert!(ok.validate().is_ok());

        let bad: UpdateProductPayload = serde_json::from_str(r#"{"stock": -1}"#).unwrap();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn quantidade_de_compra_deve_ser_positiva() {
        let zero: PurchaseProductPayload = serde_json::from_str(&format!(
            r#"{{"productId": "{}", "quantity": 0}}"#,
            Uuid::new_v4()
        ))
        .unwrap();
        assert!(zero.validate().is_err());
    }
}
