// src/models/purchase.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::catalog::round_price;

// Exibido quando a compra referencia um produto já removido do catálogo.
pub const PRODUCT_NAME_FALLBACK: &str = "Produto não encontrado";

// Uma compra recém-inserida (tabela user_products, sem joins)
#[derive(Debug, Clone, FromRow)]
pub struct Purchase {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub purchase_price: Decimal,
    pub purchased_at: DateTime<Utc>,
}

// Compra com o nome do produto resolvido (listagem).
// O join é LEFT: o produto pode ter sido removido depois da compra.
#[derive(Debug, Clone, FromRow)]
pub struct PurchaseWithProduct {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub purchase_price: Decimal,
    pub purchased_at: DateTime<Utc>,
    pub product_name: Option<String>,
}

impl PurchaseWithProduct {
    pub fn into_view(self) -> PurchaseView {
        PurchaseView {
            id: self.id,
            product_name: self
                .product_name
                .unwrap_or_else(|| PRODUCT_NAME_FALLBACK.to_string()),
            quantity: self.quantity,
            purchase_price: round_price(self.purchase_price),
            purchased_at: self.purchased_at,
        }
    }
}

// O que a API devolve para uma compra
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseView {
    pub id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub purchase_price: Decimal,
    pub purchased_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn produto_removido_vira_placeholder() {
        let view = PurchaseWithProduct {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            quantity: 2,
            purchase_price: "10.00".parse().unwrap(),
            purchased_at: Utc::now(),
            product_name: None,
        }
        .into_view();

        assert_eq!(view.product_name, PRODUCT_NAME_FALLBACK);
    }
}
