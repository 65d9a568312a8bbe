use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Order, OrderItem, Payment};

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    #[serde(rename = "statut")]
    pub status: Option<String>,
    /// Must match the table in the path when given.
    pub table_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderRequest {
    #[serde(rename = "statut")]
    pub status: String,
}

/// Order creation envelope. `token` is only set for anonymous creators and
/// is never returned again.
#[derive(Debug, Serialize, ToSchema)]
pub struct OrderCreatedResponse {
    pub success: bool,
    pub data: Order,
    pub token: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderDetail {
    #[serde(rename = "commande")]
    pub order: Order,
    pub items: Vec<OrderItem>,
    #[serde(rename = "paiement")]
    pub payment: Option<Payment>,
}
