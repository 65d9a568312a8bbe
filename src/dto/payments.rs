use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePaymentRequest {
    #[serde(rename = "montant")]
    pub amount: Decimal,
    pub mode: String,
    #[serde(rename = "statut")]
    pub status: String,
    /// Must match the order in the path when given.
    #[serde(rename = "commande_id")]
    pub order_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdatePaymentRequest {
    #[serde(rename = "montant")]
    pub amount: Option<Decimal>,
    pub mode: Option<String>,
    #[serde(rename = "statut")]
    pub status: Option<String>,
}
