use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTableRequest {
    #[serde(rename = "numero")]
    pub number: String,
    pub qr_code_url: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTableRequest {
    #[serde(rename = "numero")]
    pub number: Option<String>,
    pub qr_code_url: Option<String>,
}

/// Body shared by categories and dish types.
#[derive(Debug, Deserialize, ToSchema)]
pub struct NamedRequest {
    #[serde(rename = "nom")]
    pub name: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateDrinkRequest {
    #[serde(rename = "nom")]
    pub name: String,
    #[serde(rename = "prix")]
    pub price: Decimal,
    pub volume: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateDrinkRequest {
    #[serde(rename = "nom")]
    pub name: Option<String>,
    #[serde(rename = "prix")]
    pub price: Option<Decimal>,
    pub volume: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateDishRequest {
    #[serde(rename = "nom")]
    pub name: String,
    #[serde(rename = "prix")]
    pub price: Decimal,
    pub description: Option<String>,
    #[serde(rename = "type_plat_id")]
    pub dish_type_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateDishRequest {
    #[serde(rename = "nom")]
    pub name: Option<String>,
    #[serde(rename = "prix")]
    pub price: Option<Decimal>,
    pub description: Option<String>,
    #[serde(rename = "type_plat_id")]
    pub dish_type_id: Option<Uuid>,
}
