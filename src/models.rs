use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{authz::Role, entity::order_items::ItemKind};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserSummary {
    pub id: Uuid,
    #[serde(rename = "nom")]
    pub name: String,
    pub email: String,
}

/// The authenticated user with everything that drives authorization.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserProfile {
    pub id: Uuid,
    #[serde(rename = "nom")]
    pub name: String,
    pub email: String,
    pub roles: Vec<Role>,
    pub restaurant_id: Option<Uuid>,
    pub owned_restaurant_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Restaurant {
    pub id: Uuid,
    #[serde(rename = "nom")]
    pub name: String,
    #[serde(rename = "adresse")]
    pub address: Option<String>,
    #[serde(rename = "telephone")]
    pub phone: Option<String>,
    #[serde(rename = "proprietaire_id")]
    pub owner_id: Uuid,
    #[serde(rename = "proprietaire", skip_serializing_if = "Option::is_none")]
    pub owner: Option<UserSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DiningTable {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    #[serde(rename = "numero")]
    pub number: String,
    pub qr_code_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    #[serde(rename = "nom")]
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DishType {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    #[serde(rename = "nom")]
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Drink {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    #[serde(rename = "nom")]
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "prix")]
    pub price: Decimal,
    pub volume: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Dish {
    pub id: Uuid,
    #[serde(rename = "categorie_id")]
    pub category_id: Uuid,
    #[serde(rename = "type_plat_id")]
    pub dish_type_id: Option<Uuid>,
    #[serde(rename = "nom")]
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "prix")]
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub table_id: Uuid,
    #[serde(rename = "statut")]
    pub status: String,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub id: Uuid,
    #[serde(rename = "commande_id")]
    pub order_id: Uuid,
    pub item_type: ItemKind,
    pub item_id: Uuid,
    #[serde(rename = "quantite")]
    pub quantity: i32,
    #[serde(rename = "prix_unitaire")]
    pub unit_price: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Payment {
    pub id: Uuid,
    #[serde(rename = "commande_id")]
    pub order_id: Uuid,
    #[serde(rename = "montant")]
    pub amount: Decimal,
    pub mode: String,
    #[serde(rename = "statut")]
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
