use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::order_items::ItemKind;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddItemRequest {
    pub item_type: ItemKind,
    pub item_id: Uuid,
    #[serde(rename = "quantite")]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateItemRequest {
    #[serde(rename = "quantite")]
    pub quantity: i32,
}
