use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRestaurantRequest {
    #[serde(rename = "nom")]
    pub name: String,
    #[serde(rename = "adresse")]
    pub address: Option<String>,
    #[serde(rename = "telephone")]
    pub phone: Option<String>,
    /// Defaults to the caller.
    #[serde(rename = "proprietaire_id")]
    pub owner_id: Option<Uuid>,
}

/// Ownership only changes through the transfer endpoint.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRestaurantRequest {
    #[serde(rename = "nom")]
    pub name: Option<String>,
    #[serde(rename = "adresse")]
    pub address: Option<String>,
    #[serde(rename = "telephone")]
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TransferOwnershipRequest {
    #[serde(rename = "new_proprietaire_id")]
    pub new_owner_id: Uuid,
}
