use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Role granted to a user account. Stored by its wire name.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum Role {
    #[sea_orm(string_value = "CLIENT")]
    #[serde(rename = "CLIENT")]
    Client,
    #[sea_orm(string_value = "SERVEUR")]
    #[serde(rename = "SERVEUR")]
    Waiter,
    #[sea_orm(string_value = "CUISINIER")]
    #[serde(rename = "CUISINIER")]
    Cook,
    #[sea_orm(string_value = "CAISSIER")]
    #[serde(rename = "CAISSIER")]
    Cashier,
    #[sea_orm(string_value = "ADMIN_RESTAURANT")]
    #[serde(rename = "ADMIN_RESTAURANT")]
    RestaurantAdmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "CLIENT",
            Role::Waiter => "SERVEUR",
            Role::Cook => "CUISINIER",
            Role::Cashier => "CAISSIER",
            Role::RestaurantAdmin => "ADMIN_RESTAURANT",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CLIENT" => Ok(Role::Client),
            "SERVEUR" => Ok(Role::Waiter),
            "CUISINIER" => Ok(Role::Cook),
            "CAISSIER" => Ok(Role::Cashier),
            "ADMIN_RESTAURANT" => Ok(Role::RestaurantAdmin),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

/// Set of roles held by one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RoleSet(BTreeSet<Role>);

impl RoleSet {
    pub fn has(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    pub fn has_any(&self, roles: &[Role]) -> bool {
        roles.iter().any(|role| self.0.contains(role))
    }

    pub fn to_vec(&self) -> Vec<Role> {
        self.0.iter().copied().collect()
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
