use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect};
use uuid::Uuid;

use crate::{
    authz::{Role, RoleSet, Visibility},
    entity::{
        restaurants::{Column as RestaurantCol, Entity as Restaurants},
        user_roles::{Column as UserRoleCol, Entity as UserRoles},
        users::Entity as Users,
    },
    error::AppResult,
};

/// An authenticated user as seen by the filter and the policies.
#[derive(Debug, Clone, PartialEq)]
pub struct Caller {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub roles: RoleSet,
    /// Home restaurant (employee assignment).
    pub restaurant_id: Option<Uuid>,
    pub owned_restaurant_ids: Vec<Uuid>,
}

impl Caller {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.has(role)
    }

    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        self.roles.has_any(roles)
    }

    /// True when `restaurant_id` is the caller's home restaurant.
    pub fn works_at(&self, restaurant_id: Uuid) -> bool {
        self.restaurant_id == Some(restaurant_id)
    }

    /// Load the caller's roles and restaurant links. `None` when the user no longer exists.
    pub async fn load<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> AppResult<Option<Self>> {
        let Some(user) = Users::find_by_id(user_id).one(conn).await? else {
            return Ok(None);
        };

        let roles = UserRoles::find()
            .filter(UserRoleCol::UserId.eq(user.id))
            .all(conn)
            .await?
            .into_iter()
            .map(|row| row.role)
            .collect();

        let owned_restaurant_ids: Vec<Uuid> = Restaurants::find()
            .select_only()
            .column(RestaurantCol::Id)
            .filter(RestaurantCol::OwnerId.eq(user.id))
            .into_tuple()
            .all(conn)
            .await?;

        Ok(Some(Self {
            id: user.id,
            name: user.name,
            email: user.email,
            roles,
            restaurant_id: user.restaurant_id,
            owned_restaurant_ids,
        }))
    }
}

/// Who is making the current request. Guests carry no user; their order
/// token is checked by the gate in front of the guest routes.
#[derive(Debug, Clone, Default)]
pub struct CallerContext {
    pub user: Option<Caller>,
}

impl CallerContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(caller: Caller) -> Self {
        Self { user: Some(caller) }
    }

    pub fn user(&self) -> Option<&Caller> {
        self.user.as_ref()
    }

    pub fn visibility(&self) -> Visibility {
        Visibility::for_caller(self.user.as_ref())
    }
}
