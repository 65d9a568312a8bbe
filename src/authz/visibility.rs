//! Row-visibility filter for tenant-scoped entities.
//!
//! Every read and every lookup preceding a write on a tenant-scoped entity goes
//! through [`Visibility::scope`], so a row outside the caller's restaurants is
//! simply absent from the result and surfaces as `NotFound`.

use sea_orm::{
    ColumnTrait, EntityTrait, QueryFilter, Select,
    sea_query::{Expr, Query, SimpleExpr},
};
use uuid::Uuid;

use crate::{
    authz::Caller,
    entity::{categories, dining_tables, dish_types, dishes, drinks, orders},
    error::{AppError, AppResult},
};

/// Set of restaurants whose rows the caller may see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visibility {
    /// Anonymous caller: public browsing sees every restaurant.
    Unrestricted,
    /// Home restaurant, or the restaurants the caller owns.
    Restaurants(Vec<Uuid>),
    /// Authenticated caller attached to no restaurant.
    Nothing,
}

impl Visibility {
    pub fn for_caller(caller: Option<&Caller>) -> Self {
        let Some(caller) = caller else {
            return Visibility::Unrestricted;
        };
        // Employee scoping wins over ownership.
        if let Some(home) = caller.restaurant_id {
            return Visibility::Restaurants(vec![home]);
        }
        if caller.owned_restaurant_ids.is_empty() {
            Visibility::Nothing
        } else {
            Visibility::Restaurants(caller.owned_restaurant_ids.clone())
        }
    }

    pub fn admits(&self, restaurant_id: Uuid) -> bool {
        match self {
            Visibility::Unrestricted => true,
            Visibility::Restaurants(ids) => ids.contains(&restaurant_id),
            Visibility::Nothing => false,
        }
    }

    /// Narrow `select` to the rows of visible restaurants.
    pub fn scope<E: TenantScoped>(&self, select: Select<E>) -> Select<E> {
        match self {
            Visibility::Unrestricted => select,
            Visibility::Restaurants(ids) => select.filter(E::in_restaurants(ids)),
            Visibility::Nothing => select.filter(Expr::cust("FALSE")),
        }
    }

    /// Gate for a restaurant used as the container of a write.
    pub fn ensure_restaurant(&self, restaurant_id: Uuid) -> AppResult<()> {
        if self.admits(restaurant_id) {
            Ok(())
        } else {
            Err(AppError::NotFound)
        }
    }
}

/// How a tenant-scoped entity reaches its restaurant id.
///
/// Implemented once per entity below; those impls are the whole registry.
pub trait TenantScoped: EntityTrait {
    fn in_restaurants(ids: &[Uuid]) -> SimpleExpr;
}

impl TenantScoped for dining_tables::Entity {
    fn in_restaurants(ids: &[Uuid]) -> SimpleExpr {
        dining_tables::Column::RestaurantId.is_in(ids.iter().copied())
    }
}

impl TenantScoped for categories::Entity {
    fn in_restaurants(ids: &[Uuid]) -> SimpleExpr {
        categories::Column::RestaurantId.is_in(ids.iter().copied())
    }
}

impl TenantScoped for drinks::Entity {
    fn in_restaurants(ids: &[Uuid]) -> SimpleExpr {
        drinks::Column::RestaurantId.is_in(ids.iter().copied())
    }
}

impl TenantScoped for dish_types::Entity {
    fn in_restaurants(ids: &[Uuid]) -> SimpleExpr {
        dish_types::Column::RestaurantId.is_in(ids.iter().copied())
    }
}

// dish -> category -> restaurant
impl TenantScoped for dishes::Entity {
    fn in_restaurants(ids: &[Uuid]) -> SimpleExpr {
        dishes::Column::CategoryId.in_subquery(
            Query::select()
                .column(categories::Column::Id)
                .from(categories::Entity)
                .and_where(categories::Column::RestaurantId.is_in(ids.iter().copied()))
                .to_owned(),
        )
    }
}

// order -> table -> restaurant
impl TenantScoped for orders::Entity {
    fn in_restaurants(ids: &[Uuid]) -> SimpleExpr {
        orders::Column::TableId.in_subquery(
            Query::select()
                .column(dining_tables::Column::Id)
                .from(dining_tables::Entity)
                .and_where(dining_tables::Column::RestaurantId.is_in(ids.iter().copied()))
                .to_owned(),
        )
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{DbBackend, QueryTrait};

    use super::*;
    use crate::authz::{Role, RoleSet};

    fn caller(restaurant_id: Option<Uuid>, owned: Vec<Uuid>) -> Caller {
        Caller {
            id: Uuid::new_v4(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            roles: [Role::RestaurantAdmin].into_iter().collect::<RoleSet>(),
            restaurant_id,
            owned_restaurant_ids: owned,
        }
    }

    #[test]
    fn anonymous_callers_see_everything() {
        let vis = Visibility::for_caller(None);
        assert_eq!(vis, Visibility::Unrestricted);
        assert!(vis.admits(Uuid::new_v4()));
    }

    #[test]
    fn employees_are_scoped_to_their_home_restaurant() {
        let home = Uuid::new_v4();
        let owned = Uuid::new_v4();
        let vis = Visibility::for_caller(Some(&caller(Some(home), vec![owned])));
        assert_eq!(vis, Visibility::Restaurants(vec![home]));
        assert!(vis.admits(home));
        assert!(!vis.admits(owned), "home restaurant takes precedence over ownership");
    }

    #[test]
    fn owners_without_home_see_all_owned_restaurants() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let vis = Visibility::for_caller(Some(&caller(None, vec![a, b])));
        assert!(vis.admits(a));
        assert!(vis.admits(b));
        assert!(!vis.admits(Uuid::new_v4()));
    }

    #[test]
    fn unattached_callers_see_nothing_in_scope() {
        let vis = Visibility::for_caller(Some(&caller(None, vec![])));
        assert_eq!(vis, Visibility::Nothing);
        assert!(!vis.admits(Uuid::new_v4()));
        assert!(matches!(
            vis.ensure_restaurant(Uuid::new_v4()),
            Err(AppError::NotFound)
        ));

        let sql = vis
            .scope(dining_tables::Entity::find())
            .build(DbBackend::Postgres)
            .to_string();
        assert!(sql.contains("FALSE"), "{sql}");
    }

    #[test]
    fn dish_filter_goes_through_categories() {
        let vis = Visibility::Restaurants(vec![Uuid::new_v4()]);
        let sql = vis
            .scope(dishes::Entity::find())
            .build(DbBackend::Postgres)
            .to_string();
        assert!(sql.contains(r#""category_id" IN (SELECT "id" FROM "categories""#), "{sql}");
    }

    #[test]
    fn order_filter_goes_through_tables() {
        let vis = Visibility::Restaurants(vec![Uuid::new_v4()]);
        let sql = vis
            .scope(orders::Entity::find())
            .build(DbBackend::Postgres)
            .to_string();
        assert!(sql.contains(r#""table_id" IN (SELECT "id" FROM "dining_tables""#), "{sql}");
    }

    #[test]
    fn unrestricted_scope_leaves_the_query_untouched() {
        let sql = Visibility::Unrestricted
            .scope(drinks::Entity::find())
            .build(DbBackend::Postgres)
            .to_string();
        assert!(!sql.contains("WHERE"), "{sql}");
    }
}
