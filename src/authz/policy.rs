//! Per-resource authorization rules.
//!
//! Policies run only after the target (or its container) survived the
//! visibility filter; a denial here is therefore always a `Forbidden`.

use std::fmt;

use uuid::Uuid;

use crate::{
    authz::{Caller, Role},
    error::{AppError, AppResult},
};

const ORDER_STAFF: [Role; 4] = [Role::RestaurantAdmin, Role::Waiter, Role::Cook, Role::Cashier];
const ORDER_CREATORS: [Role; 3] = [Role::Waiter, Role::Client, Role::RestaurantAdmin];
const ORDER_EDITORS: [Role; 3] = [Role::Waiter, Role::Cook, Role::RestaurantAdmin];
const PAYMENT_READERS: [Role; 2] = [Role::RestaurantAdmin, Role::Cashier];
const PAYMENT_VALIDATORS: [Role; 2] = [Role::Cashier, Role::RestaurantAdmin];

/// The restaurant a target belongs to, together with that restaurant's owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tenancy {
    pub restaurant_id: Uuid,
    pub owner_id: Uuid,
}

impl Tenancy {
    pub fn new(restaurant_id: Uuid, owner_id: Uuid) -> Self {
        Self {
            restaurant_id,
            owner_id,
        }
    }

    fn managed_by(&self, caller: &Caller) -> bool {
        caller.works_at(self.restaurant_id) || caller.id == self.owner_id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ViewAny,
    View,
    Create,
    Update,
    Delete,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::ViewAny => "viewAny",
            Action::View => "view",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
        };
        f.write_str(name)
    }
}

pub trait Policy {
    /// What `view_any` and `create` are evaluated against.
    type Parent;

    const RESOURCE: &'static str;

    fn view_any(caller: &Caller, parent: &Self::Parent) -> bool;
    fn view(caller: &Caller, target: &Tenancy) -> bool;
    fn create(caller: &Caller, parent: &Self::Parent) -> bool;
    fn update(caller: &Caller, target: &Tenancy) -> bool;
    fn delete(caller: &Caller, target: &Tenancy) -> bool;

    fn authorize_collection(caller: &Caller, action: Action, parent: &Self::Parent) -> AppResult<()> {
        let allowed = match action {
            Action::ViewAny => Self::view_any(caller, parent),
            Action::Create => Self::create(caller, parent),
            _ => false,
        };
        verdict::<Self>(caller, action, allowed)
    }

    fn authorize(caller: &Caller, action: Action, target: &Tenancy) -> AppResult<()> {
        let allowed = match action {
            Action::View => Self::view(caller, target),
            Action::Update => Self::update(caller, target),
            Action::Delete => Self::delete(caller, target),
            _ => false,
        };
        verdict::<Self>(caller, action, allowed)
    }
}

fn verdict<P: Policy + ?Sized>(caller: &Caller, action: Action, allowed: bool) -> AppResult<()> {
    if allowed {
        Ok(())
    } else {
        tracing::debug!(
            user_id = %caller.id,
            resource = P::RESOURCE,
            action = %action,
            "policy denied"
        );
        Err(AppError::forbidden())
    }
}

pub struct RestaurantPolicy;

impl Policy for RestaurantPolicy {
    type Parent = ();
    const RESOURCE: &'static str = "restaurant";

    fn view_any(_: &Caller, _: &()) -> bool {
        true
    }

    fn view(_: &Caller, _: &Tenancy) -> bool {
        true
    }

    fn create(_: &Caller, _: &()) -> bool {
        true
    }

    fn update(caller: &Caller, target: &Tenancy) -> bool {
        caller.has_role(Role::RestaurantAdmin) && caller.id == target.owner_id
    }

    fn delete(caller: &Caller, target: &Tenancy) -> bool {
        Self::update(caller, target)
    }
}

/// Tables, categories, dish types and drinks.
pub struct MenuPolicy;

impl Policy for MenuPolicy {
    type Parent = Tenancy;
    const RESOURCE: &'static str = "menu";

    fn view_any(_: &Caller, _: &Tenancy) -> bool {
        true
    }

    fn view(_: &Caller, _: &Tenancy) -> bool {
        true
    }

    fn create(caller: &Caller, _: &Tenancy) -> bool {
        caller.has_role(Role::RestaurantAdmin)
    }

    fn update(caller: &Caller, target: &Tenancy) -> bool {
        caller.has_role(Role::RestaurantAdmin) && target.managed_by(caller)
    }

    fn delete(caller: &Caller, target: &Tenancy) -> bool {
        Self::update(caller, target)
    }
}

/// Dishes, checked against the restaurant of their category.
pub struct DishPolicy;

impl Policy for DishPolicy {
    type Parent = Tenancy;
    const RESOURCE: &'static str = "dish";

    fn view_any(_: &Caller, _: &Tenancy) -> bool {
        true
    }

    fn view(_: &Caller, _: &Tenancy) -> bool {
        true
    }

    fn create(caller: &Caller, parent: &Tenancy) -> bool {
        caller.has_role(Role::RestaurantAdmin) && parent.managed_by(caller)
    }

    fn update(caller: &Caller, target: &Tenancy) -> bool {
        Self::create(caller, target)
    }

    fn delete(caller: &Caller, target: &Tenancy) -> bool {
        Self::create(caller, target)
    }
}

pub struct OrderPolicy;

impl Policy for OrderPolicy {
    type Parent = Tenancy;
    const RESOURCE: &'static str = "order";

    fn view_any(caller: &Caller, parent: &Tenancy) -> bool {
        Self::view(caller, parent)
    }

    fn view(caller: &Caller, target: &Tenancy) -> bool {
        if caller.has_role(Role::Client) {
            return true;
        }
        caller.has_any_role(&ORDER_STAFF) && caller.works_at(target.restaurant_id)
    }

    fn create(caller: &Caller, _: &Tenancy) -> bool {
        caller.has_any_role(&ORDER_CREATORS)
    }

    fn update(caller: &Caller, target: &Tenancy) -> bool {
        caller.has_any_role(&ORDER_EDITORS) && caller.works_at(target.restaurant_id)
    }

    fn delete(caller: &Caller, target: &Tenancy) -> bool {
        caller.has_role(Role::RestaurantAdmin) && caller.works_at(target.restaurant_id)
    }
}

/// Payments, checked against the restaurant reached through order and table.
pub struct PaymentPolicy;

impl Policy for PaymentPolicy {
    type Parent = Tenancy;
    const RESOURCE: &'static str = "payment";

    fn view_any(caller: &Caller, parent: &Tenancy) -> bool {
        Self::view(caller, parent)
    }

    fn view(caller: &Caller, target: &Tenancy) -> bool {
        caller.has_any_role(&PAYMENT_READERS) && caller.works_at(target.restaurant_id)
    }

    fn create(caller: &Caller, _: &Tenancy) -> bool {
        caller.has_any_role(&ORDER_CREATORS)
    }

    fn update(caller: &Caller, target: &Tenancy) -> bool {
        caller.has_any_role(&PAYMENT_VALIDATORS) && caller.works_at(target.restaurant_id)
    }

    fn delete(caller: &Caller, target: &Tenancy) -> bool {
        caller.has_role(Role::RestaurantAdmin) && caller.works_at(target.restaurant_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authz::RoleSet;

    fn caller(roles: &[Role], home: Option<Uuid>) -> Caller {
        Caller {
            id: Uuid::new_v4(),
            name: "Test".into(),
            email: "test@example.com".into(),
            roles: roles.iter().copied().collect::<RoleSet>(),
            restaurant_id: home,
            owned_restaurant_ids: vec![],
        }
    }

    fn tenancy() -> Tenancy {
        Tenancy::new(Uuid::new_v4(), Uuid::new_v4())
    }

    #[test]
    fn restaurant_mutation_requires_admin_owner() {
        let target = tenancy();
        let mut owner = caller(&[Role::RestaurantAdmin], None);
        owner.id = target.owner_id;
        assert!(RestaurantPolicy::update(&owner, &target));
        assert!(RestaurantPolicy::delete(&owner, &target));

        let mut owner_without_role = caller(&[Role::Client], None);
        owner_without_role.id = target.owner_id;
        assert!(!RestaurantPolicy::update(&owner_without_role, &target));

        let admin_employee = caller(&[Role::RestaurantAdmin], Some(target.restaurant_id));
        assert!(!RestaurantPolicy::delete(&admin_employee, &target));

        let anyone = caller(&[], None);
        assert!(RestaurantPolicy::view_any(&anyone, &()));
        assert!(RestaurantPolicy::create(&anyone, &()));
    }

    #[test]
    fn menu_mutation_accepts_home_admin_or_owner_admin() {
        let target = tenancy();
        let home_admin = caller(&[Role::RestaurantAdmin], Some(target.restaurant_id));
        assert!(MenuPolicy::update(&home_admin, &target));

        let mut owner_admin = caller(&[Role::RestaurantAdmin], None);
        owner_admin.id = target.owner_id;
        assert!(MenuPolicy::delete(&owner_admin, &target));

        let foreign_admin = caller(&[Role::RestaurantAdmin], Some(Uuid::new_v4()));
        assert!(!MenuPolicy::update(&foreign_admin, &target));

        let home_waiter = caller(&[Role::Waiter], Some(target.restaurant_id));
        assert!(!MenuPolicy::update(&home_waiter, &target));
        assert!(!MenuPolicy::create(&home_waiter, &target));
        assert!(MenuPolicy::create(&foreign_admin, &target));
        assert!(MenuPolicy::view(&home_waiter, &target));
    }

    #[test]
    fn dish_creation_is_checked_against_category_restaurant() {
        let parent = tenancy();
        let home_admin = caller(&[Role::RestaurantAdmin], Some(parent.restaurant_id));
        assert!(DishPolicy::create(&home_admin, &parent));
        let foreign_admin = caller(&[Role::RestaurantAdmin], Some(Uuid::new_v4()));
        assert!(!DishPolicy::create(&foreign_admin, &parent));
        assert!(!DishPolicy::update(&foreign_admin, &parent));
    }

    #[test]
    fn order_view_requires_staff_at_home_restaurant_unless_client() {
        let target = tenancy();
        for role in ORDER_STAFF {
            let staff = caller(&[role], Some(target.restaurant_id));
            assert!(OrderPolicy::view(&staff, &target), "{role}");
            let elsewhere = caller(&[role], Some(Uuid::new_v4()));
            assert!(!OrderPolicy::view(&elsewhere, &target), "{role}");
        }

        let client = caller(&[Role::Client], None);
        assert!(OrderPolicy::view(&client, &target));
        assert!(OrderPolicy::view_any(&client, &target));

        let mut owner_only = caller(&[Role::RestaurantAdmin], None);
        owner_only.id = target.owner_id;
        assert!(!OrderPolicy::view(&owner_only, &target));
    }

    #[test]
    fn order_mutation_rules() {
        let target = tenancy();
        let cook = caller(&[Role::Cook], Some(target.restaurant_id));
        assert!(OrderPolicy::update(&cook, &target));
        assert!(!OrderPolicy::delete(&cook, &target));
        assert!(!OrderPolicy::create(&cook, &target));

        let cashier = caller(&[Role::Cashier], Some(target.restaurant_id));
        assert!(!OrderPolicy::update(&cashier, &target));

        let admin = caller(&[Role::RestaurantAdmin], Some(target.restaurant_id));
        assert!(OrderPolicy::delete(&admin, &target));
        let foreign_admin = caller(&[Role::RestaurantAdmin], Some(Uuid::new_v4()));
        assert!(!OrderPolicy::delete(&foreign_admin, &target));

        assert!(OrderPolicy::create(&caller(&[Role::Client], None), &target));
    }

    #[test]
    fn payment_rules() {
        let target = tenancy();
        let cashier = caller(&[Role::Cashier], Some(target.restaurant_id));
        assert!(PaymentPolicy::view(&cashier, &target));
        assert!(PaymentPolicy::update(&cashier, &target));
        assert!(!PaymentPolicy::delete(&cashier, &target));
        assert!(!PaymentPolicy::create(&cashier, &target));

        let waiter = caller(&[Role::Waiter], Some(target.restaurant_id));
        assert!(!PaymentPolicy::view_any(&waiter, &target));
        assert!(PaymentPolicy::create(&waiter, &target));

        let foreign_admin = caller(&[Role::RestaurantAdmin], Some(Uuid::new_v4()));
        assert!(!PaymentPolicy::view(&foreign_admin, &target));
        assert!(!PaymentPolicy::update(&foreign_admin, &target));
    }

    #[test]
    fn authorize_maps_denial_to_forbidden() {
        let target = tenancy();
        let waiter = caller(&[Role::Waiter], Some(target.restaurant_id));
        assert!(matches!(
            OrderPolicy::authorize(&waiter, Action::Delete, &target),
            Err(AppError::Forbidden(_))
        ));
        assert!(OrderPolicy::authorize(&waiter, Action::Update, &target).is_ok());
        assert!(MenuPolicy::authorize_collection(&waiter, Action::ViewAny, &target).is_ok());
        assert!(matches!(
            MenuPolicy::authorize_collection(&waiter, Action::Create, &target),
            Err(AppError::Forbidden(_))
        ));
    }
}
