//! Tenant isolation and authorization: who is calling, which restaurants they
//! can see, and what they may do there.

pub mod caller;
pub mod guest;
pub mod policy;
pub mod role;
pub mod visibility;

pub use caller::{Caller, CallerContext};
pub use policy::{
    Action, DishPolicy, MenuPolicy, OrderPolicy, PaymentPolicy, Policy, RestaurantPolicy, Tenancy,
};
pub use role::{Role, RoleSet};
pub use visibility::{TenantScoped, Visibility};
