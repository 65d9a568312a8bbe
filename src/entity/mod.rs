pub mod categories;
pub mod dining_tables;
pub mod dish_types;
pub mod dishes;
pub mod drinks;
pub mod guest_sessions;
pub mod order_items;
pub mod orders;
pub mod payments;
pub mod restaurants;
pub mod revoked_tokens;
pub mod user_roles;
pub mod users;

pub use categories::Entity as Categories;
pub use dining_tables::Entity as DiningTables;
pub use dish_types::Entity as DishTypes;
pub use dishes::Entity as Dishes;
pub use drinks::Entity as Drinks;
pub use guest_sessions::Entity as GuestSessions;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use payments::Entity as Payments;
pub use restaurants::Entity as Restaurants;
pub use revoked_tokens::Entity as RevokedTokens;
pub use user_roles::Entity as UserRoles;
pub use users::Entity as Users;
