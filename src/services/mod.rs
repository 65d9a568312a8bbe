pub mod auth_service;
pub mod category_service;
pub mod dish_service;
pub mod dish_type_service;
pub mod drink_service;
pub mod order_item_service;
pub mod order_service;
pub mod payment_service;
pub mod restaurant_service;
pub mod role_service;
pub mod table_service;
