use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    authz::Role,
    dto::{
        auth::{AuthTokenResponse, LoginRequest, RegisterRequest},
        menu::{
            CreateDishRequest, CreateDrinkRequest, CreateTableRequest, NamedRequest,
            UpdateDishRequest, UpdateDrinkRequest, UpdateTableRequest,
        },
        order_items::{AddItemRequest, UpdateItemRequest},
        orders::{CreateOrderRequest, OrderCreatedResponse, OrderDetail, UpdateOrderRequest},
        payments::{CreatePaymentRequest, UpdatePaymentRequest},
        restaurants::{CreateRestaurantRequest, TransferOwnershipRequest, UpdateRestaurantRequest},
    },
    entity::order_items::ItemKind,
    models::{
        Category, DiningTable, Dish, DishType, Drink, Order, OrderItem, Payment, Restaurant,
        UserProfile, UserSummary,
    },
    response::ApiResponse,
    routes::{
        auth, categories, dish_types, dishes, drinks, health, order_items, orders, payments,
        restaurants, tables,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::logout,
        auth::me,
        restaurants::list_restaurants,
        restaurants::create_restaurant,
        restaurants::get_restaurant,
        restaurants::update_restaurant,
        restaurants::delete_restaurant,
        restaurants::transfer_ownership,
        tables::list_tables,
        tables::create_table,
        tables::get_table,
        tables::update_table,
        tables::delete_table,
        categories::list_categories,
        categories::create_category,
        categories::get_category,
        categories::update_category,
        categories::delete_category,
        dish_types::list_dish_types,
        dish_types::create_dish_type,
        dish_types::get_dish_type,
        dish_types::update_dish_type,
        dish_types::delete_dish_type,
        drinks::list_drinks,
        drinks::create_drink,
        drinks::get_drink,
        drinks::update_drink,
        drinks::delete_drink,
        dishes::list_dishes,
        dishes::create_dish,
        dishes::get_dish,
        dishes::update_dish,
        dishes::delete_dish,
        orders::list_orders,
        orders::create_order,
        orders::get_order,
        orders::update_order,
        orders::delete_order,
        order_items::add_item,
        order_items::list_items,
        order_items::get_item,
        order_items::update_item,
        order_items::delete_item,
        payments::list_payments,
        payments::create_payment,
        payments::get_payment,
        payments::update_payment,
        payments::delete_payment
    ),
    components(
        schemas(
            Role,
            ItemKind,
            UserSummary,
            UserProfile,
            Restaurant,
            DiningTable,
            Category,
            DishType,
            Drink,
            Dish,
            Order,
            OrderItem,
            Payment,
            RegisterRequest,
            LoginRequest,
            AuthTokenResponse,
            CreateRestaurantRequest,
            UpdateRestaurantRequest,
            TransferOwnershipRequest,
            CreateTableRequest,
            UpdateTableRequest,
            NamedRequest,
            CreateDrinkRequest,
            UpdateDrinkRequest,
            CreateDishRequest,
            UpdateDishRequest,
            CreateOrderRequest,
            UpdateOrderRequest,
            OrderCreatedResponse,
            OrderDetail,
            AddItemRequest,
            UpdateItemRequest,
            CreatePaymentRequest,
            UpdatePaymentRequest,
            health::HealthData,
            ApiResponse<Restaurant>,
            ApiResponse<Order>,
            ApiResponse<OrderDetail>,
            ApiResponse<Payment>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration, login and the current user"),
        (name = "Restaurants", description = "Restaurants and ownership transfer"),
        (name = "Tables", description = "Dining tables of a restaurant"),
        (name = "Categories", description = "Menu categories"),
        (name = "DishTypes", description = "Dish types"),
        (name = "Drinks", description = "Drinks"),
        (name = "Dishes", description = "Dishes of a category"),
        (name = "Orders", description = "Orders placed at a table"),
        (name = "OrderItems", description = "Line items of an order"),
        (name = "Payments", description = "Order payment"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
