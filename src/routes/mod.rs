use axum::{Router, middleware};

use crate::{middleware::guest::require_order_token, state::AppState};

pub mod auth;
pub mod categories;
pub mod dish_types;
pub mod dishes;
pub mod doc;
pub mod drinks;
pub mod health;
pub mod order_items;
pub mod orders;
pub mod payments;
pub mod restaurants;
pub mod tables;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router(state: &AppState) -> Router<AppState> {
    // Order-scoped routes open to table customers holding an order token.
    let guest = Router::new()
        .merge(orders::guest_router())
        .merge(order_items::guest_router())
        .merge(payments::guest_router())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_order_token,
        ));

    Router::new()
        .merge(auth::router())
        .merge(restaurants::router())
        .merge(tables::router())
        .merge(categories::router())
        .merge(dish_types::router())
        .merge(drinks::router())
        .merge(dishes::router())
        .merge(orders::router())
        .merge(order_items::router())
        .merge(payments::router())
        .merge(guest)
}
