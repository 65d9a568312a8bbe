use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
};
use uuid::Uuid;

use crate::{
    authz::CallerContext,
    dto::order_items::{AddItemRequest, UpdateItemRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::OrderItem,
    response::ApiResponse,
    services::order_item_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/commandes/{commande}/items/{item}", put(update_item))
}

pub fn guest_router() -> Router<AppState> {
    Router::new()
        .route(
            "/commandes/{commande}/items",
            get(list_items).post(add_item),
        )
        .route(
            "/commandes/{commande}/items/{item}",
            get(get_item).delete(delete_item),
        )
}

#[utoipa::path(
    post,
    path = "/api/v1/commandes/{commande}/items",
    params(
        ("commande" = Uuid, Path, description = "Order id"),
        ("X-Order-Token" = Option<String>, Header, description = "Guest session token")
    ),
    request_body = AddItemRequest,
    responses(
        (status = 201, description = "Item added, order total recomputed", body = ApiResponse<OrderItem>),
        (status = 403, description = "Item from another restaurant, or bad guest token"),
        (status = 404, description = "Order or item not found"),
        (status = 422, description = "Invalid quantity")
    ),
    tag = "OrderItems"
)]
pub async fn add_item(
    State(state): State<AppState>,
    ctx: CallerContext,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<AddItemRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<OrderItem>>)> {
    let resp = order_item_service::add_item(&state, &ctx, order_id, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/v1/commandes/{commande}/items",
    params(
        ("commande" = Uuid, Path, description = "Order id"),
        ("X-Order-Token" = Option<String>, Header, description = "Guest session token")
    ),
    responses(
        (status = 200, description = "Items of the order", body = ApiResponse<Vec<OrderItem>>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Order not found")
    ),
    tag = "OrderItems"
)]
pub async fn list_items(
    State(state): State<AppState>,
    ctx: CallerContext,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Vec<OrderItem>>>> {
    let resp = order_item_service::list_items(&state, &ctx, order_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/v1/commandes/{commande}/items/{item}",
    params(
        ("commande" = Uuid, Path, description = "Order id"),
        ("item" = Uuid, Path, description = "Item id"),
        ("X-Order-Token" = Option<String>, Header, description = "Guest session token")
    ),
    responses(
        (status = 200, description = "Item", body = ApiResponse<OrderItem>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found")
    ),
    tag = "OrderItems"
)]
pub async fn get_item(
    State(state): State<AppState>,
    ctx: CallerContext,
    Path((order_id, id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<OrderItem>>> {
    let resp = order_item_service::get_item(&state, &ctx, order_id, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/v1/commandes/{commande}/items/{item}",
    params(
        ("commande" = Uuid, Path, description = "Order id"),
        ("item" = Uuid, Path, description = "Item id")
    ),
    request_body = UpdateItemRequest,
    responses(
        (status = 200, description = "Item updated, order total recomputed", body = ApiResponse<OrderItem>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found"),
        (status = 422, description = "Invalid quantity")
    ),
    security(("bearer_auth" = [])),
    tag = "OrderItems"
)]
pub async fn update_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path((order_id, id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateItemRequest>,
) -> AppResult<Json<ApiResponse<OrderItem>>> {
    let resp = order_item_service::update_item(&state, &user.caller, order_id, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/v1/commandes/{commande}/items/{item}",
    params(
        ("commande" = Uuid, Path, description = "Order id"),
        ("item" = Uuid, Path, description = "Item id"),
        ("X-Order-Token" = Option<String>, Header, description = "Guest session token")
    ),
    responses(
        (status = 200, description = "Item removed, order total recomputed"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found")
    ),
    tag = "OrderItems"
)]
pub async fn delete_item(
    State(state): State<AppState>,
    ctx: CallerContext,
    Path((order_id, id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<()>>> {
    let resp = order_item_service::delete_item(&state, &ctx, order_id, id).await?;
    Ok(Json(resp))
}
