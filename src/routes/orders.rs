use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
};
use uuid::Uuid;

use crate::{
    authz::CallerContext,
    dto::orders::{CreateOrderRequest, OrderCreatedResponse, OrderDetail, UpdateOrderRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Order,
    response::ApiResponse,
    services::order_service,
    state::AppState,
};

/// Staff routes and the public order creation.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/tables/{table}/commandes",
            get(list_orders).post(create_order),
        )
        .route(
            "/tables/{table}/commandes/{commande}",
            put(update_order).delete(delete_order),
        )
}

/// Routes reachable with an `X-Order-Token`.
pub fn guest_router() -> Router<AppState> {
    Router::new().route("/tables/{table}/commandes/{commande}", get(get_order))
}

#[utoipa::path(
    get,
    path = "/api/v1/tables/{table}/commandes",
    params(("table" = Uuid, Path, description = "Table id")),
    responses(
        (status = 200, description = "Orders of the table", body = ApiResponse<Vec<Order>>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Table not visible")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Path(table_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Vec<Order>>>> {
    let resp = order_service::list_orders(&state, &user.caller, table_id).await?;
    Ok(Json(resp))
}

/// Anonymous callers receive a guest token in the response, staff do not.
#[utoipa::path(
    post,
    path = "/api/v1/tables/{table}/commandes",
    params(("table" = Uuid, Path, description = "Table id")),
    request_body(content = CreateOrderRequest, description = "Optional body"),
    responses(
        (status = 201, description = "Order created", body = OrderCreatedResponse),
        (status = 400, description = "table_id does not match the path"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Table not found")
    ),
    tag = "Orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    ctx: CallerContext,
    Path(table_id): Path<Uuid>,
    payload: Option<Json<CreateOrderRequest>>,
) -> AppResult<(StatusCode, Json<OrderCreatedResponse>)> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();
    let resp = order_service::create_order(&state, &ctx, table_id, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/v1/tables/{table}/commandes/{commande}",
    params(
        ("table" = Uuid, Path, description = "Table id"),
        ("commande" = Uuid, Path, description = "Order id"),
        ("X-Order-Token" = Option<String>, Header, description = "Guest session token")
    ),
    responses(
        (status = 200, description = "Order with items and payment", body = ApiResponse<OrderDetail>),
        (status = 403, description = "Missing or wrong guest token, or policy denial"),
        (status = 404, description = "Not found")
    ),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    ctx: CallerContext,
    Path((table_id, id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<OrderDetail>>> {
    let resp = order_service::get_order(&state, &ctx, table_id, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/v1/tables/{table}/commandes/{commande}",
    params(
        ("table" = Uuid, Path, description = "Table id"),
        ("commande" = Uuid, Path, description = "Order id")
    ),
    request_body = UpdateOrderRequest,
    responses(
        (status = 200, description = "Order updated", body = ApiResponse<Order>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn update_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path((table_id, id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateOrderRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let resp = order_service::update_order(&state, &user.caller, table_id, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/v1/tables/{table}/commandes/{commande}",
    params(
        ("table" = Uuid, Path, description = "Table id"),
        ("commande" = Uuid, Path, description = "Order id")
    ),
    responses(
        (status = 200, description = "Order deleted"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn delete_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path((table_id, id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<()>>> {
    let resp = order_service::delete_order(&state, &user.caller, table_id, id).await?;
    Ok(Json(resp))
}
