use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    authz::CallerContext,
    dto::payments::{CreatePaymentRequest, UpdatePaymentRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Payment,
    response::ApiResponse,
    services::payment_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/commandes/{commande}/paiements", get(list_payments))
        .route(
            "/commandes/{commande}/paiements/{paiement}",
            get(get_payment).put(update_payment).delete(delete_payment),
        )
}

pub fn guest_router() -> Router<AppState> {
    Router::new().route("/commandes/{commande}/paiements", post(create_payment))
}

#[utoipa::path(
    get,
    path = "/api/v1/commandes/{commande}/paiements",
    params(("commande" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "The order's payment, or null", body = ApiResponse<Option<Payment>>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn list_payments(
    State(state): State<AppState>,
    user: AuthUser,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Option<Payment>>>> {
    let resp = payment_service::list_payments(&state, &user.caller, order_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/v1/commandes/{commande}/paiements",
    params(
        ("commande" = Uuid, Path, description = "Order id"),
        ("X-Order-Token" = Option<String>, Header, description = "Guest session token")
    ),
    request_body = CreatePaymentRequest,
    responses(
        (status = 201, description = "Payment recorded", body = ApiResponse<Payment>),
        (status = 400, description = "Order already paid, or commande_id mismatch"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Order not found")
    ),
    tag = "Payments"
)]
pub async fn create_payment(
    State(state): State<AppState>,
    ctx: CallerContext,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<CreatePaymentRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Payment>>)> {
    let resp = payment_service::create_payment(&state, &ctx, order_id, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/v1/commandes/{commande}/paiements/{paiement}",
    params(
        ("commande" = Uuid, Path, description = "Order id"),
        ("paiement" = Uuid, Path, description = "Payment id")
    ),
    responses(
        (status = 200, description = "Payment", body = ApiResponse<Payment>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn get_payment(
    State(state): State<AppState>,
    user: AuthUser,
    Path((order_id, id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<Payment>>> {
    let resp = payment_service::get_payment(&state, &user.caller, order_id, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/v1/commandes/{commande}/paiements/{paiement}",
    params(
        ("commande" = Uuid, Path, description = "Order id"),
        ("paiement" = Uuid, Path, description = "Payment id")
    ),
    request_body = UpdatePaymentRequest,
    responses(
        (status = 200, description = "Payment updated", body = ApiResponse<Payment>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn update_payment(
    State(state): State<AppState>,
    user: AuthUser,
    Path((order_id, id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdatePaymentRequest>,
) -> AppResult<Json<ApiResponse<Payment>>> {
    let resp = payment_service::update_payment(&state, &user.caller, order_id, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/v1/commandes/{commande}/paiements/{paiement}",
    params(
        ("commande" = Uuid, Path, description = "Order id"),
        ("paiement" = Uuid, Path, description = "Payment id")
    ),
    responses(
        (status = 200, description = "Payment deleted"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn delete_payment(
    State(state): State<AppState>,
    user: AuthUser,
    Path((order_id, id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<()>>> {
    let resp = payment_service::delete_payment(&state, &user.caller, order_id, id).await?;
    Ok(Json(resp))
}
