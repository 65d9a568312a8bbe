use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use crate::{
    authz::CallerContext,
    dto::menu::{CreateDrinkRequest, UpdateDrinkRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Drink,
    response::ApiResponse,
    services::drink_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/restaurants/{restaurant}/boissons",
            get(list_drinks).post(create_drink),
        )
        .route(
            "/restaurants/{restaurant}/boissons/{boisson}",
            get(get_drink).put(update_drink).delete(delete_drink),
        )
}

/// Public menu read; a bearer token narrows it to the caller's restaurants.
#[utoipa::path(
    get,
    path = "/api/v1/restaurants/{restaurant}/boissons",
    params(("restaurant" = Uuid, Path, description = "Restaurant id")),
    responses(
        (status = 200, description = "Drinks on the menu", body = ApiResponse<Vec<Drink>>),
        (status = 404, description = "Restaurant not found")
    ),
    tag = "Drinks"
)]
pub async fn list_drinks(
    State(state): State<AppState>,
    ctx: CallerContext,
    Path(restaurant_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Vec<Drink>>>> {
    let resp = drink_service::list_drinks(&state, &ctx, restaurant_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/v1/restaurants/{restaurant}/boissons",
    params(("restaurant" = Uuid, Path, description = "Restaurant id")),
    request_body = CreateDrinkRequest,
    responses(
        (status = 201, description = "Drink created", body = ApiResponse<Drink>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Restaurant not visible"),
        (status = 422, description = "Invalid fields")
    ),
    security(("bearer_auth" = [])),
    tag = "Drinks"
)]
pub async fn create_drink(
    State(state): State<AppState>,
    user: AuthUser,
    Path(restaurant_id): Path<Uuid>,
    Json(payload): Json<CreateDrinkRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Drink>>)> {
    let resp = drink_service::create_drink(&state, &user.caller, restaurant_id, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/v1/restaurants/{restaurant}/boissons/{boisson}",
    params(
        ("restaurant" = Uuid, Path, description = "Restaurant id"),
        ("boisson" = Uuid, Path, description = "Drink id")
    ),
    responses(
        (status = 200, description = "Drink", body = ApiResponse<Drink>),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Drinks"
)]
pub async fn get_drink(
    State(state): State<AppState>,
    user: AuthUser,
    Path((restaurant_id, id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<Drink>>> {
    let resp = drink_service::get_drink(&state, &user.caller, restaurant_id, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/v1/restaurants/{restaurant}/boissons/{boisson}",
    params(
        ("restaurant" = Uuid, Path, description = "Restaurant id"),
        ("boisson" = Uuid, Path, description = "Drink id")
    ),
    request_body = UpdateDrinkRequest,
    responses(
        (status = 200, description = "Drink updated", body = ApiResponse<Drink>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Drinks"
)]
pub async fn update_drink(
    State(state): State<AppState>,
    user: AuthUser,
    Path((restaurant_id, id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateDrinkRequest>,
) -> AppResult<Json<ApiResponse<Drink>>> {
    let resp = drink_service::update_drink(&state, &user.caller, restaurant_id, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/v1/restaurants/{restaurant}/boissons/{boisson}",
    params(
        ("restaurant" = Uuid, Path, description = "Restaurant id"),
        ("boisson" = Uuid, Path, description = "Drink id")
    ),
    responses(
        (status = 200, description = "Drink deleted"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Drinks"
)]
pub async fn delete_drink(
    State(state): State<AppState>,
    user: AuthUser,
    Path((restaurant_id, id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<()>>> {
    let resp = drink_service::delete_drink(&state, &user.caller, restaurant_id, id).await?;
    Ok(Json(resp))
}
