use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use crate::{
    authz::CallerContext,
    dto::menu::NamedRequest,
    error::AppResult,
    middleware::auth::AuthUser,
    models::DishType,
    response::ApiResponse,
    services::dish_type_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/restaurants/{restaurant}/type_plats",
            get(list_dish_types).post(create_dish_type),
        )
        .route(
            "/restaurants/{restaurant}/type_plats/{type_plat}",
            get(get_dish_type).put(update_dish_type).delete(delete_dish_type),
        )
}

/// Public menu read; a bearer token narrows it to the caller's restaurants.
#[utoipa::path(
    get,
    path = "/api/v1/restaurants/{restaurant}/type_plats",
    params(("restaurant" = Uuid, Path, description = "Restaurant id")),
    responses(
        (status = 200, description = "Dish types", body = ApiResponse<Vec<DishType>>),
        (status = 404, description = "Restaurant not found")
    ),
    tag = "DishTypes"
)]
pub async fn list_dish_types(
    State(state): State<AppState>,
    ctx: CallerContext,
    Path(restaurant_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Vec<DishType>>>> {
    let resp = dish_type_service::list_dish_types(&state, &ctx, restaurant_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/v1/restaurants/{restaurant}/type_plats",
    params(("restaurant" = Uuid, Path, description = "Restaurant id")),
    request_body = NamedRequest,
    responses(
        (status = 201, description = "Dish type created", body = ApiResponse<DishType>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Restaurant not visible"),
        (status = 422, description = "Invalid fields")
    ),
    security(("bearer_auth" = [])),
    tag = "DishTypes"
)]
pub async fn create_dish_type(
    State(state): State<AppState>,
    user: AuthUser,
    Path(restaurant_id): Path<Uuid>,
    Json(payload): Json<NamedRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<DishType>>)> {
    let resp = dish_type_service::create_dish_type(&state, &user.caller, restaurant_id, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/v1/restaurants/{restaurant}/type_plats/{type_plat}",
    params(
        ("restaurant" = Uuid, Path, description = "Restaurant id"),
        ("type_plat" = Uuid, Path, description = "Dish type id")
    ),
    responses(
        (status = 200, description = "Dish type", body = ApiResponse<DishType>),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "DishTypes"
)]
pub async fn get_dish_type(
    State(state): State<AppState>,
    user: AuthUser,
    Path((restaurant_id, id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<DishType>>> {
    let resp = dish_type_service::get_dish_type(&state, &user.caller, restaurant_id, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/v1/restaurants/{restaurant}/type_plats/{type_plat}",
    params(
        ("restaurant" = Uuid, Path, description = "Restaurant id"),
        ("type_plat" = Uuid, Path, description = "Dish type id")
    ),
    request_body = NamedRequest,
    responses(
        (status = 200, description = "Dish type updated", body = ApiResponse<DishType>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "DishTypes"
)]
pub async fn update_dish_type(
    State(state): State<AppState>,
    user: AuthUser,
    Path((restaurant_id, id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<NamedRequest>,
) -> AppResult<Json<ApiResponse<DishType>>> {
    let resp = dish_type_service::update_dish_type(&state, &user.caller, restaurant_id, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/v1/restaurants/{restaurant}/type_plats/{type_plat}",
    params(
        ("restaurant" = Uuid, Path, description = "Restaurant id"),
        ("type_plat" = Uuid, Path, description = "Dish type id")
    ),
    responses(
        (status = 200, description = "Dish type deleted"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "DishTypes"
)]
pub async fn delete_dish_type(
    State(state): State<AppState>,
    user: AuthUser,
    Path((restaurant_id, id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<()>>> {
    let resp = dish_type_service::delete_dish_type(&state, &user.caller, restaurant_id, id).await?;
    Ok(Json(resp))
}
