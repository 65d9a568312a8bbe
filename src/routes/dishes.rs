use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use crate::{
    authz::CallerContext,
    dto::menu::{CreateDishRequest, UpdateDishRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Dish,
    response::ApiResponse,
    services::dish_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/categories/{categorie}/plats",
            get(list_dishes).post(create_dish),
        )
        .route(
            "/categories/{categorie}/plats/{plat}",
            get(get_dish).put(update_dish).delete(delete_dish),
        )
}

/// Public menu read; a bearer token narrows it to the caller's restaurants.
#[utoipa::path(
    get,
    path = "/api/v1/categories/{categorie}/plats",
    params(("categorie" = Uuid, Path, description = "Category id")),
    responses(
        (status = 200, description = "Dishes of the category", body = ApiResponse<Vec<Dish>>),
        (status = 404, description = "Category not found")
    ),
    tag = "Dishes"
)]
pub async fn list_dishes(
    State(state): State<AppState>,
    ctx: CallerContext,
    Path(category_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Vec<Dish>>>> {
    let resp = dish_service::list_dishes(&state, &ctx, category_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/v1/categories/{categorie}/plats",
    params(("categorie" = Uuid, Path, description = "Category id")),
    request_body = CreateDishRequest,
    responses(
        (status = 201, description = "Dish created", body = ApiResponse<Dish>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Category not visible"),
        (status = 422, description = "Invalid fields")
    ),
    security(("bearer_auth" = [])),
    tag = "Dishes"
)]
pub async fn create_dish(
    State(state): State<AppState>,
    user: AuthUser,
    Path(category_id): Path<Uuid>,
    Json(payload): Json<CreateDishRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Dish>>)> {
    let resp = dish_service::create_dish(&state, &user.caller, category_id, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/v1/categories/{categorie}/plats/{plat}",
    params(
        ("categorie" = Uuid, Path, description = "Category id"),
        ("plat" = Uuid, Path, description = "Dish id")
    ),
    responses(
        (status = 200, description = "Dish", body = ApiResponse<Dish>),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Dishes"
)]
pub async fn get_dish(
    State(state): State<AppState>,
    user: AuthUser,
    Path((category_id, id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<Dish>>> {
    let resp = dish_service::get_dish(&state, &user.caller, category_id, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/v1/categories/{categorie}/plats/{plat}",
    params(
        ("categorie" = Uuid, Path, description = "Category id"),
        ("plat" = Uuid, Path, description = "Dish id")
    ),
    request_body = UpdateDishRequest,
    responses(
        (status = 200, description = "Dish updated", body = ApiResponse<Dish>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Dishes"
)]
pub async fn update_dish(
    State(state): State<AppState>,
    user: AuthUser,
    Path((category_id, id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateDishRequest>,
) -> AppResult<Json<ApiResponse<Dish>>> {
    let resp = dish_service::update_dish(&state, &user.caller, category_id, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/v1/categories/{categorie}/plats/{plat}",
    params(
        ("categorie" = Uuid, Path, description = "Category id"),
        ("plat" = Uuid, Path, description = "Dish id")
    ),
    responses(
        (status = 200, description = "Dish deleted"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Dishes"
)]
pub async fn delete_dish(
    State(state): State<AppState>,
    user: AuthUser,
    Path((category_id, id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<()>>> {
    let resp = dish_service::delete_dish(&state, &user.caller, category_id, id).await?;
    Ok(Json(resp))
}
