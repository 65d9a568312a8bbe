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
    models::Category,
    response::ApiResponse,
    services::category_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/restaurants/{restaurant}/categories",
            get(list_categories).post(create_category),
        )
        .route(
            "/restaurants/{restaurant}/categories/{categorie}",
            get(get_category).put(update_category).delete(delete_category),
        )
}

/// Public menu read; a bearer token narrows it to the caller's restaurants.
#[utoipa::path(
    get,
    path = "/api/v1/restaurants/{restaurant}/categories",
    params(("restaurant" = Uuid, Path, description = "Restaurant id")),
    responses(
        (status = 200, description = "Menu categories", body = ApiResponse<Vec<Category>>),
        (status = 404, description = "Restaurant not found")
    ),
    tag = "Categories"
)]
pub async fn list_categories(
    State(state): State<AppState>,
    ctx: CallerContext,
    Path(restaurant_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Vec<Category>>>> {
    let resp = category_service::list_categories(&state, &ctx, restaurant_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/v1/restaurants/{restaurant}/categories",
    params(("restaurant" = Uuid, Path, description = "Restaurant id")),
    request_body = NamedRequest,
    responses(
        (status = 201, description = "Category created", body = ApiResponse<Category>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Restaurant not visible"),
        (status = 422, description = "Invalid fields")
    ),
    security(("bearer_auth" = [])),
    tag = "Categories"
)]
pub async fn create_category(
    State(state): State<AppState>,
    user: AuthUser,
    Path(restaurant_id): Path<Uuid>,
    Json(payload): Json<NamedRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Category>>)> {
    let resp = category_service::create_category(&state, &user.caller, restaurant_id, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/v1/restaurants/{restaurant}/categories/{categorie}",
    params(
        ("restaurant" = Uuid, Path, description = "Restaurant id"),
        ("categorie" = Uuid, Path, description = "Category id")
    ),
    responses(
        (status = 200, description = "Category", body = ApiResponse<Category>),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Categories"
)]
pub async fn get_category(
    State(state): State<AppState>,
    user: AuthUser,
    Path((restaurant_id, id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<Category>>> {
    let resp = category_service::get_category(&state, &user.caller, restaurant_id, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/v1/restaurants/{restaurant}/categories/{categorie}",
    params(
        ("restaurant" = Uuid, Path, description = "Restaurant id"),
        ("categorie" = Uuid, Path, description = "Category id")
    ),
    request_body = NamedRequest,
    responses(
        (status = 200, description = "Category updated", body = ApiResponse<Category>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Categories"
)]
pub async fn update_category(
    State(state): State<AppState>,
    user: AuthUser,
    Path((restaurant_id, id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<NamedRequest>,
) -> AppResult<Json<ApiResponse<Category>>> {
    let resp = category_service::update_category(&state, &user.caller, restaurant_id, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/v1/restaurants/{restaurant}/categories/{categorie}",
    params(
        ("restaurant" = Uuid, Path, description = "Restaurant id"),
        ("categorie" = Uuid, Path, description = "Category id")
    ),
    responses(
        (status = 200, description = "Category deleted"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Categories"
)]
pub async fn delete_category(
    State(state): State<AppState>,
    user: AuthUser,
    Path((restaurant_id, id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<()>>> {
    let resp = category_service::delete_category(&state, &user.caller, restaurant_id, id).await?;
    Ok(Json(resp))
}
