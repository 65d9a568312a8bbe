use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::menu::{CreateTableRequest, UpdateTableRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::DiningTable,
    response::ApiResponse,
    services::table_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/restaurants/{restaurant}/tables",
            get(list_tables).post(create_table),
        )
        .route(
            "/restaurants/{restaurant}/tables/{table}",
            get(get_table).put(update_table).delete(delete_table),
        )
}

#[utoipa::path(
    get,
    path = "/api/v1/restaurants/{restaurant}/tables",
    params(("restaurant" = Uuid, Path, description = "Restaurant id")),
    responses(
        (status = 200, description = "Tables of the restaurant", body = ApiResponse<Vec<DiningTable>>),
        (status = 404, description = "Restaurant not visible")
    ),
    security(("bearer_auth" = [])),
    tag = "Tables"
)]
pub async fn list_tables(
    State(state): State<AppState>,
    user: AuthUser,
    Path(restaurant_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Vec<DiningTable>>>> {
    let resp = table_service::list_tables(&state, &user.caller, restaurant_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/v1/restaurants/{restaurant}/tables",
    params(("restaurant" = Uuid, Path, description = "Restaurant id")),
    request_body = CreateTableRequest,
    responses(
        (status = 201, description = "Table created", body = ApiResponse<DiningTable>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Restaurant not visible")
    ),
    security(("bearer_auth" = [])),
    tag = "Tables"
)]
pub async fn create_table(
    State(state): State<AppState>,
    user: AuthUser,
    Path(restaurant_id): Path<Uuid>,
    Json(payload): Json<CreateTableRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<DiningTable>>)> {
    let resp = table_service::create_table(&state, &user.caller, restaurant_id, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/v1/restaurants/{restaurant}/tables/{table}",
    params(
        ("restaurant" = Uuid, Path, description = "Restaurant id"),
        ("table" = Uuid, Path, description = "Table id")
    ),
    responses(
        (status = 200, description = "Table", body = ApiResponse<DiningTable>),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Tables"
)]
pub async fn get_table(
    State(state): State<AppState>,
    user: AuthUser,
    Path((restaurant_id, id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<DiningTable>>> {
    let resp = table_service::get_table(&state, &user.caller, restaurant_id, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/v1/restaurants/{restaurant}/tables/{table}",
    params(
        ("restaurant" = Uuid, Path, description = "Restaurant id"),
        ("table" = Uuid, Path, description = "Table id")
    ),
    request_body = UpdateTableRequest,
    responses(
        (status = 200, description = "Table updated", body = ApiResponse<DiningTable>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Tables"
)]
pub async fn update_table(
    State(state): State<AppState>,
    user: AuthUser,
    Path((restaurant_id, id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateTableRequest>,
) -> AppResult<Json<ApiResponse<DiningTable>>> {
    let resp = table_service::update_table(&state, &user.caller, restaurant_id, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/v1/restaurants/{restaurant}/tables/{table}",
    params(
        ("restaurant" = Uuid, Path, description = "Restaurant id"),
        ("table" = Uuid, Path, description = "Table id")
    ),
    responses(
        (status = 200, description = "Table deleted"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Tables"
)]
pub async fn delete_table(
    State(state): State<AppState>,
    user: AuthUser,
    Path((restaurant_id, id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<()>>> {
    let resp = table_service::delete_table(&state, &user.caller, restaurant_id, id).await?;
    Ok(Json(resp))
}
