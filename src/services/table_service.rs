use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::{
    authz::{Action, Caller, MenuPolicy, Policy, Visibility},
    dto::{
        menu::{CreateTableRequest, UpdateTableRequest},
        optional_text, required_text,
    },
    entity::dining_tables::{
        ActiveModel as TableActive, Column as TableCol, Entity as DiningTables, Model as TableModel,
    },
    error::{AppError, AppResult},
    models::DiningTable,
    response::ApiResponse,
    services::restaurant_service::{tenancy, tenancy_of, visible_restaurant},
    state::AppState,
};

pub async fn list_tables(
    state: &AppState,
    caller: &Caller,
    restaurant_id: Uuid,
) -> AppResult<ApiResponse<Vec<DiningTable>>> {
    let visibility = Visibility::for_caller(Some(caller));
    let restaurant = visible_restaurant(&state.orm, &visibility, restaurant_id).await?;
    MenuPolicy::authorize_collection(caller, Action::ViewAny, &tenancy_of(&restaurant))?;

    let tables = visibility
        .scope(DiningTables::find())
        .filter(TableCol::RestaurantId.eq(restaurant.id))
        .order_by_asc(TableCol::Number)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(table_from_entity)
        .collect();

    Ok(ApiResponse::success(tables))
}

pub async fn create_table(
    state: &AppState,
    caller: &Caller,
    restaurant_id: Uuid,
    payload: CreateTableRequest,
) -> AppResult<ApiResponse<DiningTable>> {
    let visibility = Visibility::for_caller(Some(caller));
    let restaurant = visible_restaurant(&state.orm, &visibility, restaurant_id).await?;
    MenuPolicy::authorize_collection(caller, Action::Create, &tenancy_of(&restaurant))?;

    let table = TableActive {
        id: Set(Uuid::new_v4()),
        restaurant_id: Set(restaurant.id),
        number: Set(required_text(&payload.number, "numero")?),
        qr_code_url: Set(optional_text(payload.qr_code_url)),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(ApiResponse::success(table_from_entity(table)))
}

pub async fn get_table(
    state: &AppState,
    caller: &Caller,
    restaurant_id: Uuid,
    id: Uuid,
) -> AppResult<ApiResponse<DiningTable>> {
    let visibility = Visibility::for_caller(Some(caller));
    let table = find_table(&state.orm, &visibility, Some(restaurant_id), id).await?;
    let target = tenancy(&state.orm, table.restaurant_id).await?;
    MenuPolicy::authorize(caller, Action::View, &target)?;

    Ok(ApiResponse::success(table_from_entity(table)))
}

pub async fn update_table(
    state: &AppState,
    caller: &Caller,
    restaurant_id: Uuid,
    id: Uuid,
    payload: UpdateTableRequest,
) -> AppResult<ApiResponse<DiningTable>> {
    let visibility = Visibility::for_caller(Some(caller));
    let table = find_table(&state.orm, &visibility, Some(restaurant_id), id).await?;
    let target = tenancy(&state.orm, table.restaurant_id).await?;
    MenuPolicy::authorize(caller, Action::Update, &target)?;

    let mut active: TableActive = table.into();
    if let Some(number) = payload.number {
        active.number = Set(required_text(&number, "numero")?);
    }
    if payload.qr_code_url.is_some() {
        active.qr_code_url = Set(optional_text(payload.qr_code_url));
    }
    let table = active.update(&state.orm).await?;

    Ok(ApiResponse::success(table_from_entity(table)))
}

pub async fn delete_table(
    state: &AppState,
    caller: &Caller,
    restaurant_id: Uuid,
    id: Uuid,
) -> AppResult<ApiResponse<()>> {
    let visibility = Visibility::for_caller(Some(caller));
    let table = find_table(&state.orm, &visibility, Some(restaurant_id), id).await?;
    let target = tenancy(&state.orm, table.restaurant_id).await?;
    MenuPolicy::authorize(caller, Action::Delete, &target)?;

    DiningTables::delete_by_id(table.id).exec(&state.orm).await?;
    Ok(ApiResponse::message("Table deleted"))
}

/// Tenant-filtered table lookup, optionally pinned to the restaurant in the path.
pub(crate) async fn find_table<C: ConnectionTrait>(
    conn: &C,
    visibility: &Visibility,
    restaurant_id: Option<Uuid>,
    id: Uuid,
) -> AppResult<TableModel> {
    let mut finder = visibility.scope(DiningTables::find_by_id(id));
    if let Some(restaurant_id) = restaurant_id {
        finder = finder.filter(TableCol::RestaurantId.eq(restaurant_id));
    }
    let table = finder.one(conn).await?;
    match table {
        Some(t) => Ok(t),
        None => Err(AppError::NotFound),
    }
}

fn table_from_entity(model: TableModel) -> DiningTable {
    DiningTable {
        id: model.id,
        restaurant_id: model.restaurant_id,
        number: model.number,
        qr_code_url: model.qr_code_url,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
