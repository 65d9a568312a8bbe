use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::{
    authz::{Action, Caller, CallerContext, MenuPolicy, Policy, Visibility},
    dto::{menu::NamedRequest, required_text},
    entity::dish_types::{
        ActiveModel as DishTypeActive, Column as DishTypeCol, Entity as DishTypes,
        Model as DishTypeModel,
    },
    error::{AppError, AppResult},
    models::DishType,
    response::ApiResponse,
    services::restaurant_service::{tenancy, tenancy_of, visible_restaurant},
    state::AppState,
};

/// Public menu read. Dish types are labels only; they carry no price.
pub async fn list_dish_types(
    state: &AppState,
    ctx: &CallerContext,
    restaurant_id: Uuid,
) -> AppResult<ApiResponse<Vec<DishType>>> {
    let visibility = ctx.visibility();
    let restaurant = visible_restaurant(&state.orm, &visibility, restaurant_id).await?;
    if let Some(caller) = ctx.user() {
        MenuPolicy::authorize_collection(caller, Action::ViewAny, &tenancy_of(&restaurant))?;
    }

    let dish_types = visibility
        .scope(DishTypes::find())
        .filter(DishTypeCol::RestaurantId.eq(restaurant.id))
        .order_by_asc(DishTypeCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(dish_type_from_entity)
        .collect();

    Ok(ApiResponse::success(dish_types))
}

pub async fn create_dish_type(
    state: &AppState,
    caller: &Caller,
    restaurant_id: Uuid,
    payload: NamedRequest,
) -> AppResult<ApiResponse<DishType>> {
    let visibility = Visibility::for_caller(Some(caller));
    let restaurant = visible_restaurant(&state.orm, &visibility, restaurant_id).await?;
    MenuPolicy::authorize_collection(caller, Action::Create, &tenancy_of(&restaurant))?;

    let dish_type = DishTypeActive {
        id: Set(Uuid::new_v4()),
        restaurant_id: Set(restaurant.id),
        name: Set(required_text(&payload.name, "nom")?),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(ApiResponse::success(dish_type_from_entity(dish_type)))
}

pub async fn get_dish_type(
    state: &AppState,
    caller: &Caller,
    restaurant_id: Uuid,
    id: Uuid,
) -> AppResult<ApiResponse<DishType>> {
    let visibility = Visibility::for_caller(Some(caller));
    let dish_type = find_dish_type(&state.orm, &visibility, Some(restaurant_id), id).await?;
    let target = tenancy(&state.orm, dish_type.restaurant_id).await?;
    MenuPolicy::authorize(caller, Action::View, &target)?;

    Ok(ApiResponse::success(dish_type_from_entity(dish_type)))
}

pub async fn update_dish_type(
    state: &AppState,
    caller: &Caller,
    restaurant_id: Uuid,
    id: Uuid,
    payload: NamedRequest,
) -> AppResult<ApiResponse<DishType>> {
    let visibility = Visibility::for_caller(Some(caller));
    let dish_type = find_dish_type(&state.orm, &visibility, Some(restaurant_id), id).await?;
    let target = tenancy(&state.orm, dish_type.restaurant_id).await?;
    MenuPolicy::authorize(caller, Action::Update, &target)?;

    let mut active: DishTypeActive = dish_type.into();
    active.name = Set(required_text(&payload.name, "nom")?);
    let dish_type = active.update(&state.orm).await?;

    Ok(ApiResponse::success(dish_type_from_entity(dish_type)))
}

pub async fn delete_dish_type(
    state: &AppState,
    caller: &Caller,
    restaurant_id: Uuid,
    id: Uuid,
) -> AppResult<ApiResponse<()>> {
    let visibility = Visibility::for_caller(Some(caller));
    let dish_type = find_dish_type(&state.orm, &visibility, Some(restaurant_id), id).await?;
    let target = tenancy(&state.orm, dish_type.restaurant_id).await?;
    MenuPolicy::authorize(caller, Action::Delete, &target)?;

    DishTypes::delete_by_id(dish_type.id).exec(&state.orm).await?;
    Ok(ApiResponse::message("Dish type deleted"))
}

pub(crate) async fn find_dish_type<C: ConnectionTrait>(
    conn: &C,
    visibility: &Visibility,
    restaurant_id: Option<Uuid>,
    id: Uuid,
) -> AppResult<DishTypeModel> {
    let mut finder = visibility.scope(DishTypes::find_by_id(id));
    if let Some(restaurant_id) = restaurant_id {
        finder = finder.filter(DishTypeCol::RestaurantId.eq(restaurant_id));
    }
    finder.one(conn).await?.ok_or(AppError::NotFound)
}

fn dish_type_from_entity(model: DishTypeModel) -> DishType {
    DishType {
        id: model.id,
        restaurant_id: model.restaurant_id,
        name: model.name,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
