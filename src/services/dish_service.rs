use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::{
    authz::{Action, Caller, CallerContext, DishPolicy, Policy, Tenancy, Visibility},
    dto::{
        menu::{CreateDishRequest, UpdateDishRequest},
        money, optional_text, required_text,
    },
    entity::{
        categories::Entity as Categories,
        dish_types::{Column as DishTypeCol, Entity as DishTypes},
        dishes::{ActiveModel as DishActive, Column as DishCol, Entity as Dishes, Model as DishModel},
    },
    error::{AppError, AppResult},
    models::Dish,
    response::ApiResponse,
    services::{category_service::find_category, restaurant_service::tenancy},
    state::AppState,
};

pub async fn list_dishes(
    state: &AppState,
    ctx: &CallerContext,
    category_id: Uuid,
) -> AppResult<ApiResponse<Vec<Dish>>> {
    let visibility = ctx.visibility();
    let category = find_category(&state.orm, &visibility, None, category_id).await?;
    if let Some(caller) = ctx.user() {
        let parent = tenancy(&state.orm, category.restaurant_id).await?;
        DishPolicy::authorize_collection(caller, Action::ViewAny, &parent)?;
    }

    let dishes = visibility
        .scope(Dishes::find())
        .filter(DishCol::CategoryId.eq(category.id))
        .order_by_asc(DishCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(dish_from_entity)
        .collect();

    Ok(ApiResponse::success(dishes))
}

pub async fn create_dish(
    state: &AppState,
    caller: &Caller,
    category_id: Uuid,
    payload: CreateDishRequest,
) -> AppResult<ApiResponse<Dish>> {
    let visibility = Visibility::for_caller(Some(caller));
    let category = find_category(&state.orm, &visibility, None, category_id).await?;
    let parent = tenancy(&state.orm, category.restaurant_id).await?;
    DishPolicy::authorize_collection(caller, Action::Create, &parent)?;

    let name = required_text(&payload.name, "nom")?;
    let price = money(payload.price, "prix")?;
    if let Some(dish_type_id) = payload.dish_type_id {
        ensure_dish_type(&state.orm, category.restaurant_id, dish_type_id).await?;
    }

    let dish = DishActive {
        id: Set(Uuid::new_v4()),
        category_id: Set(category.id),
        dish_type_id: Set(payload.dish_type_id),
        name: Set(name),
        description: Set(optional_text(payload.description)),
        price: Set(price),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(ApiResponse::success(dish_from_entity(dish)))
}

pub async fn get_dish(
    state: &AppState,
    caller: &Caller,
    category_id: Uuid,
    id: Uuid,
) -> AppResult<ApiResponse<Dish>> {
    let visibility = Visibility::for_caller(Some(caller));
    let dish = find_dish(&state.orm, &visibility, category_id, id).await?;
    let target = category_tenancy(&state.orm, dish.category_id).await?;
    DishPolicy::authorize(caller, Action::View, &target)?;

    Ok(ApiResponse::success(dish_from_entity(dish)))
}

/// Price changes never reach line items already on an order.
pub async fn update_dish(
    state: &AppState,
    caller: &Caller,
    category_id: Uuid,
    id: Uuid,
    payload: UpdateDishRequest,
) -> AppResult<ApiResponse<Dish>> {
    let visibility = Visibility::for_caller(Some(caller));
    let dish = find_dish(&state.orm, &visibility, category_id, id).await?;
    let target = category_tenancy(&state.orm, dish.category_id).await?;
    DishPolicy::authorize(caller, Action::Update, &target)?;

    let mut active: DishActive = dish.into();
    if let Some(name) = payload.name {
        active.name = Set(required_text(&name, "nom")?);
    }
    if let Some(price) = payload.price {
        active.price = Set(money(price, "prix")?);
    }
    if payload.description.is_some() {
        active.description = Set(optional_text(payload.description));
    }
    if let Some(dish_type_id) = payload.dish_type_id {
        ensure_dish_type(&state.orm, target.restaurant_id, dish_type_id).await?;
        active.dish_type_id = Set(Some(dish_type_id));
    }
    let dish = active.update(&state.orm).await?;

    Ok(ApiResponse::success(dish_from_entity(dish)))
}

pub async fn delete_dish(
    state: &AppState,
    caller: &Caller,
    category_id: Uuid,
    id: Uuid,
) -> AppResult<ApiResponse<()>> {
    let visibility = Visibility::for_caller(Some(caller));
    let dish = find_dish(&state.orm, &visibility, category_id, id).await?;
    let target = category_tenancy(&state.orm, dish.category_id).await?;
    DishPolicy::authorize(caller, Action::Delete, &target)?;

    Dishes::delete_by_id(dish.id).exec(&state.orm).await?;
    Ok(ApiResponse::message("Dish deleted"))
}

async fn find_dish<C: ConnectionTrait>(
    conn: &C,
    visibility: &Visibility,
    category_id: Uuid,
    id: Uuid,
) -> AppResult<DishModel> {
    let dish = visibility
        .scope(Dishes::find_by_id(id))
        .filter(DishCol::CategoryId.eq(category_id))
        .one(conn)
        .await?;
    match dish {
        Some(d) => Ok(d),
        None => Err(AppError::NotFound),
    }
}

/// Tenancy of a dish, through its category.
async fn category_tenancy<C: ConnectionTrait>(conn: &C, category_id: Uuid) -> AppResult<Tenancy> {
    let category = Categories::find_by_id(category_id)
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)?;
    tenancy(conn, category.restaurant_id).await
}

/// A dish can only be labelled with a dish type of its own restaurant.
async fn ensure_dish_type<C: ConnectionTrait>(
    conn: &C,
    restaurant_id: Uuid,
    dish_type_id: Uuid,
) -> AppResult<()> {
    let matching = DishTypes::find_by_id(dish_type_id)
        .filter(DishTypeCol::RestaurantId.eq(restaurant_id))
        .count(conn)
        .await?;
    if matching == 0 {
        return Err(AppError::validation("The selected type plat id is invalid."));
    }
    Ok(())
}

fn dish_from_entity(model: DishModel) -> Dish {
    Dish {
        id: model.id,
        category_id: model.category_id,
        dish_type_id: model.dish_type_id,
        name: model.name,
        description: model.description,
        price: model.price,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
