use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::{
    authz::{Action, Caller, CallerContext, MenuPolicy, Policy, Visibility},
    dto::{
        menu::{CreateDrinkRequest, UpdateDrinkRequest},
        money, optional_text, required_text,
    },
    entity::drinks::{
        ActiveModel as DrinkActive, Column as DrinkCol, Entity as Drinks, Model as DrinkModel,
    },
    error::{AppError, AppResult},
    models::Drink,
    response::ApiResponse,
    services::restaurant_service::{tenancy, tenancy_of, visible_restaurant},
    state::AppState,
};

pub async fn list_drinks(
    state: &AppState,
    ctx: &CallerContext,
    restaurant_id: Uuid,
) -> AppResult<ApiResponse<Vec<Drink>>> {
    let visibility = ctx.visibility();
    let restaurant = visible_restaurant(&state.orm, &visibility, restaurant_id).await?;
    if let Some(caller) = ctx.user() {
        MenuPolicy::authorize_collection(caller, Action::ViewAny, &tenancy_of(&restaurant))?;
    }

    let drinks = visibility
        .scope(Drinks::find())
        .filter(DrinkCol::RestaurantId.eq(restaurant.id))
        .order_by_asc(DrinkCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(drink_from_entity)
        .collect();

    Ok(ApiResponse::success(drinks))
}

pub async fn create_drink(
    state: &AppState,
    caller: &Caller,
    restaurant_id: Uuid,
    payload: CreateDrinkRequest,
) -> AppResult<ApiResponse<Drink>> {
    let visibility = Visibility::for_caller(Some(caller));
    let restaurant = visible_restaurant(&state.orm, &visibility, restaurant_id).await?;
    MenuPolicy::authorize_collection(caller, Action::Create, &tenancy_of(&restaurant))?;

    let drink = DrinkActive {
        id: Set(Uuid::new_v4()),
        restaurant_id: Set(restaurant.id),
        name: Set(required_text(&payload.name, "nom")?),
        description: Set(optional_text(payload.description)),
        price: Set(money(payload.price, "prix")?),
        volume: Set(optional_text(payload.volume)),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(ApiResponse::success(drink_from_entity(drink)))
}

pub async fn get_drink(
    state: &AppState,
    caller: &Caller,
    restaurant_id: Uuid,
    id: Uuid,
) -> AppResult<ApiResponse<Drink>> {
    let visibility = Visibility::for_caller(Some(caller));
    let drink = find_drink(&state.orm, &visibility, restaurant_id, id).await?;
    let target = tenancy(&state.orm, drink.restaurant_id).await?;
    MenuPolicy::authorize(caller, Action::View, &target)?;

    Ok(ApiResponse::success(drink_from_entity(drink)))
}

/// Price changes never reach line items already on an order.
pub async fn update_drink(
    state: &AppState,
    caller: &Caller,
    restaurant_id: Uuid,
    id: Uuid,
    payload: UpdateDrinkRequest,
) -> AppResult<ApiResponse<Drink>> {
    let visibility = Visibility::for_caller(Some(caller));
    let drink = find_drink(&state.orm, &visibility, restaurant_id, id).await?;
    let target = tenancy(&state.orm, drink.restaurant_id).await?;
    MenuPolicy::authorize(caller, Action::Update, &target)?;

    let mut active: DrinkActive = drink.into();
    if let Some(name) = payload.name {
        active.name = Set(required_text(&name, "nom")?);
    }
    if let Some(price) = payload.price {
        active.price = Set(money(price, "prix")?);
    }
    if payload.description.is_some() {
        active.description = Set(optional_text(payload.description));
    }
    if payload.volume.is_some() {
        active.volume = Set(optional_text(payload.volume));
    }
    let drink = active.update(&state.orm).await?;

    Ok(ApiResponse::success(drink_from_entity(drink)))
}

pub async fn delete_drink(
    state: &AppState,
    caller: &Caller,
    restaurant_id: Uuid,
    id: Uuid,
) -> AppResult<ApiResponse<()>> {
    let visibility = Visibility::for_caller(Some(caller));
    let drink = find_drink(&state.orm, &visibility, restaurant_id, id).await?;
    let target = tenancy(&state.orm, drink.restaurant_id).await?;
    MenuPolicy::authorize(caller, Action::Delete, &target)?;

    Drinks::delete_by_id(drink.id).exec(&state.orm).await?;
    Ok(ApiResponse::message("Drink deleted"))
}

async fn find_drink<C: ConnectionTrait>(
    conn: &C,
    visibility: &Visibility,
    restaurant_id: Uuid,
    id: Uuid,
) -> AppResult<DrinkModel> {
    let drink = visibility
        .scope(Drinks::find_by_id(id))
        .filter(DrinkCol::RestaurantId.eq(restaurant_id))
        .one(conn)
        .await?;
    match drink {
        Some(d) => Ok(d),
        None => Err(AppError::NotFound),
    }
}

fn drink_from_entity(model: DrinkModel) -> Drink {
    Drink {
        id: model.id,
        restaurant_id: model.restaurant_id,
        name: model.name,
        description: model.description,
        price: model.price,
        volume: model.volume,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
