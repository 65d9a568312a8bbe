use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
    sea_query::LockType,
};
use uuid::Uuid;

use crate::{
    authz::{Action, Caller, Policy, RestaurantPolicy, Role, Tenancy, Visibility},
    dto::{
        optional_text,
        restaurants::{CreateRestaurantRequest, TransferOwnershipRequest, UpdateRestaurantRequest},
        required_text,
    },
    entity::{
        restaurants::{
            ActiveModel as RestaurantActive, Column as RestaurantCol, Entity as Restaurants,
            Model as RestaurantModel,
        },
        users::{ActiveModel as UserActive, Entity as Users, Model as UserModel},
    },
    error::{AppError, AppResult},
    models::{Restaurant, UserSummary},
    response::ApiResponse,
    services::role_service::{grant_role, revoke_role},
    state::AppState,
};

pub async fn list_restaurants(
    state: &AppState,
    caller: &Caller,
) -> AppResult<ApiResponse<Vec<Restaurant>>> {
    RestaurantPolicy::authorize_collection(caller, Action::ViewAny, &())?;

    let restaurants = Restaurants::find()
        .find_also_related(Users)
        .order_by_asc(RestaurantCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|(restaurant, owner)| restaurant_from_entity(restaurant, owner))
        .collect();

    Ok(ApiResponse::success(restaurants))
}

pub async fn get_restaurant(
    state: &AppState,
    caller: &Caller,
    id: Uuid,
) -> AppResult<ApiResponse<Restaurant>> {
    let found = Restaurants::find_by_id(id)
        .find_also_related(Users)
        .one(&state.orm)
        .await?;
    let (restaurant, owner) = match found {
        Some(r) => r,
        None => return Err(AppError::NotFound),
    };
    RestaurantPolicy::authorize(caller, Action::View, &tenancy_of(&restaurant))?;

    Ok(ApiResponse::success(restaurant_from_entity(restaurant, owner)))
}

/// Create a restaurant and make its owner an administrator working there.
pub async fn create_restaurant(
    state: &AppState,
    caller: &Caller,
    payload: CreateRestaurantRequest,
) -> AppResult<ApiResponse<Restaurant>> {
    RestaurantPolicy::authorize_collection(caller, Action::Create, &())?;
    let name = required_text(&payload.name, "nom")?;
    let owner_id = payload.owner_id.unwrap_or(caller.id);

    let txn = state.orm.begin().await?;

    let owner = match Users::find_by_id(owner_id).one(&txn).await? {
        Some(u) => u,
        None => {
            return Err(AppError::validation(
                "The selected proprietaire id is invalid.",
            ));
        }
    };

    let restaurant = RestaurantActive {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        address: Set(optional_text(payload.address)),
        phone: Set(optional_text(payload.phone)),
        owner_id: Set(owner.id),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    grant_role(&txn, owner.id, Role::RestaurantAdmin).await?;
    let mut owner_active: UserActive = owner.into();
    owner_active.restaurant_id = Set(Some(restaurant.id));
    let owner = owner_active.update(&txn).await?;

    txn.commit().await?;

    tracing::info!(
        restaurant_id = %restaurant.id,
        owner_id = %owner.id,
        created_by = %caller.id,
        "restaurant created"
    );
    Ok(ApiResponse::with_message(
        "Restaurant created",
        restaurant_from_entity(restaurant, Some(owner)),
    ))
}

pub async fn update_restaurant(
    state: &AppState,
    caller: &Caller,
    id: Uuid,
    payload: UpdateRestaurantRequest,
) -> AppResult<ApiResponse<Restaurant>> {
    let restaurant = find_restaurant(&state.orm, id).await?;
    RestaurantPolicy::authorize(caller, Action::Update, &tenancy_of(&restaurant))?;

    let mut active: RestaurantActive = restaurant.into();
    if let Some(name) = payload.name {
        active.name = Set(required_text(&name, "nom")?);
    }
    if payload.address.is_some() {
        active.address = Set(optional_text(payload.address));
    }
    if payload.phone.is_some() {
        active.phone = Set(optional_text(payload.phone));
    }
    active.updated_at = Set(Utc::now().into());
    let restaurant = active.update(&state.orm).await?;

    let owner = Users::find_by_id(restaurant.owner_id).one(&state.orm).await?;
    Ok(ApiResponse::with_message(
        "Restaurant updated",
        restaurant_from_entity(restaurant, owner),
    ))
}

pub async fn delete_restaurant(
    state: &AppState,
    caller: &Caller,
    id: Uuid,
) -> AppResult<ApiResponse<()>> {
    let restaurant = find_restaurant(&state.orm, id).await?;
    RestaurantPolicy::authorize(caller, Action::Delete, &tenancy_of(&restaurant))?;

    Restaurants::delete_by_id(restaurant.id)
        .exec(&state.orm)
        .await?;

    tracing::info!(restaurant_id = %id, deleted_by = %caller.id, "restaurant deleted");
    Ok(ApiResponse::message("Restaurant deleted"))
}

/// Move a restaurant to a new owner in a single transaction.
pub async fn transfer_ownership(
    state: &AppState,
    caller: &Caller,
    id: Uuid,
    payload: TransferOwnershipRequest,
) -> AppResult<ApiResponse<Restaurant>> {
    let txn = state.orm.begin().await?;

    let restaurant = Restaurants::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let restaurant = match restaurant {
        Some(r) => r,
        None => return Err(AppError::NotFound),
    };
    RestaurantPolicy::authorize(caller, Action::Update, &tenancy_of(&restaurant))?;

    let previous_owner = restaurant.owner_id;
    let (restaurant, owner) = apply_transfer(&txn, restaurant, payload.new_owner_id).await?;
    txn.commit().await?;

    tracing::info!(
        restaurant_id = %restaurant.id,
        from = %previous_owner,
        to = %owner.id,
        "ownership transferred"
    );
    Ok(ApiResponse::with_message(
        "Ownership transferred",
        restaurant_from_entity(restaurant, Some(owner)),
    ))
}

/// The writes of an ownership transfer. Runs on the caller's connection so
/// the whole sequence commits or rolls back together.
pub async fn apply_transfer<C: ConnectionTrait>(
    conn: &C,
    restaurant: RestaurantModel,
    new_owner_id: Uuid,
) -> AppResult<(RestaurantModel, UserModel)> {
    let new_owner = match Users::find_by_id(new_owner_id).one(conn).await? {
        Some(u) => u,
        None => {
            return Err(AppError::validation(
                "The selected new proprietaire id is invalid.",
            ));
        }
    };

    let old_owner_id = restaurant.owner_id;
    if old_owner_id != new_owner.id {
        let other_owned = Restaurants::find()
            .filter(RestaurantCol::OwnerId.eq(old_owner_id))
            .filter(RestaurantCol::Id.ne(restaurant.id))
            .count(conn)
            .await?;
        if other_owned == 0 {
            revoke_role(conn, old_owner_id, Role::RestaurantAdmin).await?;
        }
    }

    let mut active: RestaurantActive = restaurant.into();
    active.owner_id = Set(new_owner.id);
    active.updated_at = Set(Utc::now().into());
    let restaurant = active.update(conn).await?;

    grant_role(conn, new_owner.id, Role::RestaurantAdmin).await?;
    let mut owner_active: UserActive = new_owner.into();
    owner_active.restaurant_id = Set(Some(restaurant.id));
    let new_owner = owner_active.update(conn).await?;

    Ok((restaurant, new_owner))
}

async fn find_restaurant<C: ConnectionTrait>(conn: &C, id: Uuid) -> AppResult<RestaurantModel> {
    Restaurants::find_by_id(id)
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)
}

/// Resolve a restaurant used as the container of a nested resource.
/// Restaurants outside the caller's visibility are reported as missing.
pub(crate) async fn visible_restaurant<C: ConnectionTrait>(
    conn: &C,
    visibility: &Visibility,
    id: Uuid,
) -> AppResult<RestaurantModel> {
    visibility.ensure_restaurant(id)?;
    find_restaurant(conn, id).await
}

/// Tenancy of the restaurant `id`, for resources that only carry the id.
pub(crate) async fn tenancy<C: ConnectionTrait>(conn: &C, restaurant_id: Uuid) -> AppResult<Tenancy> {
    let restaurant = find_restaurant(conn, restaurant_id).await?;
    Ok(tenancy_of(&restaurant))
}

pub(crate) fn tenancy_of(restaurant: &RestaurantModel) -> Tenancy {
    Tenancy::new(restaurant.id, restaurant.owner_id)
}

pub(crate) fn user_summary_from_entity(model: UserModel) -> UserSummary {
    UserSummary {
        id: model.id,
        name: model.name,
        email: model.email,
    }
}

fn restaurant_from_entity(model: RestaurantModel, owner: Option<UserModel>) -> Restaurant {
    Restaurant {
        id: model.id,
        name: model.name,
        address: model.address,
        phone: model.phone,
        owner_id: model.owner_id,
        owner: owner.map(user_summary_from_entity),
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
