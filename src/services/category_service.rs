use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::{
    authz::{Action, Caller, CallerContext, MenuPolicy, Policy, Visibility},
    dto::{menu::NamedRequest, required_text},
    entity::categories::{
        ActiveModel as CategoryActive, Column as CategoryCol, Entity as Categories,
        Model as CategoryModel,
    },
    error::{AppError, AppResult},
    models::Category,
    response::ApiResponse,
    services::restaurant_service::{tenancy, tenancy_of, visible_restaurant},
    state::AppState,
};

/// Public menu read.
pub async fn list_categories(
    state: &AppState,
    ctx: &CallerContext,
    restaurant_id: Uuid,
) -> AppResult<ApiResponse<Vec<Category>>> {
    let visibility = ctx.visibility();
    let restaurant = visible_restaurant(&state.orm, &visibility, restaurant_id).await?;
    if let Some(caller) = ctx.user() {
        MenuPolicy::authorize_collection(caller, Action::ViewAny, &tenancy_of(&restaurant))?;
    }

    let categories = visibility
        .scope(Categories::find())
        .filter(CategoryCol::RestaurantId.eq(restaurant.id))
        .order_by_asc(CategoryCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(category_from_entity)
        .collect();

    Ok(ApiResponse::success(categories))
}

pub async fn create_category(
    state: &AppState,
    caller: &Caller,
    restaurant_id: Uuid,
    payload: NamedRequest,
) -> AppResult<ApiResponse<Category>> {
    let visibility = Visibility::for_caller(Some(caller));
    let restaurant = visible_restaurant(&state.orm, &visibility, restaurant_id).await?;
    MenuPolicy::authorize_collection(caller, Action::Create, &tenancy_of(&restaurant))?;

    let category = CategoryActive {
        id: Set(Uuid::new_v4()),
        restaurant_id: Set(restaurant.id),
        name: Set(required_text(&payload.name, "nom")?),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(category_id = %category.id, restaurant_id = %restaurant.id, "category created");
    Ok(ApiResponse::success(category_from_entity(category)))
}

pub async fn get_category(
    state: &AppState,
    caller: &Caller,
    restaurant_id: Uuid,
    id: Uuid,
) -> AppResult<ApiResponse<Category>> {
    let visibility = Visibility::for_caller(Some(caller));
    let category = find_category(&state.orm, &visibility, Some(restaurant_id), id).await?;
    let target = tenancy(&state.orm, category.restaurant_id).await?;
    MenuPolicy::authorize(caller, Action::View, &target)?;

    Ok(ApiResponse::success(category_from_entity(category)))
}

pub async fn update_category(
    state: &AppState,
    caller: &Caller,
    restaurant_id: Uuid,
    id: Uuid,
    payload: NamedRequest,
) -> AppResult<ApiResponse<Category>> {
    let visibility = Visibility::for_caller(Some(caller));
    let category = find_category(&state.orm, &visibility, Some(restaurant_id), id).await?;
    let target = tenancy(&state.orm, category.restaurant_id).await?;
    MenuPolicy::authorize(caller, Action::Update, &target)?;

    let mut active: CategoryActive = category.into();
    active.name = Set(required_text(&payload.name, "nom")?);
    let category = active.update(&state.orm).await?;

    Ok(ApiResponse::success(category_from_entity(category)))
}

pub async fn delete_category(
    state: &AppState,
    caller: &Caller,
    restaurant_id: Uuid,
    id: Uuid,
) -> AppResult<ApiResponse<()>> {
    let visibility = Visibility::for_caller(Some(caller));
    let category = find_category(&state.orm, &visibility, Some(restaurant_id), id).await?;
    let target = tenancy(&state.orm, category.restaurant_id).await?;
    MenuPolicy::authorize(caller, Action::Delete, &target)?;

    Categories::delete_by_id(category.id).exec(&state.orm).await?;
    Ok(ApiResponse::message("Category deleted"))
}

pub(crate) async fn find_category<C: ConnectionTrait>(
    conn: &C,
    visibility: &Visibility,
    restaurant_id: Option<Uuid>,
    id: Uuid,
) -> AppResult<CategoryModel> {
    let mut finder = visibility.scope(Categories::find_by_id(id));
    if let Some(restaurant_id) = restaurant_id {
        finder = finder.filter(CategoryCol::RestaurantId.eq(restaurant_id));
    }
    finder.one(conn).await?.ok_or(AppError::NotFound)
}

fn category_from_entity(model: CategoryModel) -> Category {
    Category {
        id: model.id,
        restaurant_id: model.restaurant_id,
        name: model.name,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
