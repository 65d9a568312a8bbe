#![allow(dead_code)]

use restaurant_ordering_api::{
    authz::{Caller, CallerContext, Role},
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    dto::{
        menu::{CreateDishRequest, CreateDrinkRequest, CreateTableRequest, NamedRequest},
        restaurants::CreateRestaurantRequest,
    },
    entity::users::ActiveModel as UserActive,
    models::{Category, DiningTable, Dish, Drink, Restaurant},
    services::{
        category_service, dish_service, drink_service, restaurant_service,
        role_service::grant_role, table_service,
    },
    state::AppState,
};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ActiveValue::NotSet, ConnectionTrait, Set, Statement};
use tokio::sync::OnceCell;
use uuid::Uuid;

static TRUNCATED: OnceCell<()> = OnceCell::const_new();

/// Connect to the test database, or `None` when none is configured.
pub async fn setup_state() -> anyhow::Result<Option<AppState>> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration tests."
            );
            return Ok(None);
        }
    };

    let orm = create_orm_conn(&database_url).await?;
    run_migrations(&orm).await?;

    // Once per test binary; tests inside a binary run concurrently and use unique data.
    TRUNCATED
        .get_or_try_init(|| async {
            orm.execute(Statement::from_string(
                orm.get_database_backend(),
                "TRUNCATE TABLE revoked_tokens, guest_sessions, payments, order_items, orders, \
                 dishes, drinks, dish_types, categories, dining_tables, user_roles, restaurants, \
                 users RESTART IDENTITY CASCADE"
                    .to_owned(),
            ))
            .await
            .map(|_| ())
        })
        .await?;

    let config = AppConfig {
        database_url,
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: "test-secret".into(),
        jwt_ttl_hours: 1,
    };
    Ok(Some(AppState::new(orm, config)))
}

pub async fn create_user(state: &AppState, name: &str, roles: &[Role]) -> anyhow::Result<Uuid> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        email: Set(format!("{name}-{}@example.com", Uuid::new_v4())),
        password_hash: Set("not-a-real-hash".into()),
        restaurant_id: Set(None),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    for role in roles {
        grant_role(&state.orm, user.id, *role).await?;
    }
    Ok(user.id)
}

/// Staff member whose home restaurant is `restaurant_id`.
pub async fn create_employee(
    state: &AppState,
    name: &str,
    roles: &[Role],
    restaurant_id: Uuid,
) -> anyhow::Result<Caller> {
    let id = create_user(state, name, roles).await?;
    let user = UserActive {
        id: Set(id),
        restaurant_id: Set(Some(restaurant_id)),
        ..Default::default()
    };
    user.update(&state.orm).await?;
    load_caller(state, id).await
}

pub async fn load_caller(state: &AppState, id: Uuid) -> anyhow::Result<Caller> {
    Caller::load(&state.orm, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("user {id} not found"))
}

pub fn as_ctx(caller: &Caller) -> CallerContext {
    CallerContext::authenticated(caller.clone())
}

/// A restaurant owned by a fresh user; returns the restaurant and its reloaded owner.
pub async fn create_restaurant(
    state: &AppState,
    name: &str,
) -> anyhow::Result<(Restaurant, Caller)> {
    let owner_id = create_user(state, &format!("owner-{name}"), &[]).await?;
    let owner = load_caller(state, owner_id).await?;
    let created = restaurant_service::create_restaurant(
        state,
        &owner,
        CreateRestaurantRequest {
            name: name.to_string(),
            address: None,
            phone: None,
            owner_id: None,
        },
    )
    .await?;
    let restaurant = created.data.ok_or_else(|| anyhow::anyhow!("no restaurant"))?;
    let owner = load_caller(state, owner_id).await?;
    Ok((restaurant, owner))
}

pub async fn create_table(
    state: &AppState,
    admin: &Caller,
    restaurant_id: Uuid,
    number: &str,
) -> anyhow::Result<DiningTable> {
    let resp = table_service::create_table(
        state,
        admin,
        restaurant_id,
        CreateTableRequest {
            number: number.to_string(),
            qr_code_url: None,
        },
    )
    .await?;
    resp.data.ok_or_else(|| anyhow::anyhow!("no table"))
}

pub async fn create_category(
    state: &AppState,
    admin: &Caller,
    restaurant_id: Uuid,
    name: &str,
) -> anyhow::Result<Category> {
    let resp = category_service::create_category(
        state,
        admin,
        restaurant_id,
        NamedRequest {
            name: name.to_string(),
        },
    )
    .await?;
    resp.data.ok_or_else(|| anyhow::anyhow!("no category"))
}

pub async fn create_dish(
    state: &AppState,
    admin: &Caller,
    category_id: Uuid,
    name: &str,
    price: Decimal,
) -> anyhow::Result<Dish> {
    let resp = dish_service::create_dish(
        state,
        admin,
        category_id,
        CreateDishRequest {
            name: name.to_string(),
            price,
            description: None,
            dish_type_id: None,
        },
    )
    .await?;
    resp.data.ok_or_else(|| anyhow::anyhow!("no dish"))
}

pub async fn create_drink(
    state: &AppState,
    admin: &Caller,
    restaurant_id: Uuid,
    name: &str,
    price: Decimal,
) -> anyhow::Result<Drink> {
    let resp = drink_service::create_drink(
        state,
        admin,
        restaurant_id,
        CreateDrinkRequest {
            name: name.to_string(),
            price,
            volume: None,
            description: None,
        },
    )
    .await?;
    resp.data.ok_or_else(|| anyhow::anyhow!("no drink"))
}
