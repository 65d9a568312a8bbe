mod common;

use restaurant_ordering_api::{
    authz::{CallerContext, Role, guest},
    dto::{
        menu::UpdateDishRequest,
        order_items::{AddItemRequest, UpdateItemRequest},
        orders::CreateOrderRequest,
        payments::CreatePaymentRequest,
    },
    entity::order_items::ItemKind,
    error::AppError,
    services::{dish_service, order_item_service, order_service, payment_service},
    state::AppState,
};
use rust_decimal::Decimal;
use uuid::Uuid;

use common::{
    create_category, create_dish, create_drink, create_employee, create_restaurant, create_table,
    setup_state,
};

fn add(kind: ItemKind, item_id: Uuid, quantity: i32) -> AddItemRequest {
    AddItemRequest {
        item_type: kind,
        item_id,
        quantity,
    }
}

fn payment(amount: Decimal, status: &str) -> CreatePaymentRequest {
    CreatePaymentRequest {
        amount,
        mode: "especes".into(),
        status: status.into(),
        order_id: None,
    }
}

async fn order_total(
    state: &AppState,
    ctx: &CallerContext,
    table_id: Uuid,
    order_id: Uuid,
) -> anyhow::Result<Decimal> {
    let detail = order_service::get_order(state, ctx, table_id, order_id)
        .await?
        .data
        .ok_or_else(|| anyhow::anyhow!("no order"))?;
    Ok(detail.order.total)
}

// Table customer: order -> token -> items -> payment -> token revoked.
#[tokio::test]
async fn guest_orders_pays_and_loses_access() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let (restaurant, admin) = create_restaurant(&state, "bistro").await?;
    let table = create_table(&state, &admin, restaurant.id, "12").await?;
    let category = create_category(&state, &admin, restaurant.id, "Plats").await?;
    let dish = create_dish(&state, &admin, category.id, "Gratin", Decimal::new(1250, 2)).await?;
    let drink = create_drink(&state, &admin, restaurant.id, "Cidre", Decimal::new(320, 2)).await?;

    let created = order_service::create_order(
        &state,
        &CallerContext::anonymous(),
        table.id,
        CreateOrderRequest::default(),
    )
    .await?;
    let order = created.data;
    let token = created
        .token
        .ok_or_else(|| anyhow::anyhow!("anonymous order without token"))?;
    assert_eq!(order.status, order_service::DEFAULT_STATUS);
    assert_eq!(order.total, Decimal::ZERO);

    guest::verify(&state.orm, &token, order.id).await?;
    let err = guest::verify(&state.orm, &token, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let ctx = CallerContext::anonymous();
    let dish_line = order_item_service::add_item(&state, &ctx, order.id, add(ItemKind::Dish, dish.id, 2))
        .await?
        .data
        .ok_or_else(|| anyhow::anyhow!("no item"))?;
    let drink_line =
        order_item_service::add_item(&state, &ctx, order.id, add(ItemKind::Drink, drink.id, 3))
            .await?
            .data
            .ok_or_else(|| anyhow::anyhow!("no item"))?;
    assert_eq!(dish_line.unit_price, Decimal::new(1250, 2));
    assert_eq!(
        order_total(&state, &ctx, table.id, order.id).await?,
        Decimal::new(3460, 2)
    );

    let err = order_item_service::add_item(&state, &ctx, order.id, add(ItemKind::Dish, dish.id, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = order_item_service::add_item(
        &state,
        &ctx,
        order.id,
        add(ItemKind::Drink, Uuid::new_v4(), 1),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    // Removing a line takes its amount off the total.
    order_item_service::delete_item(&state, &ctx, order.id, drink_line.id).await?;
    assert_eq!(
        order_total(&state, &ctx, table.id, order.id).await?,
        Decimal::new(2500, 2)
    );

    let err = payment_service::create_payment(
        &state,
        &ctx,
        order.id,
        CreatePaymentRequest {
            order_id: Some(Uuid::new_v4()),
            ..payment(Decimal::new(2500, 2), "valide")
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    payment_service::create_payment(&state, &ctx, order.id, payment(Decimal::new(2500, 2), "valide"))
        .await?;
    assert!(!guest::session_exists(&state.orm, &token, order.id).await?);

    let err = payment_service::create_payment(
        &state,
        &ctx,
        order.id,
        payment(Decimal::new(100, 2), "en_attente"),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    Ok(())
}

#[tokio::test]
async fn line_prices_are_frozen_and_totals_follow_updates() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let (restaurant, admin) = create_restaurant(&state, "brasserie").await?;
    let (other, other_admin) = create_restaurant(&state, "elsewhere").await?;
    let table = create_table(&state, &admin, restaurant.id, "3").await?;
    let category = create_category(&state, &admin, restaurant.id, "Plats").await?;
    let dish = create_dish(&state, &admin, category.id, "Cassoulet", Decimal::new(1800, 2)).await?;
    let foreign_drink =
        create_drink(&state, &other_admin, other.id, "Biere", Decimal::new(500, 2)).await?;

    let waiter = create_employee(&state, "server", &[Role::Waiter], restaurant.id).await?;
    let ctx = CallerContext::authenticated(waiter.clone());

    let created =
        order_service::create_order(&state, &ctx, table.id, CreateOrderRequest::default()).await?;
    assert!(created.token.is_none());
    let order = created.data;

    let line = order_item_service::add_item(&state, &ctx, order.id, add(ItemKind::Dish, dish.id, 2))
        .await?
        .data
        .ok_or_else(|| anyhow::anyhow!("no item"))?;

    dish_service::update_dish(
        &state,
        &admin,
        category.id,
        dish.id,
        UpdateDishRequest {
            name: None,
            price: Some(Decimal::new(2200, 2)),
            description: None,
            dish_type_id: None,
        },
    )
    .await?;

    // The existing line keeps the price it was ordered at.
    let detail = order_service::get_order(&state, &ctx, table.id, order.id)
        .await?
        .data
        .ok_or_else(|| anyhow::anyhow!("no order"))?;
    assert_eq!(detail.items[0].unit_price, Decimal::new(1800, 2));
    assert_eq!(detail.order.total, Decimal::new(3600, 2));

    let second = order_item_service::add_item(&state, &ctx, order.id, add(ItemKind::Dish, dish.id, 1))
        .await?
        .data
        .ok_or_else(|| anyhow::anyhow!("no item"))?;
    assert_eq!(second.unit_price, Decimal::new(2200, 2));
    assert_eq!(
        order_total(&state, &ctx, table.id, order.id).await?,
        Decimal::new(5800, 2)
    );

    order_item_service::update_item(&state, &waiter, order.id, line.id, UpdateItemRequest { quantity: 1 })
        .await?;
    assert_eq!(
        order_total(&state, &ctx, table.id, order.id).await?,
        Decimal::new(4000, 2)
    );

    // Anonymous callers can resolve any drink, but not put another restaurant's on this order.
    let guest_ctx = CallerContext::anonymous();
    let err = order_item_service::add_item(
        &state,
        &guest_ctx,
        order.id,
        add(ItemKind::Drink, foreign_drink.id, 1),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    // Staff only see their own restaurant's catalog.
    let err = order_item_service::add_item(&state, &ctx, order.id, add(ItemKind::Drink, foreign_drink.id, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    Ok(())
}

#[tokio::test]
async fn amounts_too_large_for_storage_are_rejected() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let (restaurant, admin) = create_restaurant(&state, "banquet").await?;
    let table = create_table(&state, &admin, restaurant.id, "1").await?;
    let category = create_category(&state, &admin, restaurant.id, "Plats").await?;
    let dish = create_dish(&state, &admin, category.id, "Homard", Decimal::new(9900, 2)).await?;
    let feast =
        create_dish(&state, &admin, category.id, "Festin", Decimal::new(6_000_000_000, 2)).await?;

    let ctx = CallerContext::anonymous();
    let order = order_service::create_order(&state, &ctx, table.id, CreateOrderRequest::default())
        .await?
        .data;

    // 2 000 000 x 99.00 does not fit a single line.
    let err = order_item_service::add_item(&state, &ctx, order.id, add(ItemKind::Dish, dish.id, 2_000_000))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    order_item_service::add_item(&state, &ctx, order.id, add(ItemKind::Dish, feast.id, 1)).await?;
    assert_eq!(
        order_total(&state, &ctx, table.id, order.id).await?,
        Decimal::new(6_000_000_000, 2)
    );

    // Each line fits on its own, the sum does not; nothing is kept.
    let err = order_item_service::add_item(&state, &ctx, order.id, add(ItemKind::Dish, feast.id, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let detail = order_service::get_order(&state, &ctx, table.id, order.id)
        .await?
        .data
        .ok_or_else(|| anyhow::anyhow!("no order"))?;
    assert_eq!(detail.items.len(), 1);
    assert_eq!(detail.order.total, Decimal::new(6_000_000_000, 2));

    Ok(())
}
