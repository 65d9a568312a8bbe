mod common;

use restaurant_ordering_api::{
    authz::{CallerContext, Role},
    dto::{
        menu::NamedRequest,
        order_items::{AddItemRequest, UpdateItemRequest},
        orders::CreateOrderRequest,
        payments::CreatePaymentRequest,
    },
    entity::order_items::ItemKind,
    error::AppError,
    services::{category_service, order_item_service, order_service, payment_service},
};
use rust_decimal::Decimal;

use common::{
    as_ctx, create_category, create_dish, create_employee, create_restaurant, create_table,
    create_user, load_caller, setup_state,
};

// Another tenant's category is invisible (404); a visible one the caller may not edit is 403.
#[tokio::test]
async fn menu_entities_of_other_restaurants_are_not_found() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let (r1, admin1) = create_restaurant(&state, "north").await?;
    let (r2, admin2) = create_restaurant(&state, "south").await?;
    let foreign = create_category(&state, &admin2, r2.id, "Desserts").await?;
    let own = create_category(&state, &admin1, r1.id, "Starters").await?;

    let err = category_service::get_category(&state, &admin1, r2.id, foreign.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    // Pinning the path to the caller's own restaurant does not reveal it either.
    let err = category_service::get_category(&state, &admin1, r1.id, foreign.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    let err = category_service::update_category(
        &state,
        &admin1,
        r2.id,
        foreign.id,
        NamedRequest {
            name: "Mine now".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    // Creating under an invisible restaurant is reported the same way.
    let err = category_service::create_category(
        &state,
        &admin1,
        r2.id,
        NamedRequest {
            name: "Intruder".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    let waiter = create_employee(&state, "waiter", &[Role::Waiter], r1.id).await?;
    let err = category_service::update_category(
        &state,
        &waiter,
        r1.id,
        own.id,
        NamedRequest {
            name: "Renamed".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let renamed = category_service::update_category(
        &state,
        &admin1,
        r1.id,
        own.id,
        NamedRequest {
            name: "Renamed".into(),
        },
    )
    .await?;
    assert_eq!(renamed.data.map(|c| c.name), Some("Renamed".to_string()));

    // Anonymous menu browsing is not tenant-scoped.
    let public = category_service::list_categories(&state, &CallerContext::anonymous(), r2.id)
        .await?
        .data
        .unwrap_or_default();
    assert_eq!(public.len(), 1);

    Ok(())
}

#[tokio::test]
async fn orders_items_and_payments_of_other_restaurants_are_not_found() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let (r1, _admin1) = create_restaurant(&state, "east").await?;
    let (r2, admin2) = create_restaurant(&state, "west").await?;
    let table2 = create_table(&state, &admin2, r2.id, "7").await?;
    let category2 = create_category(&state, &admin2, r2.id, "Mains").await?;
    let dish2 = create_dish(&state, &admin2, category2.id, "Stew", Decimal::new(1450, 2)).await?;

    let waiter2 = create_employee(&state, "waiter2", &[Role::Waiter], r2.id).await?;
    let order = order_service::create_order(
        &state,
        &as_ctx(&waiter2),
        table2.id,
        CreateOrderRequest::default(),
    )
    .await?
    .data;
    let item = order_item_service::add_item(
        &state,
        &as_ctx(&waiter2),
        order.id,
        AddItemRequest {
            item_type: ItemKind::Dish,
            item_id: dish2.id,
            quantity: 1,
        },
    )
    .await?
    .data
    .ok_or_else(|| anyhow::anyhow!("no item"))?;
    let payment = payment_service::create_payment(
        &state,
        &as_ctx(&waiter2),
        order.id,
        CreatePaymentRequest {
            amount: Decimal::new(1450, 2),
            mode: "carte".into(),
            status: "en_attente".into(),
            order_id: None,
        },
    )
    .await?
    .data
    .ok_or_else(|| anyhow::anyhow!("no payment"))?;

    let waiter1 = create_employee(&state, "waiter1", &[Role::Waiter], r1.id).await?;
    let cashier1 = create_employee(&state, "cashier1", &[Role::Cashier], r1.id).await?;

    let err = order_service::get_order(&state, &as_ctx(&waiter1), table2.id, order.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    // Items and payments sit behind their order, so another tenant's are not found either.
    let err = order_item_service::update_item(
        &state,
        &waiter1,
        order.id,
        item.id,
        UpdateItemRequest { quantity: 5 },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    let err = order_item_service::delete_item(&state, &as_ctx(&waiter1), order.id, item.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    let err = payment_service::get_payment(&state, &cashier1, order.id, payment.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    // A client attached to no restaurant sees no tenant rows at all.
    let client_id = create_user(&state, "client", &[Role::Client]).await?;
    let client = load_caller(&state, client_id).await?;
    let err = order_service::get_order(&state, &as_ctx(&client), table2.id, order.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    let err = order_item_service::get_item(&state, &as_ctx(&client), order.id, item.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    // Visible to the caller, but the role does not allow the action.
    let cook2 = create_employee(&state, "cook2", &[Role::Cook], r2.id).await?;
    let err = payment_service::get_payment(&state, &cook2, order.id, payment.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let cashier2 = create_employee(&state, "cashier2", &[Role::Cashier], r2.id).await?;
    let err = order_item_service::update_item(
        &state,
        &cashier2,
        order.id,
        item.id,
        UpdateItemRequest { quantity: 5 },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let seen = payment_service::get_payment(&state, &cashier2, order.id, payment.id)
        .await?
        .data
        .map(|p| p.id);
    assert_eq!(seen, Some(payment.id));

    // Staff of the right restaurant get through.
    let detail = order_service::get_order(&state, &as_ctx(&waiter2), table2.id, order.id)
        .await?
        .data
        .ok_or_else(|| anyhow::anyhow!("no order"))?;
    assert_eq!(detail.items.len(), 1);
    assert_eq!(detail.payment.map(|p| p.id), Some(payment.id));

    Ok(())
}
