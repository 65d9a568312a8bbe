mod common;

use restaurant_ordering_api::{
    authz::Role,
    dto::restaurants::{CreateRestaurantRequest, TransferOwnershipRequest},
    entity::Restaurants,
    error::AppError,
    services::{
        restaurant_service::{self, apply_transfer},
        role_service::has_role,
    },
};
use sea_orm::{EntityTrait, TransactionTrait};
use uuid::Uuid;

use common::{create_restaurant, create_user, load_caller, setup_state};

#[tokio::test]
async fn transfer_moves_admin_role_to_new_owner() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let (restaurant, owner) = create_restaurant(&state, "harbour").await?;
    assert!(owner.has_role(Role::RestaurantAdmin));
    assert_eq!(owner.restaurant_id, Some(restaurant.id));

    let successor_id = create_user(&state, "successor", &[Role::Client]).await?;

    // Only the registered owner may hand the restaurant over.
    let outsider = load_caller(&state, create_user(&state, "outsider", &[]).await?).await?;
    let err = restaurant_service::transfer_ownership(
        &state,
        &outsider,
        restaurant.id,
        TransferOwnershipRequest {
            new_owner_id: successor_id,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let moved = restaurant_service::transfer_ownership(
        &state,
        &owner,
        restaurant.id,
        TransferOwnershipRequest {
            new_owner_id: successor_id,
        },
    )
    .await?
    .data
    .ok_or_else(|| anyhow::anyhow!("no restaurant"))?;
    assert_eq!(moved.owner_id, successor_id);

    let successor = load_caller(&state, successor_id).await?;
    assert!(successor.has_role(Role::RestaurantAdmin));
    assert!(successor.has_role(Role::Client));
    assert_eq!(successor.restaurant_id, Some(restaurant.id));
    assert!(!has_role(&state.orm, owner.id, Role::RestaurantAdmin).await?);

    Ok(())
}

#[tokio::test]
async fn previous_owner_keeps_admin_while_owning_another_restaurant() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let (first, owner) = create_restaurant(&state, "first").await?;
    restaurant_service::create_restaurant(
        &state,
        &owner,
        CreateRestaurantRequest {
            name: "second".into(),
            address: None,
            phone: None,
            owner_id: None,
        },
    )
    .await?;
    let owner = load_caller(&state, owner.id).await?;
    let successor_id = create_user(&state, "heir", &[]).await?;

    restaurant_service::transfer_ownership(
        &state,
        &owner,
        first.id,
        TransferOwnershipRequest {
            new_owner_id: successor_id,
        },
    )
    .await?;

    assert!(has_role(&state.orm, owner.id, Role::RestaurantAdmin).await?);
    assert!(has_role(&state.orm, successor_id, Role::RestaurantAdmin).await?);
    Ok(())
}

#[tokio::test]
async fn failed_or_rolled_back_transfer_changes_nothing() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let (restaurant, owner) = create_restaurant(&state, "lighthouse").await?;

    let err = restaurant_service::transfer_ownership(
        &state,
        &owner,
        restaurant.id,
        TransferOwnershipRequest {
            new_owner_id: Uuid::new_v4(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // Every write of the workflow is undone when the transaction is not committed.
    let successor_id = create_user(&state, "almost", &[]).await?;
    let txn = state.orm.begin().await?;
    let model = Restaurants::find_by_id(restaurant.id)
        .one(&txn)
        .await?
        .ok_or_else(|| anyhow::anyhow!("restaurant vanished"))?;
    apply_transfer(&txn, model, successor_id).await?;
    txn.rollback().await?;

    let stored = Restaurants::find_by_id(restaurant.id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| anyhow::anyhow!("restaurant vanished"))?;
    assert_eq!(stored.owner_id, owner.id);
    assert!(has_role(&state.orm, owner.id, Role::RestaurantAdmin).await?);
    assert!(!has_role(&state.orm, successor_id, Role::RestaurantAdmin).await?);
    let successor = load_caller(&state, successor_id).await?;
    assert_eq!(successor.restaurant_id, None);

    Ok(())
}
