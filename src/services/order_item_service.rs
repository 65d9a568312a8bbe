//! Line items and the order total they drive.
//!
//! Every mutation of an order's items runs in one transaction that also
//! rewrites `orders.total`, so the total always equals the sum of
//! `unit_price * quantity` over the current items.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait, sea_query::LockType,
};
use uuid::Uuid;

use crate::{
    authz::{Action, Caller, CallerContext, OrderPolicy, Policy, Visibility},
    dto::{
        order_items::{AddItemRequest, UpdateItemRequest},
        storable,
    },
    entity::{
        categories::Entity as Categories,
        dishes::Entity as Dishes,
        drinks::Entity as Drinks,
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems, ItemKind,
            Model as OrderItemModel,
        },
        orders::{ActiveModel as OrderActive, Entity as Orders, Model as OrderModel},
    },
    error::{AppError, AppResult},
    models::OrderItem,
    response::ApiResponse,
    services::order_service::{find_order, order_tenancy},
    state::AppState,
};

/// A catalog entry that can be put on an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemRef {
    Dish(Uuid),
    Drink(Uuid),
}

impl ItemRef {
    pub fn new(kind: ItemKind, id: Uuid) -> Self {
        match kind {
            ItemKind::Dish => ItemRef::Dish(id),
            ItemKind::Drink => ItemRef::Drink(id),
        }
    }

    pub fn kind(&self) -> ItemKind {
        match self {
            ItemRef::Dish(_) => ItemKind::Dish,
            ItemRef::Drink(_) => ItemKind::Drink,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            ItemRef::Dish(id) | ItemRef::Drink(id) => *id,
        }
    }
}

/// Current price of a catalog entry and the restaurant selling it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedItem {
    pub price: Decimal,
    pub restaurant_id: Uuid,
}

/// Look up an item through the caller's visibility. Missing or invisible
/// entries are `NotFound`.
pub async fn resolve_item<C: ConnectionTrait>(
    conn: &C,
    visibility: &Visibility,
    item: ItemRef,
) -> AppResult<ResolvedItem> {
    match item {
        ItemRef::Drink(id) => {
            let drink = visibility
                .scope(Drinks::find_by_id(id))
                .one(conn)
                .await?
                .ok_or(AppError::NotFound)?;
            Ok(ResolvedItem {
                price: drink.price,
                restaurant_id: drink.restaurant_id,
            })
        }
        ItemRef::Dish(id) => {
            let dish = visibility
                .scope(Dishes::find_by_id(id))
                .one(conn)
                .await?
                .ok_or(AppError::NotFound)?;
            let category = Categories::find_by_id(dish.category_id)
                .one(conn)
                .await?
                .ok_or(AppError::NotFound)?;
            Ok(ResolvedItem {
                price: dish.price,
                restaurant_id: category.restaurant_id,
            })
        }
    }
}

/// Sum of `unit_price * quantity`, in cents precision.
pub fn total_of<I>(lines: I) -> Decimal
where
    I: IntoIterator<Item = (Decimal, i32)>,
{
    lines
        .into_iter()
        .map(|(unit_price, quantity)| unit_price * Decimal::from(quantity))
        .sum::<Decimal>()
        .round_dp(2)
}

/// Rewrite the stored total of `order_id` from its current items. A total
/// that does not fit the column fails validation and the caller's
/// transaction is dropped.
pub async fn recompute_total<C: ConnectionTrait>(conn: &C, order_id: Uuid) -> AppResult<Decimal> {
    let lines: Vec<(Decimal, i32)> = OrderItems::find()
        .select_only()
        .column(OrderItemCol::UnitPrice)
        .column(OrderItemCol::Quantity)
        .filter(OrderItemCol::OrderId.eq(order_id))
        .into_tuple()
        .all(conn)
        .await?;
    let total = storable(total_of(lines), "total")?;

    OrderActive {
        id: Set(order_id),
        total: Set(total),
        updated_at: Set(Utc::now().into()),
        ..Default::default()
    }
    .update(conn)
    .await?;

    Ok(total)
}

pub async fn add_item(
    state: &AppState,
    ctx: &CallerContext,
    order_id: Uuid,
    payload: AddItemRequest,
) -> AppResult<ApiResponse<OrderItem>> {
    let quantity = valid_quantity(payload.quantity)?;
    let visibility = ctx.visibility();
    let order = find_order(&state.orm, &visibility, None, order_id).await?;
    let order_restaurant = order_tenancy(&state.orm, &order).await?.restaurant_id;

    let item_ref = ItemRef::new(payload.item_type, payload.item_id);
    let resolved = resolve_item(&state.orm, &visibility, item_ref).await?;
    if resolved.restaurant_id != order_restaurant {
        tracing::debug!(
            order_id = %order.id,
            item_id = %item_ref.id(),
            "item from another restaurant rejected"
        );
        return Err(AppError::Forbidden(
            "The item does not belong to the order's restaurant.".into(),
        ));
    }
    line_amount(resolved.price, quantity)?;

    let txn = state.orm.begin().await?;
    lock_order(&txn, order.id).await?;
    // The catalog price is copied here and never re-read.
    let item = OrderItemActive {
        id: Set(Uuid::new_v4()),
        order_id: Set(order.id),
        item_type: Set(item_ref.kind()),
        item_id: Set(item_ref.id()),
        quantity: Set(quantity),
        unit_price: Set(resolved.price),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;
    let total = recompute_total(&txn, order.id).await?;
    txn.commit().await?;

    tracing::debug!(order_id = %order.id, item_id = %item.id, total = %total, "item added");
    Ok(ApiResponse::success(order_item_from_entity(item)))
}

pub async fn list_items(
    state: &AppState,
    ctx: &CallerContext,
    order_id: Uuid,
) -> AppResult<ApiResponse<Vec<OrderItem>>> {
    let order = find_order(&state.orm, &ctx.visibility(), None, order_id).await?;
    if let Some(caller) = ctx.user() {
        let target = order_tenancy(&state.orm, &order).await?;
        OrderPolicy::authorize(caller, Action::View, &target)?;
    }

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .order_by_asc(OrderItemCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_item_from_entity)
        .collect();

    Ok(ApiResponse::success(items))
}

pub async fn get_item(
    state: &AppState,
    ctx: &CallerContext,
    order_id: Uuid,
    id: Uuid,
) -> AppResult<ApiResponse<OrderItem>> {
    let order = find_order(&state.orm, &ctx.visibility(), None, order_id).await?;
    let item = find_item(&state.orm, order.id, id).await?;
    if let Some(caller) = ctx.user() {
        authorize_on_order(&state.orm, caller, Action::View, &order).await?;
    }
    Ok(ApiResponse::success(order_item_from_entity(item)))
}

pub async fn update_item(
    state: &AppState,
    caller: &Caller,
    order_id: Uuid,
    id: Uuid,
    payload: UpdateItemRequest,
) -> AppResult<ApiResponse<OrderItem>> {
    let visibility = Visibility::for_caller(Some(caller));
    let order = find_order(&state.orm, &visibility, None, order_id).await?;
    let item = find_item(&state.orm, order.id, id).await?;
    authorize_on_order(&state.orm, caller, Action::Update, &order).await?;
    let quantity = valid_quantity(payload.quantity)?;
    line_amount(item.unit_price, quantity)?;

    let txn = state.orm.begin().await?;
    lock_order(&txn, item.order_id).await?;
    let mut active: OrderItemActive = item.into();
    active.quantity = Set(quantity);
    let item = active.update(&txn).await?;
    recompute_total(&txn, item.order_id).await?;
    txn.commit().await?;

    Ok(ApiResponse::success(order_item_from_entity(item)))
}

pub async fn delete_item(
    state: &AppState,
    ctx: &CallerContext,
    order_id: Uuid,
    id: Uuid,
) -> AppResult<ApiResponse<()>> {
    let order = find_order(&state.orm, &ctx.visibility(), None, order_id).await?;
    let item = find_item(&state.orm, order.id, id).await?;
    if let Some(caller) = ctx.user() {
        // Removing an item is an update of its order.
        authorize_on_order(&state.orm, caller, Action::Update, &order).await?;
    }

    let txn = state.orm.begin().await?;
    lock_order(&txn, item.order_id).await?;
    OrderItems::delete_by_id(item.id).exec(&txn).await?;
    recompute_total(&txn, item.order_id).await?;
    txn.commit().await?;

    Ok(ApiResponse::message("Item deleted"))
}

/// Item of an order that already passed the visibility filter.
async fn find_item<C: ConnectionTrait>(
    conn: &C,
    order_id: Uuid,
    id: Uuid,
) -> AppResult<OrderItemModel> {
    let item = OrderItems::find_by_id(id)
        .filter(OrderItemCol::OrderId.eq(order_id))
        .one(conn)
        .await?;
    match item {
        Some(i) => Ok(i),
        None => Err(AppError::NotFound),
    }
}

async fn authorize_on_order<C: ConnectionTrait>(
    conn: &C,
    caller: &Caller,
    action: Action,
    order: &OrderModel,
) -> AppResult<()> {
    let target = order_tenancy(conn, order).await?;
    OrderPolicy::authorize(caller, action, &target)
}

async fn lock_order<C: ConnectionTrait>(conn: &C, order_id: Uuid) -> AppResult<OrderModel> {
    Orders::find_by_id(order_id)
        .lock(LockType::Update)
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)
}

/// `unit_price * quantity`, rejected when it would not fit a stored amount.
fn line_amount(unit_price: Decimal, quantity: i32) -> AppResult<Decimal> {
    storable(unit_price * Decimal::from(quantity), "quantite")
}

fn valid_quantity(quantity: i32) -> AppResult<i32> {
    if quantity < 1 {
        return Err(AppError::validation("The quantite field must be at least 1."));
    }
    Ok(quantity)
}

pub(crate) fn order_item_from_entity(model: OrderItemModel) -> OrderItem {
    OrderItem {
        id: model.id,
        order_id: model.order_id,
        item_type: model.item_type,
        item_id: model.item_id,
        quantity: model.quantity,
        unit_price: model.unit_price,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn total_is_sum_of_price_times_quantity() {
        let total = total_of([(dec("12.50"), 2), (dec("3.20"), 3), (dec("0.99"), 1)]);
        assert_eq!(total, dec("35.59"));
    }

    #[test]
    fn empty_order_totals_zero() {
        assert_eq!(total_of(Vec::new()), Decimal::ZERO);
    }

    #[test]
    fn total_keeps_cent_precision() {
        // Float arithmetic would drift here.
        let total = total_of(std::iter::repeat_n((dec("0.10"), 1), 3));
        assert_eq!(total, dec("0.30"));
    }

    #[test]
    fn line_amount_must_fit_a_stored_amount() {
        assert_eq!(line_amount(dec("99.00"), 3).unwrap(), dec("297.00"));
        assert!(matches!(
            line_amount(dec("99.00"), 2_000_000),
            Err(AppError::Validation(_))
        ));
        assert!(line_amount(dec("99999999.99"), 1).is_ok());
        assert!(line_amount(dec("50000000.00"), 2).is_err());
    }

    #[test]
    fn item_ref_maps_to_storage_tag() {
        let id = Uuid::new_v4();
        let dish = ItemRef::new(ItemKind::Dish, id);
        assert_eq!(dish, ItemRef::Dish(id));
        assert_eq!(dish.kind(), ItemKind::Dish);
        assert_eq!(ItemRef::Drink(id).kind(), ItemKind::Drink);
        assert_eq!(ItemRef::Drink(id).id(), id);
    }

    #[test]
    fn quantity_must_be_positive() {
        assert!(valid_quantity(0).is_err());
        assert!(valid_quantity(-3).is_err());
        assert_eq!(valid_quantity(4).unwrap(), 4);
    }
}
