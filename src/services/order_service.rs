use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    authz::{Action, Caller, CallerContext, OrderPolicy, Policy, Tenancy, Visibility, guest},
    dto::{
        orders::{CreateOrderRequest, OrderCreatedResponse, OrderDetail, UpdateOrderRequest},
        required_text,
    },
    entity::{
        dining_tables::Entity as DiningTables,
        order_items::{Column as OrderItemCol, Entity as OrderItems},
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
        payments::{Column as PaymentCol, Entity as Payments},
    },
    error::{AppError, AppResult},
    models::Order,
    response::ApiResponse,
    services::{
        order_item_service::order_item_from_entity,
        payment_service::payment_from_entity,
        restaurant_service::tenancy,
        table_service::find_table,
    },
    state::AppState,
};

pub const DEFAULT_STATUS: &str = "en_attente";

pub async fn list_orders(
    state: &AppState,
    caller: &Caller,
    table_id: Uuid,
) -> AppResult<ApiResponse<Vec<Order>>> {
    let visibility = Visibility::for_caller(Some(caller));
    let table = find_table(&state.orm, &visibility, None, table_id).await?;
    let parent = tenancy(&state.orm, table.restaurant_id).await?;
    OrderPolicy::authorize_collection(caller, Action::ViewAny, &parent)?;

    let orders = visibility
        .scope(Orders::find())
        .filter(OrderCol::TableId.eq(table.id))
        .order_by_desc(OrderCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect();

    Ok(ApiResponse::success(orders))
}

/// Open an order on a table. Anonymous callers get a guest token bound to it.
pub async fn create_order(
    state: &AppState,
    ctx: &CallerContext,
    table_id: Uuid,
    payload: CreateOrderRequest,
) -> AppResult<OrderCreatedResponse> {
    if payload.table_id.is_some_and(|id| id != table_id) {
        return Err(AppError::BadRequest(
            "The table_id in the request body does not match the URL.".into(),
        ));
    }

    let visibility = ctx.visibility();
    let table = find_table(&state.orm, &visibility, None, table_id).await?;
    if let Some(caller) = ctx.user() {
        let parent = tenancy(&state.orm, table.restaurant_id).await?;
        OrderPolicy::authorize_collection(caller, Action::Create, &parent)?;
    }

    let status = match payload.status {
        Some(s) => required_text(&s, "statut")?,
        None => DEFAULT_STATUS.to_string(),
    };

    let txn = state.orm.begin().await?;
    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        table_id: Set(table.id),
        status: Set(status),
        total: Set(Decimal::ZERO),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let token = match ctx.user() {
        Some(_) => None,
        None => Some(guest::open_session(&txn, order.id).await?),
    };
    txn.commit().await?;

    tracing::info!(
        order_id = %order.id,
        table_id = %table.id,
        guest = token.is_some(),
        "order created"
    );
    Ok(OrderCreatedResponse {
        success: true,
        data: order_from_entity(order),
        token,
    })
}

/// The order with its line items and payment.
pub async fn get_order(
    state: &AppState,
    ctx: &CallerContext,
    table_id: Uuid,
    id: Uuid,
) -> AppResult<ApiResponse<OrderDetail>> {
    let order = find_order(&state.orm, &ctx.visibility(), Some(table_id), id).await?;
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

    let payment = Payments::find()
        .filter(PaymentCol::OrderId.eq(order.id))
        .one(&state.orm)
        .await?
        .map(payment_from_entity);

    Ok(ApiResponse::success(OrderDetail {
        order: order_from_entity(order),
        items,
        payment,
    }))
}

pub async fn update_order(
    state: &AppState,
    caller: &Caller,
    table_id: Uuid,
    id: Uuid,
    payload: UpdateOrderRequest,
) -> AppResult<ApiResponse<Order>> {
    let visibility = Visibility::for_caller(Some(caller));
    let order = find_order(&state.orm, &visibility, Some(table_id), id).await?;
    let target = order_tenancy(&state.orm, &order).await?;
    OrderPolicy::authorize(caller, Action::Update, &target)?;

    let mut active: OrderActive = order.into();
    active.status = Set(required_text(&payload.status, "statut")?);
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&state.orm).await?;

    tracing::info!(order_id = %order.id, status = %order.status, updated_by = %caller.id, "order updated");
    Ok(ApiResponse::success(order_from_entity(order)))
}

/// Deleting an order takes its items, payment and guest sessions with it.
pub async fn delete_order(
    state: &AppState,
    caller: &Caller,
    table_id: Uuid,
    id: Uuid,
) -> AppResult<ApiResponse<()>> {
    let visibility = Visibility::for_caller(Some(caller));
    let order = find_order(&state.orm, &visibility, Some(table_id), id).await?;
    let target = order_tenancy(&state.orm, &order).await?;
    OrderPolicy::authorize(caller, Action::Delete, &target)?;

    Orders::delete_by_id(order.id).exec(&state.orm).await?;
    tracing::info!(order_id = %id, deleted_by = %caller.id, "order deleted");
    Ok(ApiResponse::message("Order deleted"))
}

/// Tenant-filtered order lookup, optionally pinned to the table in the path.
pub(crate) async fn find_order<C: ConnectionTrait>(
    conn: &C,
    visibility: &Visibility,
    table_id: Option<Uuid>,
    id: Uuid,
) -> AppResult<OrderModel> {
    let mut finder = visibility.scope(Orders::find_by_id(id));
    if let Some(table_id) = table_id {
        finder = finder.filter(OrderCol::TableId.eq(table_id));
    }
    let order = finder.one(conn).await?;
    match order {
        Some(o) => Ok(o),
        None => Err(AppError::NotFound),
    }
}

/// Restaurant of an order, reached through its table.
pub(crate) async fn order_tenancy<C: ConnectionTrait>(
    conn: &C,
    order: &OrderModel,
) -> AppResult<Tenancy> {
    let table = DiningTables::find_by_id(order.table_id)
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)?;
    tenancy(conn, table.restaurant_id).await
}

pub(crate) fn order_from_entity(model: OrderModel) -> Order {
    Order {
        id: model.id,
        table_id: model.table_id,
        status: model.status,
        total: model.total,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
