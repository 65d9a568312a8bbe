use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait,
    PaginatorTrait, QueryFilter, QuerySelect, Set, TransactionTrait, sea_query::LockType,
};
use uuid::Uuid;

use crate::{
    authz::{Action, Caller, CallerContext, PaymentPolicy, Policy, Visibility, guest},
    dto::{
        money,
        payments::{CreatePaymentRequest, UpdatePaymentRequest},
        required_text,
    },
    entity::{
        orders::{Entity as Orders, Model as OrderModel},
        payments::{
            ActiveModel as PaymentActive, Column as PaymentCol, Entity as Payments,
            Model as PaymentModel,
        },
    },
    error::{AppError, AppResult},
    models::Payment,
    response::ApiResponse,
    services::order_service::{find_order, order_tenancy},
    state::AppState,
};

/// Payment status that settles an order and ends its guest sessions.
pub const VALIDATED_STATUS: &str = "valide";

/// The order's payment, if any.
pub async fn list_payments(
    state: &AppState,
    caller: &Caller,
    order_id: Uuid,
) -> AppResult<ApiResponse<Option<Payment>>> {
    let visibility = Visibility::for_caller(Some(caller));
    let order = find_order(&state.orm, &visibility, None, order_id).await?;
    let parent = order_tenancy(&state.orm, &order).await?;
    PaymentPolicy::authorize_collection(caller, Action::ViewAny, &parent)?;

    let payment = Payments::find()
        .filter(PaymentCol::OrderId.eq(order.id))
        .one(&state.orm)
        .await?
        .map(payment_from_entity);

    Ok(ApiResponse::success(payment))
}

/// Record the single payment of an order.
pub async fn create_payment(
    state: &AppState,
    ctx: &CallerContext,
    order_id: Uuid,
    payload: CreatePaymentRequest,
) -> AppResult<ApiResponse<Payment>> {
    if payload.order_id.is_some_and(|id| id != order_id) {
        return Err(AppError::BadRequest(
            "The commande_id in the request body does not match the URL.".into(),
        ));
    }
    let amount = money(payload.amount, "montant")?;
    let mode = required_text(&payload.mode, "mode")?;
    let status = required_text(&payload.status, "statut")?;

    let txn = state.orm.begin().await?;

    // Row lock on the order serializes concurrent payment attempts.
    let order = ctx
        .visibility()
        .scope(Orders::find_by_id(order_id))
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };
    if let Some(caller) = ctx.user() {
        let parent = order_tenancy(&txn, &order).await?;
        PaymentPolicy::authorize_collection(caller, Action::Create, &parent)?;
    }

    let existing = Payments::find()
        .filter(PaymentCol::OrderId.eq(order.id))
        .count(&txn)
        .await?;
    if existing > 0 {
        return Err(AppError::Conflict("Order already paid".into()));
    }

    let payment = PaymentActive {
        id: Set(Uuid::new_v4()),
        order_id: Set(order.id),
        amount: Set(amount),
        mode: Set(mode),
        status: Set(status),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;
    if payment.status == VALIDATED_STATUS {
        guest::revoke_sessions(&txn, order.id).await?;
    }
    txn.commit().await?;

    tracing::info!(
        payment_id = %payment.id,
        order_id = %order.id,
        amount = %payment.amount,
        "payment recorded"
    );
    Ok(ApiResponse::success(payment_from_entity(payment)))
}

pub async fn get_payment(
    state: &AppState,
    caller: &Caller,
    order_id: Uuid,
    id: Uuid,
) -> AppResult<ApiResponse<Payment>> {
    let (order, payment) = find_payment(&state.orm, caller, order_id, id).await?;
    authorize_on_payment(&state.orm, caller, Action::View, &order).await?;
    Ok(ApiResponse::success(payment_from_entity(payment)))
}

/// Moving a payment to `valide` revokes the order's guest tokens.
pub async fn update_payment(
    state: &AppState,
    caller: &Caller,
    order_id: Uuid,
    id: Uuid,
    payload: UpdatePaymentRequest,
) -> AppResult<ApiResponse<Payment>> {
    let (order, payment) = find_payment(&state.orm, caller, order_id, id).await?;
    authorize_on_payment(&state.orm, caller, Action::Update, &order).await?;

    let mut active: PaymentActive = payment.into();
    if let Some(amount) = payload.amount {
        active.amount = Set(money(amount, "montant")?);
    }
    if let Some(mode) = payload.mode {
        active.mode = Set(required_text(&mode, "mode")?);
    }
    if let Some(status) = payload.status {
        active.status = Set(required_text(&status, "statut")?);
    }
    active.updated_at = Set(Utc::now().into());

    let txn = state.orm.begin().await?;
    let payment = active.update(&txn).await?;
    if payment.status == VALIDATED_STATUS {
        guest::revoke_sessions(&txn, payment.order_id).await?;
    }
    txn.commit().await?;

    tracing::info!(
        payment_id = %payment.id,
        status = %payment.status,
        updated_by = %caller.id,
        "payment updated"
    );
    Ok(ApiResponse::success(payment_from_entity(payment)))
}

pub async fn delete_payment(
    state: &AppState,
    caller: &Caller,
    order_id: Uuid,
    id: Uuid,
) -> AppResult<ApiResponse<()>> {
    let (order, payment) = find_payment(&state.orm, caller, order_id, id).await?;
    authorize_on_payment(&state.orm, caller, Action::Delete, &order).await?;

    Payments::delete_by_id(payment.id).exec(&state.orm).await?;
    Ok(ApiResponse::message("Payment deleted"))
}

/// The payment `id` of the path order, which must be visible to the caller.
async fn find_payment<C: ConnectionTrait>(
    conn: &C,
    caller: &Caller,
    order_id: Uuid,
    id: Uuid,
) -> AppResult<(OrderModel, PaymentModel)> {
    let visibility = Visibility::for_caller(Some(caller));
    let order = find_order(conn, &visibility, None, order_id).await?;
    let payment = Payments::find_by_id(id)
        .filter(PaymentCol::OrderId.eq(order.id))
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok((order, payment))
}

/// Payments are checked against the restaurant of their order's table.
async fn authorize_on_payment<C: ConnectionTrait>(
    conn: &C,
    caller: &Caller,
    action: Action,
    order: &OrderModel,
) -> AppResult<()> {
    let target = order_tenancy(conn, order).await?;
    PaymentPolicy::authorize(caller, action, &target)
}

pub(crate) fn payment_from_entity(model: PaymentModel) -> Payment {
    Payment {
        id: model.id,
        order_id: model.order_id,
        amount: model.amount,
        mode: model.mode,
        status: model.status,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
