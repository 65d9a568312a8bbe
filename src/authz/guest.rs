//! Guest order sessions: an anonymous table customer's capability on one order.

use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait,
    PaginatorTrait, QueryFilter, Set,
};
use uuid::Uuid;

use crate::{
    entity::guest_sessions::{
        ActiveModel as SessionActive, Column as SessionCol, Entity as GuestSessions,
    },
    error::{AppError, AppResult},
};

pub const ORDER_TOKEN_HEADER: &str = "x-order-token";

/// Route parameter carrying the order id on guest-accessible routes.
pub const ORDER_PARAM: &str = "commande";

/// Validate the gate inputs before touching storage.
///
/// A missing token is the caller's fault (403) and is reported before a
/// missing order id, which means the gate was wired onto a route without one (400).
pub fn precheck<'a>(
    token: Option<&'a str>,
    order_param: Option<&str>,
) -> AppResult<(&'a str, Uuid)> {
    let token = match token.map(str::trim).filter(|t| !t.is_empty()) {
        Some(t) => t,
        None => return Err(AppError::Forbidden("Missing order token".into())),
    };
    let order_param = match order_param {
        Some(p) => p,
        None => return Err(AppError::BadRequest("No order in request context".into())),
    };
    // An order id that is not a uuid cannot have a session.
    let order_id = Uuid::parse_str(order_param).map_err(|_| invalid_token())?;
    Ok((token, order_id))
}

fn invalid_token() -> AppError {
    AppError::Forbidden("Invalid order token".into())
}

/// Bind a fresh token to `order_id` and return it.
pub async fn open_session<C: ConnectionTrait>(conn: &C, order_id: Uuid) -> AppResult<String> {
    let token = Uuid::new_v4().to_string();
    SessionActive {
        id: Set(Uuid::new_v4()),
        order_id: Set(order_id),
        token: Set(token.clone()),
        created_at: NotSet,
    }
    .insert(conn)
    .await?;
    Ok(token)
}

pub async fn session_exists<C: ConnectionTrait>(
    conn: &C,
    token: &str,
    order_id: Uuid,
) -> AppResult<bool> {
    let count = GuestSessions::find()
        .filter(SessionCol::Token.eq(token))
        .filter(SessionCol::OrderId.eq(order_id))
        .count(conn)
        .await?;
    Ok(count > 0)
}

/// Fail with `Forbidden` unless `token` is bound to exactly `order_id`.
pub async fn verify<C: ConnectionTrait>(conn: &C, token: &str, order_id: Uuid) -> AppResult<()> {
    if session_exists(conn, token, order_id).await? {
        Ok(())
    } else {
        tracing::warn!(order_id = %order_id, "guest token does not match order");
        Err(invalid_token())
    }
}

/// Drop every guest session of an order. Returns how many were removed.
pub async fn revoke_sessions<C: ConnectionTrait>(conn: &C, order_id: Uuid) -> AppResult<u64> {
    let res = GuestSessions::delete_many()
        .filter(SessionCol::OrderId.eq(order_id))
        .exec(conn)
        .await?;
    if res.rows_affected > 0 {
        tracing::info!(order_id = %order_id, revoked = res.rows_affected, "guest sessions revoked");
    }
    Ok(res.rows_affected)
}
