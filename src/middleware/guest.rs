use axum::{
    extract::{RawPathParams, Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::{
    authz::guest::{self, ORDER_PARAM, ORDER_TOKEN_HEADER},
    error::AppError,
    state::AppState,
};

/// Gate for the guest-accessible order routes.
///
/// Requests carrying an `Authorization` header skip the gate and are checked
/// by the tenant filter and the policies in the handler instead.
pub async fn require_order_token(
    State(state): State<AppState>,
    params: RawPathParams,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if request.headers().contains_key(header::AUTHORIZATION) {
        return Ok(next.run(request).await);
    }

    let token = request
        .headers()
        .get(ORDER_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok());
    let order_param = params
        .iter()
        .find(|(name, _)| *name == ORDER_PARAM)
        .map(|(_, value)| value);

    let (token, order_id) = guest::precheck(token, order_param).inspect_err(|err| {
        tracing::debug!(error = %err, path = %request.uri().path(), "guest gate rejected request");
    })?;
    guest::verify(&state.orm, token, order_id).await?;

    Ok(next.run(request).await)
}
