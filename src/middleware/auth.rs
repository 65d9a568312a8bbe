use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use sea_orm::EntityTrait;
use uuid::Uuid;

use crate::{
    authz::{Caller, CallerContext},
    dto::auth::Claims,
    entity::RevokedTokens,
    error::{AppError, AppResult},
    state::AppState,
};

/// An authenticated request: the resolved caller plus the token it presented.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub caller: Caller,
    pub claims: Claims,
}

pub fn decode_token(secret: &str, token: &str) -> AppResult<Claims> {
    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthenticated("Invalid or expired token".into()))?;
    Ok(decoded.claims)
}

fn bearer_token(headers: &HeaderMap) -> AppResult<Option<&str>> {
    let Some(auth_header) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let auth_str = auth_header
        .to_str()
        .map_err(|_| AppError::Unauthenticated("Invalid Authorization header".into()))?;

    let token = auth_str
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Unauthenticated("Invalid Authorization scheme".into()))?;
    Ok(Some(token))
}

async fn authenticate(state: &AppState, token: &str) -> AppResult<AuthUser> {
    let claims = decode_token(&state.config.jwt_secret, token)?;

    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::Unauthenticated("Invalid user id in token".into()))?;
    let jti = Uuid::parse_str(&claims.jti)
        .map_err(|_| AppError::Unauthenticated("Invalid token id".into()))?;

    if RevokedTokens::find_by_id(jti).one(&state.orm).await?.is_some() {
        return Err(AppError::Unauthenticated("Token has been revoked".into()));
    }

    let caller = match Caller::load(&state.orm, user_id).await? {
        Some(c) => c,
        None => return Err(AppError::unauthenticated()),
    };

    Ok(AuthUser { caller, claims })
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }
        let token = bearer_token(&parts.headers)?.ok_or_else(AppError::unauthenticated)?;
        let user = authenticate(state, token).await?;
        parts.extensions.insert(user.clone());
        Ok(user)
    }
}

/// Optional authentication: no `Authorization` header means an anonymous
/// caller, a bad one is still rejected with 401.
impl FromRequestParts<AppState> for CallerContext {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if bearer_token(&parts.headers)?.is_none() {
            return Ok(CallerContext::anonymous());
        }

        let user = AuthUser::from_request_parts(parts, state).await?;
        Ok(CallerContext::authenticated(user.caller))
    }
}
