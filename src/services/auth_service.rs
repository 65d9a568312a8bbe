use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use uuid::Uuid;

use crate::{
    authz::{Caller, Role},
    config::AppConfig,
    dto::{
        auth::{AuthTokenResponse, Claims, LoginRequest, RegisterRequest},
        required_text,
    },
    entity::{
        revoked_tokens::ActiveModel as RevokedActive,
        users::{ActiveModel as UserActive, Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::UserProfile,
    response::ApiResponse,
    services::role_service::grant_role,
    state::AppState,
};

const MIN_PASSWORD_LEN: usize = 8;

pub async fn register_user(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<AuthTokenResponse>> {
    let name = required_text(&payload.name, "nom")?;
    let email = required_text(&payload.email, "email")?.to_lowercase();
    if !email.contains('@') {
        return Err(AppError::validation("The email field must be a valid email address."));
    }
    if payload.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "The password field must be at least {MIN_PASSWORD_LEN} characters."
        )));
    }

    let exist = Users::find()
        .filter(UserCol::Email.eq(email.as_str()))
        .one(&state.orm)
        .await?;
    if exist.is_some() {
        return Err(AppError::Conflict("Email is already taken".into()));
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(payload.password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();

    let txn = state.orm.begin().await?;
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        email: Set(email),
        password_hash: Set(password_hash),
        restaurant_id: Set(None),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;
    grant_role(&txn, user.id, Role::Client).await?;
    txn.commit().await?;

    tracing::info!(user_id = %user.id, "user registered");
    let resp = token_response(state, user.id).await?;
    Ok(ApiResponse::with_message("User created", resp))
}

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<AuthTokenResponse>> {
    let LoginRequest { email, password } = payload;
    let user = Users::find()
        .filter(UserCol::Email.eq(email.trim().to_lowercase()))
        .one(&state.orm)
        .await?;
    let user = match user {
        Some(u) => u,
        None => return Err(invalid_credentials()),
    };

    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    if Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(invalid_credentials());
    }

    let resp = token_response(state, user.id).await?;
    Ok(ApiResponse::with_message("Logged in", resp))
}

/// Revoke the presented token until it would have expired anyway.
pub async fn logout_user(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<()>> {
    let jti = Uuid::parse_str(&user.claims.jti).map_err(|_| AppError::unauthenticated())?;
    let expires_at = DateTime::<Utc>::from_timestamp(user.claims.exp as i64, 0)
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Invalid token expiry")))?;

    RevokedActive {
        jti: Set(jti),
        expires_at: Set(expires_at.into()),
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(user_id = %user.caller.id, "user logged out");
    Ok(ApiResponse::message("Logged out"))
}

pub fn current_user(user: &AuthUser) -> ApiResponse<UserProfile> {
    ApiResponse::success(profile_from_caller(&user.caller))
}

pub fn issue_token(config: &AppConfig, user_id: Uuid) -> AppResult<String> {
    let now = Utc::now();
    let expiration = now
        .checked_add_signed(Duration::hours(config.jwt_ttl_hours))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user_id.to_string(),
        jti: Uuid::new_v4().to_string(),
        iat: now.timestamp() as usize,
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

pub fn profile_from_caller(caller: &Caller) -> UserProfile {
    UserProfile {
        id: caller.id,
        name: caller.name.clone(),
        email: caller.email.clone(),
        roles: caller.roles.to_vec(),
        restaurant_id: caller.restaurant_id,
        owned_restaurant_ids: caller.owned_restaurant_ids.clone(),
    }
}

async fn token_response(state: &AppState, user_id: Uuid) -> AppResult<AuthTokenResponse> {
    let caller = match Caller::load(&state.orm, user_id).await? {
        Some(c) => c,
        None => return Err(AppError::NotFound),
    };
    Ok(AuthTokenResponse {
        token: issue_token(&state.config, user_id)?,
        token_type: "Bearer".into(),
        user: profile_from_caller(&caller),
    })
}

fn invalid_credentials() -> AppError {
    AppError::Unauthenticated("Invalid email or password".into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::auth::decode_token;

    fn config() -> AppConfig {
        AppConfig {
            database_url: "postgres://localhost/unused".into(),
            host: "127.0.0.1".into(),
            port: 3000,
            jwt_secret: "test-secret".into(),
            jwt_ttl_hours: 2,
        }
    }

    #[test]
    fn issued_tokens_carry_identity_but_no_roles() {
        let user_id = Uuid::new_v4();
        let token = issue_token(&config(), user_id).unwrap();
        let claims = decode_token("test-secret", &token).unwrap();

        assert_eq!(claims.sub, user_id.to_string());
        assert!(Uuid::parse_str(&claims.jti).is_ok());
        assert_eq!(claims.exp - claims.iat, 2 * 3600);
    }

    #[test]
    fn every_token_gets_its_own_id() {
        let cfg = config();
        let user_id = Uuid::new_v4();
        let a = decode_token("test-secret", &issue_token(&cfg, user_id).unwrap()).unwrap();
        let b = decode_token("test-secret", &issue_token(&cfg, user_id).unwrap()).unwrap();
        assert_ne!(a.jti, b.jti);
    }
}
