use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, Set,
};
use uuid::Uuid;

use crate::{
    authz::Role,
    entity::user_roles::{ActiveModel as UserRoleActive, Column as UserRoleCol, Entity as UserRoles},
    error::AppResult,
};

pub async fn has_role<C: ConnectionTrait>(conn: &C, user_id: Uuid, role: Role) -> AppResult<bool> {
    let count = UserRoles::find()
        .filter(UserRoleCol::UserId.eq(user_id))
        .filter(UserRoleCol::Role.eq(role))
        .count(conn)
        .await?;
    Ok(count > 0)
}

/// Grant `role` unless the user already holds it.
pub async fn grant_role<C: ConnectionTrait>(conn: &C, user_id: Uuid, role: Role) -> AppResult<()> {
    if has_role(conn, user_id, role).await? {
        return Ok(());
    }
    UserRoleActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        role: Set(role),
    }
    .insert(conn)
    .await?;
    tracing::debug!(user_id = %user_id, role = %role, "role granted");
    Ok(())
}

pub async fn revoke_role<C: ConnectionTrait>(conn: &C, user_id: Uuid, role: Role) -> AppResult<()> {
    let res = UserRoles::delete_many()
        .filter(UserRoleCol::UserId.eq(user_id))
        .filter(UserRoleCol::Role.eq(role))
        .exec(conn)
        .await?;
    if res.rows_affected > 0 {
        tracing::debug!(user_id = %user_id, role = %role, "role revoked");
    }
    Ok(())
}
