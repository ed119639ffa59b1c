use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};

use super::types::{NewUser, User};
use crate::errors::AppError;

const SELECT_USER: &str = "SELECT id, username, password, is_staff, person FROM users";

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(&format!("{SELECT_USER} WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn find_by_username(pool: &PgPool, username: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(&format!("{SELECT_USER} WHERE username = $1"))
        .bind(username)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn username_exists(pool: &PgPool, username: &str) -> Result<bool, AppError> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE username = $1)")
        .bind(username)
        .fetch_one(pool)
        .await?;
    Ok(exists)
}

/// Insert an account inside an open transaction. Returns the new id.
pub async fn create(conn: &mut PgConnection, new: &NewUser) -> Result<i64, AppError> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO users (username, password, is_staff, person) \
         VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(&new.username)
    .bind(&new.password)
    .bind(new.is_staff)
    .bind(new.person)
    .fetch_one(conn)
    .await?;
    Ok(id)
}

pub async fn update_password(pool: &PgPool, id: i64, password_hash: &str) -> Result<(), AppError> {
    sqlx::query("UPDATE users SET password = $1 WHERE id = $2")
        .bind(password_hash)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Create the bootstrap staff account unless one with that name exists.
/// Returns true when an account was created.
pub async fn ensure_staff_account(
    pool: &PgPool,
    username: &str,
    password_hash: &str,
) -> Result<bool, AppError> {
    let result = sqlx::query(
        "INSERT INTO users (username, password, is_staff) VALUES ($1, $2, TRUE) \
         ON CONFLICT (username) DO NOTHING",
    )
    .bind(username)
    .bind(password_hash)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Existence checks the account-provisioning form runs before creating
/// an account.
#[async_trait]
pub trait AccountLookup: Sync {
    async fn username_exists(&self, username: &str) -> Result<bool, AppError>;
    async fn person_id_exists(&self, person_id: &str) -> Result<bool, AppError>;
}

#[async_trait]
impl AccountLookup for PgPool {
    async fn username_exists(&self, username: &str) -> Result<bool, AppError> {
        username_exists(self, username).await
    }

    async fn person_id_exists(&self, person_id: &str) -> Result<bool, AppError> {
        crate::models::person::person_id_exists(self, person_id).await
    }
}
