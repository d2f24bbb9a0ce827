use tokio_postgres::Transaction;

use crate::errors::ApiError;
use crate::models::user::User;

pub async fn exists(tx: &Transaction<'_>, username: &str) -> Result<bool, ApiError> {
    let row = tx
        .query_opt("SELECT 1 FROM users WHERE username = $1", &[&username])
        .await?;
    Ok(row.is_some())
}

/// Inserts a new user; returns `None` when the username is already taken.
/// The unique index is the authoritative guard, so a concurrent duplicate
/// cannot slip past an earlier `exists` check.
pub async fn create(
    tx: &Transaction<'_>,
    username: &str,
    password_hash: &str,
) -> Result<Option<User>, ApiError> {
    let row = tx
        .query_opt(
            "INSERT INTO users (username, password_hash) VALUES ($1, $2)
             ON CONFLICT (username) DO NOTHING
             RETURNING id, username, password_hash",
            &[&username, &password_hash],
        )
        .await?;
    Ok(row.map(|r| User::from_row(&r)))
}

pub async fn get_by_username(
    tx: &Transaction<'_>,
    username: &str,
) -> Result<Option<User>, ApiError> {
    let row = tx
        .query_opt(
            "SELECT id, username, password_hash FROM users WHERE username = $1",
            &[&username],
        )
        .await?;
    Ok(row.map(|r| User::from_row(&r)))
}
