use tokio_postgres::Row;

/// Row of the `users` table. The hash never leaves the server; anything
/// client-facing goes through `dtos::auth_dtos::UserOut`.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub password_hash: String,
}

impl User {
    pub fn from_row(row: &Row) -> Self {
        Self {
            id: row.get("id"),
            username: row.get("username"),
            password_hash: row.get("password_hash"),
        }
    }
}
