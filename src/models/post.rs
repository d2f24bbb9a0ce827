use chrono::{DateTime, Utc};
use tokio_postgres::Row;

/// Row of the `posts` table. `image_path` is a path ref into the image
/// store (`static/images/...`), not the binary itself.
#[derive(Debug, Clone)]
pub struct Post {
    pub id: i32,
    pub content: String,
    pub image_path: Option<String>,
    pub author_id: i32,
    pub created_at: DateTime<Utc>,
}

impl Post {
    pub fn from_row(row: &Row) -> Self {
        Self {
            id: row.get("id"),
            content: row.get("content"),
            image_path: row.get("image_path"),
            author_id: row.get("author_id"),
            created_at: row.get("created_at"),
        }
    }
}
