use tokio_postgres::Transaction;

use crate::dtos::auth_dtos::UserOut;
use crate::errors::ApiError;
use crate::models::post::Post;

/// A post joined with the author fields the API exposes.
pub struct PostWithAuthor {
    pub post: Post,
    pub author: UserOut,
}

pub async fn create(
    tx: &Transaction<'_>,
    content: &str,
    image_path: Option<&str>,
    author_id: i32,
) -> Result<Post, ApiError> {
    let row = tx
        .query_one(
            "INSERT INTO posts (content, image_path, author_id) VALUES ($1, $2, $3)
             RETURNING id, content, image_path, author_id, created_at",
            &[&content, &image_path, &author_id],
        )
        .await?;
    Ok(Post::from_row(&row))
}

pub async fn get(tx: &Transaction<'_>, id: i32) -> Result<Option<Post>, ApiError> {
    let row = tx
        .query_opt(
            "SELECT id, content, image_path, author_id, created_at FROM posts WHERE id = $1",
            &[&id],
        )
        .await?;
    Ok(row.map(|r| Post::from_row(&r)))
}

/// Content is replaced unconditionally; the image ref only when a new one
/// was uploaded.
pub async fn update(
    tx: &Transaction<'_>,
    id: i32,
    content: &str,
    new_image_path: Option<&str>,
) -> Result<Post, ApiError> {
    let row = tx
        .query_one(
            "UPDATE posts SET content = $2, image_path = COALESCE($3, image_path)
             WHERE id = $1
             RETURNING id, content, image_path, author_id, created_at",
            &[&id, &content, &new_image_path],
        )
        .await?;
    Ok(Post::from_row(&row))
}

/// Dependent interactions go with the post via the FK cascade.
pub async fn delete(tx: &Transaction<'_>, id: i32) -> Result<(), ApiError> {
    tx.execute("DELETE FROM posts WHERE id = $1", &[&id]).await?;
    Ok(())
}

/// Full table in insertion order, author joined in.
pub async fn list_with_authors(tx: &Transaction<'_>) -> Result<Vec<PostWithAuthor>, ApiError> {
    let rows = tx
        .query(
            "SELECT p.id, p.content, p.image_path, p.author_id, p.created_at,
                    u.username AS author_username
             FROM posts p
             JOIN users u ON u.id = p.author_id
             ORDER BY p.id",
            &[],
        )
        .await?;

    Ok(rows
        .iter()
        .map(|row| {
            let post = Post::from_row(row);
            let author = UserOut {
                id: post.author_id,
                username: row.get("author_username"),
            };
            PostWithAuthor { post, author }
        })
        .collect())
}
