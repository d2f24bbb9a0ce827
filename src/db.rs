use anyhow::{Context, Result};
use deadpool_postgres::Pool;

/// Creates the schema at startup. The constraints carry the data-model
/// invariants: unique usernames, at most one interaction per (user, post),
/// and cascade-deletion of interactions with their post or user.
pub async fn init_schema(pool: &Pool) -> Result<()> {
    let client = pool.get().await.context("could not acquire a connection")?;
    client
        .batch_execute(
            "CREATE TABLE IF NOT EXISTS users (
                 id            SERIAL PRIMARY KEY,
                 username      TEXT NOT NULL UNIQUE,
                 password_hash TEXT NOT NULL
             );

             CREATE TABLE IF NOT EXISTS posts (
                 id         SERIAL PRIMARY KEY,
                 content    TEXT NOT NULL,
                 image_path TEXT,
                 author_id  INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                 created_at TIMESTAMPTZ NOT NULL DEFAULT now()
             );

             CREATE TABLE IF NOT EXISTS interactions (
                 id      SERIAL PRIMARY KEY,
                 kind    TEXT NOT NULL CHECK (kind IN ('like', 'dislike')),
                 user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                 post_id INTEGER NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
                 UNIQUE (user_id, post_id)
             );",
        )
        .await
        .context("failed to create schema")?;
    Ok(())
}
