use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::dtos::auth_dtos::UserOut;
use crate::dtos::interaction_dtos::InteractionOut;
use crate::models::post::Post;

#[derive(Debug, Serialize)]
pub struct PostOut {
    pub id: i32,
    pub content: String,
    pub image_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub author: UserOut,
    pub interactions: Vec<InteractionOut>,
}

impl PostOut {
    pub fn new(post: Post, author: UserOut, interactions: Vec<InteractionOut>) -> Self {
        Self {
            id: post.id,
            content: post.content,
            image_path: post.image_path,
            created_at: post.created_at,
            author,
            interactions,
        }
    }
}
