use std::collections::HashMap;

use actix_multipart::Multipart;
use actix_web::{HttpResponse, delete, get, post, put, web};
use futures::TryStreamExt;

use crate::AppState;
use crate::dtos::auth_dtos::UserOut;
use crate::dtos::interaction_dtos::InteractionOut;
use crate::dtos::post_dtos::PostOut;
use crate::errors::ApiError;
use crate::middleware::auth_extractor::AuthenticatedUser;
use crate::repositories::{interaction_repository, post_repository};

struct PostForm {
    content: String,
    image: Option<(String, Vec<u8>)>,
}

fn multipart_err(e: actix_multipart::MultipartError) -> ApiError {
    ApiError::Validation(format!("invalid multipart payload: {e}"))
}

/// Reads the post form: a required `content` text field plus an optional
/// `image` file field. Unknown fields are drained and dropped.
async fn read_post_form(mut payload: Multipart) -> Result<PostForm, ApiError> {
    let mut content: Option<String> = None;
    let mut image: Option<(String, Vec<u8>)> = None;

    while let Some(mut field) = payload.try_next().await.map_err(multipart_err)? {
        let name = field
            .content_disposition()
            .get_name()
            .unwrap_or("")
            .to_string();
        let filename = field
            .content_disposition()
            .get_filename()
            .map(|f| f.to_string());

        let mut buf = Vec::new();
        while let Some(chunk) = field.try_next().await.map_err(multipart_err)? {
            buf.extend_from_slice(&chunk);
        }

        match name.as_str() {
            "content" => {
                let text = String::from_utf8(buf)
                    .map_err(|_| ApiError::Validation("content must be valid utf-8".to_string()))?;
                content = Some(text);
            }
            "image" => {
                if let Some(filename) = filename {
                    if !buf.is_empty() {
                        image = Some((filename, buf));
                    }
                }
            }
            _ => {}
        }
    }

    let content = content
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| ApiError::Validation("content is required".to_string()))?;

    Ok(PostForm { content, image })
}

/// POST /posts
#[post("")]
pub async fn create_post(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let form = read_post_form(payload).await?;

    let mut db = state.pg_pool.get().await?;
    let tx = db.transaction().await?;
    let author = user.resolve(&tx).await?;

    let image_path = match &form.image {
        Some((filename, bytes)) => Some(state.images.store(author.id, filename, bytes)?),
        None => None,
    };

    let saved = async {
        let post =
            post_repository::create(&tx, &form.content, image_path.as_deref(), author.id).await?;
        tx.commit().await?;
        Ok::<_, ApiError>(post)
    }
    .await;

    let post = match saved {
        Ok(post) => post,
        Err(e) => {
            // the image write already happened; take the orphan back out
            if let Some(path_ref) = &image_path {
                state.images.remove(path_ref);
            }
            return Err(e);
        }
    };

    log::info!("user {} created post {}", author.username, post.id);
    Ok(HttpResponse::Ok().json(PostOut::new(post, UserOut::from(&author), Vec::new())))
}

/// GET /posts — public, full table, insertion order.
#[get("")]
pub async fn list_posts(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let mut db = state.pg_pool.get().await?;
    let tx = db.transaction().await?;
    let posts = post_repository::list_with_authors(&tx).await?;
    let post_ids: Vec<i32> = posts.iter().map(|p| p.post.id).collect();
    let interactions = interaction_repository::list_for_posts(&tx, &post_ids).await?;
    tx.commit().await?;

    let mut by_post: HashMap<i32, Vec<InteractionOut>> = HashMap::new();
    for entry in interactions {
        by_post
            .entry(entry.interaction.post_id)
            .or_default()
            .push(InteractionOut::new(&entry.interaction, entry.user));
    }

    let out: Vec<PostOut> = posts
        .into_iter()
        .map(|pw| {
            let interactions = by_post.remove(&pw.post.id).unwrap_or_default();
            PostOut::new(pw.post, pw.author, interactions)
        })
        .collect();

    Ok(HttpResponse::Ok().json(out))
}

/// PUT /posts/{post_id} — author only.
#[put("/{post_id}")]
pub async fn update_post(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let post_id = path.into_inner();
    let form = read_post_form(payload).await?;

    let mut db = state.pg_pool.get().await?;
    let tx = db.transaction().await?;
    let author = user.resolve(&tx).await?;

    let post = post_repository::get(&tx, post_id)
        .await?
        .ok_or(ApiError::PostNotFound)?;
    if post.author_id != author.id {
        return Err(ApiError::Forbidden);
    }

    let new_image_path = match &form.image {
        Some((filename, bytes)) => Some(state.images.store(author.id, filename, bytes)?),
        None => None,
    };

    let saved = async {
        let updated =
            post_repository::update(&tx, post_id, &form.content, new_image_path.as_deref()).await?;
        let interactions = interaction_repository::list_for_posts(&tx, &[post_id]).await?;
        tx.commit().await?;
        Ok::<_, ApiError>((updated, interactions))
    }
    .await;

    let (updated, interactions) = match saved {
        Ok(v) => v,
        Err(e) => {
            if let Some(path_ref) = &new_image_path {
                state.images.remove(path_ref);
            }
            return Err(e);
        }
    };

    let interactions = interactions
        .into_iter()
        .map(|entry| InteractionOut::new(&entry.interaction, entry.user))
        .collect();
    Ok(HttpResponse::Ok().json(PostOut::new(updated, UserOut::from(&author), interactions)))
}

/// DELETE /posts/{post_id} — author only; interactions cascade.
#[delete("/{post_id}")]
pub async fn delete_post(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let post_id = path.into_inner();

    let mut db = state.pg_pool.get().await?;
    let tx = db.transaction().await?;
    let author = user.resolve(&tx).await?;

    let post = post_repository::get(&tx, post_id)
        .await?
        .ok_or(ApiError::PostNotFound)?;
    if post.author_id != author.id {
        return Err(ApiError::Forbidden);
    }

    post_repository::delete(&tx, post_id).await?;
    tx.commit().await?;

    log::info!("user {} deleted post {}", author.username, post_id);
    Ok(HttpResponse::NoContent().finish())
}
