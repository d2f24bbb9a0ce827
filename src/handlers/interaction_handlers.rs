use actix_web::{HttpResponse, post, web};

use crate::AppState;
use crate::dtos::auth_dtos::UserOut;
use crate::dtos::interaction_dtos::{InteractionOut, SetInteractionIn};
use crate::errors::ApiError;
use crate::middleware::auth_extractor::AuthenticatedUser;
use crate::models::interaction::{Interaction, InteractionKind};
use crate::models::user::User;
use crate::repositories::{interaction_repository, post_repository};

/// POST /interactions/posts/{post_id}
/// Upsert keyed by (acting user, post): the first call creates the row,
/// repeat calls overwrite its kind. One retry on transient store faults.
#[post("/posts/{post_id}")]
pub async fn set_interaction(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
    body: web::Json<SetInteractionIn>,
) -> Result<HttpResponse, ApiError> {
    let post_id = path.into_inner();
    let kind = body.kind;

    let (interaction, actor) = match apply_interaction(&state, &user, post_id, kind).await {
        Err(e) if e.is_transient() => {
            log::warn!("transient failure on interaction upsert, retrying once: {e}");
            apply_interaction(&state, &user, post_id, kind).await?
        }
        other => other?,
    };

    Ok(HttpResponse::Ok().json(InteractionOut::new(&interaction, UserOut::from(&actor))))
}

async fn apply_interaction(
    state: &AppState,
    user: &AuthenticatedUser,
    post_id: i32,
    kind: InteractionKind,
) -> Result<(Interaction, User), ApiError> {
    let mut db = state.pg_pool.get().await?;
    let tx = db.transaction().await?;

    let actor = user.resolve(&tx).await?;
    let post = post_repository::get(&tx, post_id)
        .await?
        .ok_or(ApiError::PostNotFound)?;
    if post.author_id == actor.id {
        return Err(ApiError::SelfInteractionForbidden);
    }

    let interaction = interaction_repository::upsert(&tx, actor.id, post_id, kind).await?;
    tx.commit().await?;
    Ok((interaction, actor))
}
