use tokio_postgres::Transaction;

use crate::dtos::auth_dtos::UserOut;
use crate::errors::ApiError;
use crate::models::interaction::{Interaction, InteractionKind};

pub struct InteractionWithUser {
    pub interaction: Interaction,
    pub user: UserOut,
}

fn bad_kind() -> ApiError {
    ApiError::Internal("unknown interaction kind in storage".to_string())
}

/// Create-or-update keyed by (user, post). The unique constraint makes the
/// check-then-act race impossible: concurrent calls for the same pair
/// serialize on the row and the last write wins.
pub async fn upsert(
    tx: &Transaction<'_>,
    user_id: i32,
    post_id: i32,
    kind: InteractionKind,
) -> Result<Interaction, ApiError> {
    let row = tx
        .query_one(
            "INSERT INTO interactions (kind, user_id, post_id) VALUES ($1, $2, $3)
             ON CONFLICT (user_id, post_id) DO UPDATE SET kind = EXCLUDED.kind
             RETURNING id, kind, user_id, post_id",
            &[&kind.as_str(), &user_id, &post_id],
        )
        .await?;
    Interaction::from_row(&row).ok_or_else(bad_kind)
}

/// Interactions for a set of posts, acting user joined in.
pub async fn list_for_posts(
    tx: &Transaction<'_>,
    post_ids: &[i32],
) -> Result<Vec<InteractionWithUser>, ApiError> {
    if post_ids.is_empty() {
        return Ok(Vec::new());
    }

    let rows = tx
        .query(
            "SELECT i.id, i.kind, i.user_id, i.post_id, u.username
             FROM interactions i
             JOIN users u ON u.id = i.user_id
             WHERE i.post_id = ANY($1)
             ORDER BY i.id",
            &[&post_ids],
        )
        .await?;

    rows.iter()
        .map(|row| {
            let interaction = Interaction::from_row(row).ok_or_else(bad_kind)?;
            let user = UserOut {
                id: interaction.user_id,
                username: row.get("username"),
            };
            Ok(InteractionWithUser { interaction, user })
        })
        .collect()
}
