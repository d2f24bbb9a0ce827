use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

/// Closed set of interaction kinds. Any other wire value is rejected by
/// serde before a handler ever sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionKind {
    Like,
    Dislike,
}

impl InteractionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionKind::Like => "like",
            InteractionKind::Dislike => "dislike",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "like" => Some(InteractionKind::Like),
            "dislike" => Some(InteractionKind::Dislike),
            _ => None,
        }
    }
}

/// Row of the `interactions` table. The schema holds `UNIQUE (user_id,
/// post_id)`, so one row per pair.
#[derive(Debug, Clone)]
pub struct Interaction {
    pub id: i32,
    pub kind: InteractionKind,
    pub user_id: i32,
    pub post_id: i32,
}

impl Interaction {
    /// Reads a row whose `kind` column passed the table's CHECK constraint.
    pub fn from_row(row: &Row) -> Option<Self> {
        let kind: &str = row.get("kind");
        Some(Self {
            id: row.get("id"),
            kind: InteractionKind::parse(kind)?,
            user_id: row.get("user_id"),
            post_id: row.get("post_id"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_str() {
        assert_eq!(InteractionKind::parse("like"), Some(InteractionKind::Like));
        assert_eq!(
            InteractionKind::parse("dislike"),
            Some(InteractionKind::Dislike)
        );
        assert_eq!(InteractionKind::Like.as_str(), "like");
        assert_eq!(InteractionKind::Dislike.as_str(), "dislike");
    }

    #[test]
    fn kind_rejects_unknown_values() {
        assert_eq!(InteractionKind::parse("love"), None);
        assert_eq!(InteractionKind::parse("Like"), None);
        assert_eq!(InteractionKind::parse(""), None);
    }

    #[test]
    fn kind_wire_form_is_lowercase() {
        assert_eq!(
            serde_json::to_string(&InteractionKind::Like).unwrap(),
            "\"like\""
        );
        let parsed: InteractionKind = serde_json::from_str("\"dislike\"").unwrap();
        assert_eq!(parsed, InteractionKind::Dislike);
        assert!(serde_json::from_str::<InteractionKind>("\"love\"").is_err());
    }
}
