use serde::{Deserialize, Serialize};

use crate::dtos::auth_dtos::UserOut;
use crate::models::interaction::{Interaction, InteractionKind};

#[derive(Deserialize)]
pub struct SetInteractionIn {
    #[serde(rename = "type")]
    pub kind: InteractionKind,
}

#[derive(Debug, Serialize)]
pub struct InteractionOut {
    pub id: i32,
    #[serde(rename = "type")]
    pub kind: InteractionKind,
    pub user: UserOut,
}

impl InteractionOut {
    pub fn new(interaction: &Interaction, user: UserOut) -> Self {
        Self {
            id: interaction.id,
            kind: interaction.kind,
            user,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_interaction_parses_known_kinds() {
        let body: SetInteractionIn = serde_json::from_str(r#"{"type": "like"}"#).unwrap();
        assert_eq!(body.kind, InteractionKind::Like);
        let body: SetInteractionIn = serde_json::from_str(r#"{"type": "dislike"}"#).unwrap();
        assert_eq!(body.kind, InteractionKind::Dislike);
    }

    #[test]
    fn set_interaction_rejects_other_kinds() {
        assert!(serde_json::from_str::<SetInteractionIn>(r#"{"type": "love"}"#).is_err());
        assert!(serde_json::from_str::<SetInteractionIn>(r#"{}"#).is_err());
    }
}
