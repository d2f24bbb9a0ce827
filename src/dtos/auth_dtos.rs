use serde::{Deserialize, Serialize};

use crate::models::user::User;

#[derive(Deserialize)]
pub struct RegisterIn {
    pub username: String,
    pub password: String,
}

/// Login is form-encoded, OAuth2 password-flow style.
#[derive(Deserialize)]
pub struct LoginIn {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct SessionOut {
    pub access_token: String,
    pub token_type: String,
}

impl SessionOut {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

/// Redacted user representation; the hash never appears on the wire.
#[derive(Debug, Serialize)]
pub struct UserOut {
    pub id: i32,
    pub username: String,
}

impl From<&User> for UserOut {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
        }
    }
}
