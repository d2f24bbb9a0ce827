use actix_web::{HttpResponse, post, web};
use regex::Regex;

use crate::AppState;
use crate::dtos::auth_dtos::{LoginIn, RegisterIn, SessionOut, UserOut};
use crate::errors::ApiError;
use crate::repositories::user_repository;
use crate::services::auth_services::AuthService;

fn valid_username(username: &str) -> bool {
    let re = Regex::new(r"^[A-Za-z0-9_.-]{3,32}$").unwrap();
    re.is_match(username)
}

/// POST /users/register
/// Creates an account; the response never echoes the password or its hash.
#[post("/register")]
pub async fn register(
    state: web::Data<AppState>,
    svc: web::Data<AuthService>,
    body: web::Json<RegisterIn>,
) -> Result<HttpResponse, ApiError> {
    let username = body.username.trim();
    if !valid_username(username) {
        return Err(ApiError::Validation(
            "username must be 3-32 characters of letters, digits, '_', '.' or '-'".to_string(),
        ));
    }
    if body.password.is_empty() {
        return Err(ApiError::Validation("password must not be empty".to_string()));
    }

    let mut db = state.pg_pool.get().await?;
    let tx = db.transaction().await?;
    if user_repository::exists(&tx, username).await? {
        return Err(ApiError::DuplicateUsername);
    }
    let password_hash = svc.hash_password(&body.password)?;
    // the insert re-checks via the unique index, so a concurrent duplicate
    // still lands here rather than as a constraint error
    let user = user_repository::create(&tx, username, &password_hash)
        .await?
        .ok_or(ApiError::DuplicateUsername)?;
    tx.commit().await?;

    log::info!("registered user {} (id {})", user.username, user.id);
    Ok(HttpResponse::Ok().json(UserOut::from(&user)))
}

/// POST /users/token
/// OAuth2 password flow: form-encoded credentials in, bearer token out.
#[post("/token")]
pub async fn login(
    state: web::Data<AppState>,
    svc: web::Data<AuthService>,
    form: web::Form<LoginIn>,
) -> Result<HttpResponse, ApiError> {
    let mut db = state.pg_pool.get().await?;
    let tx = db.transaction().await?;
    let user = user_repository::get_by_username(&tx, &form.username).await?;
    tx.commit().await?;

    let user = match user {
        Some(user) => user,
        None => {
            // same cost as a real verify, so the caller cannot tell a
            // missing user from a wrong password
            svc.burn_password(&form.password);
            return Err(ApiError::InvalidCredentials);
        }
    };
    if !svc.verify_password(&form.password, &user.password_hash)? {
        return Err(ApiError::InvalidCredentials);
    }

    let token = svc.issue_token(&user.username)?;
    Ok(HttpResponse::Ok().json(SessionOut::bearer(token)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_shape_is_enforced() {
        assert!(valid_username("alice"));
        assert!(valid_username("a.b-c_3"));
        assert!(!valid_username("ab"));
        assert!(!valid_username(""));
        assert!(!valid_username("has space"));
        assert!(!valid_username("way-too-long-username-far-beyond-the-limit"));
    }
}
