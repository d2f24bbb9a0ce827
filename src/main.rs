mod config;
mod db;
mod dtos;
mod errors;
mod handlers;
mod middleware;
mod models;
mod repositories;
mod services;

use std::env;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware::Logger, web};
use deadpool_postgres::Pool;
use log::{error, info};

use crate::handlers::auth_handlers::{login, register};
use crate::handlers::image_handlers::serve_image;
use crate::handlers::interaction_handlers::set_interaction;
use crate::handlers::post_handlers::{create_post, delete_post, list_posts, update_post};
use crate::services::auth_services::AuthService;
use crate::services::image_services::ImageStore;

#[derive(Clone)]
pub struct AppState {
    pub pg_pool: Pool,
    pub images: ImageStore,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();
    dotenv::dotenv().ok();

    let pg_pool = match config::get_pg_pool() {
        Ok(p) => p,
        Err(e) => {
            error!("Failed to create PG pool: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = db::init_schema(&pg_pool).await {
        error!("Failed to initialize schema: {}", e);
        std::process::exit(1);
    }

    let auth_data = web::Data::new(AuthService::new_from_env());

    let state = web::Data::new(AppState {
        pg_pool,
        images: ImageStore::new_from_env(),
    });

    let allowed_origins = env::var("ALLOWED_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:3000,http://127.0.0.1:3000".into());

    let port = env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let bind_address = format!("0.0.0.0:{}", port);

    info!("Starting server on {}", bind_address);

    HttpServer::new(move || {
        let mut cors = Cors::default()
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec!["authorization", "content-type", "accept"])
            .supports_credentials()
            .max_age(3600);

        for origin in allowed_origins
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
        {
            cors = cors.allowed_origin(origin);
        }

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(state.clone())
            .app_data(auth_data.clone())
            .service(
                web::scope("/users")
                    .service(register) // POST /users/register
                    .service(login), // POST /users/token
            )
            .service(
                web::scope("/posts")
                    .service(create_post) // POST /posts
                    .service(list_posts) // GET /posts
                    .service(update_post) // PUT /posts/{post_id}
                    .service(delete_post), // DELETE /posts/{post_id}
            )
            .service(
                web::scope("/interactions").service(set_interaction), // POST /interactions/posts/{post_id}
            )
            .service(serve_image) // GET /static/images/{filename}
    })
    .bind(&bind_address)?
    .run()
    .await
}
