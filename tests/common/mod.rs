#![allow(dead_code)]

use actix_web::dev::ServiceResponse;
use actix_web::http::header;
use sea_orm::DatabaseConnection;

use warbler::accounts::{self, SignupData};
use warbler::config::AppConfig;
use warbler::db::connect_db;
use warbler::entity::user;
use warbler::sessions;

pub fn test_config() -> AppConfig {
    AppConfig {
        server_port: 0,
        sqlite_path: String::new(),
        database_url: Some("sqlite::memory:".to_string()),
        // minimum cost, hashing speed matters more than strength here
        bcrypt_cost: 4,
    }
}

pub async fn test_db() -> DatabaseConnection {
    connect_db(&test_config()).await
}

pub async fn signup_user(
    db: &DatabaseConnection,
    username: &str,
    email: &str,
    password: &str,
) -> user::Model {
    accounts::signup(
        db,
        SignupData {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            image_url: None,
        },
        4,
    )
    .await
    .expect("signup failed")
}

/// Logs `user_id` in the way the app does it: a persisted session token.
pub async fn login_token(db: &DatabaseConnection, user_id: i32) -> String {
    sessions::create(db, user_id).await.expect("session create failed")
}

pub fn set_cookie_token<B>(resp: &ServiceResponse<B>) -> Option<String> {
    resp.headers()
        .get_all(header::SET_COOKIE)
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("warbler_session="))
        .and_then(|v| v.split(';').next())
        .and_then(|kv| kv.split('=').nth(1))
        .map(|s| s.to_string())
}
