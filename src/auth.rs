use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;
use sea_orm::DatabaseConnection;

use crate::error::AppError;
use crate::sessions;

/// Cookie carrying the session token, the `CURR_USER_KEY` of this app.
pub const SESSION_COOKIE: &str = "warbler_session";

#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: i32,
    pub username: String,
}

#[derive(Clone, Debug)]
pub struct OptionalAuthUser(pub Option<AuthUser>);

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let db = match req.app_data::<web::Data<DatabaseConnection>>() {
            Some(db) => db.clone(),
            None => {
                return Box::pin(async { Err(AppError::system_exception().into()) });
            }
        };
        let token = extract_token(req);

        Box::pin(async move {
            let token = token.ok_or_else(AppError::unauthorized)?;
            let auth = authenticate_token(&db, &token).await?;
            Ok(auth)
        })
    }
}

impl FromRequest for OptionalAuthUser {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let db = match req.app_data::<web::Data<DatabaseConnection>>() {
            Some(db) => db.clone(),
            None => {
                return Box::pin(async { Ok(OptionalAuthUser(None)) });
            }
        };
        let token = extract_token(req);

        Box::pin(async move {
            if let Some(token) = token {
                let auth = authenticate_token(&db, &token).await.ok();
                return Ok(OptionalAuthUser(auth));
            }
            Ok(OptionalAuthUser(None))
        })
    }
}

fn extract_token(req: &HttpRequest) -> Option<String> {
    req.cookie(SESSION_COOKIE)
        .map(|c| c.value().trim().to_string())
        .filter(|v| !v.is_empty())
}

/// A stale token, or one whose user row is gone, behaves exactly like no
/// token at all.
async fn authenticate_token(db: &DatabaseConnection, token: &str) -> Result<AuthUser, AppError> {
    let user = sessions::lookup(db, token)
        .await
        .map_err(|_| AppError::system_exception())?
        .ok_or_else(AppError::unauthorized)?;

    Ok(AuthUser {
        user_id: user.id,
        username: user.username,
    })
}
