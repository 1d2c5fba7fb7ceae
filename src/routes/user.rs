use actix_web::{cookie::Cookie, http::header, web, HttpRequest, HttpResponse};
use chrono::SecondsFormat;
use log::error;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    Statement,
};
use serde::{Deserialize, Serialize};

use crate::accounts::{self, SignupData, SignupError};
use crate::auth::{AuthUser, SESSION_COOKIE};
use crate::config::AppConfig;
use crate::entity::{message, user};
use crate::error::AppError;
use crate::response::ResponseDto;
use crate::sessions;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/signup").route(web::post().to(signup)))
        .service(web::resource("/login").route(web::post().to(login)))
        .service(web::resource("/logout").route(web::post().to(logout)))
        .service(web::resource("/list").route(web::get().to(list_users)))
        .service(web::resource("/delete").route(web::post().to(delete_account)))
        .service(web::resource("/follow/{id:\\d+}").route(web::post().to(follow)))
        .service(web::resource("/stop-following/{id:\\d+}").route(web::post().to(stop_following)))
        .service(web::resource("/{id:\\d+}").route(web::get().to(show_user)))
        .service(web::resource("/{id:\\d+}/following").route(web::get().to(following)))
        .service(web::resource("/{id:\\d+}/followers").route(web::get().to(followers)))
        .service(web::resource("/{id:\\d+}/likes").route(web::get().to(likes)));
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignupRequest {
    username: Option<String>,
    email: Option<String>,
    password: Option<String>,
    image_url: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest {
    username: Option<String>,
    password: Option<String>,
}

#[derive(Deserialize)]
struct ListUsersQuery {
    q: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UserDto {
    id: i32,
    username: String,
    email: String,
    image_url: Option<String>,
    header_image_url: Option<String>,
    bio: Option<String>,
    location: Option<String>,
    created: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MessageDto {
    id: i32,
    user_id: i32,
    text: String,
    created: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProfileDto {
    user: UserDto,
    messages: Vec<MessageDto>,
}

#[derive(Serialize)]
struct EmptyResponse {}

async fn signup(
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
    payload: web::Json<SignupRequest>,
) -> Result<HttpResponse, AppError> {
    let username = payload.username.clone().unwrap_or_default();
    let email = payload.email.clone().unwrap_or_default();
    let password = payload.password.clone().unwrap_or_default();
    if username.trim().is_empty() {
        return Err(AppError::param_error("username cannot be empty"));
    }
    if email.trim().is_empty() {
        return Err(AppError::param_error("email cannot be empty"));
    }

    let data = SignupData {
        username,
        email,
        password,
        image_url: payload.image_url.clone(),
    };

    let created = match accounts::signup(db.get_ref(), data, config.bcrypt_cost).await {
        Ok(created) => created,
        Err(SignupError::EmptyPassword) => {
            return Err(AppError::param_error("password cannot be empty"));
        }
        Err(err) if err.is_conflict() => {
            return Err(AppError::fail("username or email already taken"));
        }
        Err(err) => {
            error!("signup failed: {}", err);
            return Err(AppError::system_exception());
        }
    };

    let token = sessions::create(db.get_ref(), created.id)
        .await
        .map_err(|_| AppError::system_exception())?;

    Ok(HttpResponse::Ok()
        .cookie(session_cookie(token))
        .json(ResponseDto::success(Some(to_user_dto(created)))))
}

async fn login(
    db: web::Data<DatabaseConnection>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let username = payload.username.clone().unwrap_or_default();
    let password = payload.password.clone().unwrap_or_default();
    if username.trim().is_empty() || password.trim().is_empty() {
        return Err(AppError::param_error("username and password are required"));
    }

    let user = accounts::authenticate(db.get_ref(), &username, &password)
        .await
        .map_err(|e| {
            error!("authenticate failed: {}", e);
            AppError::system_exception()
        })?;

    let user = match user {
        Some(user) => user,
        None => return Err(AppError::fail("Invalid credentials.")),
    };

    let token = sessions::create(db.get_ref(), user.id)
        .await
        .map_err(|_| AppError::system_exception())?;

    Ok(HttpResponse::Ok()
        .cookie(session_cookie(token))
        .json(ResponseDto::success(Some(to_user_dto(user)))))
}

async fn logout(
    db: web::Data<DatabaseConnection>,
    _auth: AuthUser,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    if let Some(cookie) = req.cookie(SESSION_COOKIE) {
        sessions::destroy(db.get_ref(), cookie.value())
            .await
            .map_err(|_| AppError::system_exception())?;
    }

    Ok(HttpResponse::Ok()
        .cookie(removal_cookie())
        .json(ResponseDto::<EmptyResponse>::success(None)))
}

async fn list_users(
    db: web::Data<DatabaseConnection>,
    query: web::Query<ListUsersQuery>,
) -> Result<HttpResponse, AppError> {
    let mut select = user::Entity::find().order_by_asc(user::Column::Username);
    if let Some(q) = query.q.clone().filter(|q| !q.trim().is_empty()) {
        select = select.filter(user::Column::Username.contains(&q));
    }

    let users = select
        .all(db.get_ref())
        .await
        .map_err(|_| AppError::system_exception())?;
    let list: Vec<UserDto> = users.into_iter().map(to_user_dto).collect();

    if list.is_empty() {
        return Ok(HttpResponse::Ok().json(ResponseDto::with_msg(
            Some(list),
            "Sorry, no users found",
        )));
    }
    Ok(HttpResponse::Ok().json(ResponseDto::success(Some(list))))
}

async fn show_user(
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let user = find_user(db.get_ref(), *path).await?;

    let messages = message::Entity::find()
        .filter(message::Column::UserId.eq(user.id))
        .order_by_desc(message::Column::Created)
        .all(db.get_ref())
        .await
        .map_err(|_| AppError::system_exception())?;

    let dto = ProfileDto {
        user: to_user_dto(user),
        messages: messages.into_iter().map(to_message_dto).collect(),
    };
    Ok(HttpResponse::Ok().json(ResponseDto::success(Some(dto))))
}

async fn following(
    db: web::Data<DatabaseConnection>,
    _auth: AuthUser,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let user = find_user(db.get_ref(), *path).await?;
    let sql = "select u.* from t_user u \
        join t_follow f on f.followee_id = u.id \
        where f.follower_id = ? order by u.username";
    let list = query_users(db.get_ref(), sql, user.id).await?;
    Ok(HttpResponse::Ok().json(ResponseDto::success(Some(list))))
}

async fn followers(
    db: web::Data<DatabaseConnection>,
    _auth: AuthUser,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let user = find_user(db.get_ref(), *path).await?;
    let sql = "select u.* from t_user u \
        join t_follow f on f.follower_id = u.id \
        where f.followee_id = ? order by u.username";
    let list = query_users(db.get_ref(), sql, user.id).await?;
    Ok(HttpResponse::Ok().json(ResponseDto::success(Some(list))))
}

async fn likes(
    db: web::Data<DatabaseConnection>,
    _auth: AuthUser,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let user = find_user(db.get_ref(), *path).await?;
    let sql = "select m.* from t_message m \
        join t_like l on l.message_id = m.id \
        where l.user_id = ? order by m.created desc";
    let stmt = Statement::from_sql_and_values(
        db.get_database_backend(),
        sql,
        vec![user.id.into()],
    );
    let messages = message::Entity::find()
        .from_raw_sql(stmt)
        .all(db.get_ref())
        .await
        .map_err(|_| AppError::system_exception())?;

    let list: Vec<MessageDto> = messages.into_iter().map(to_message_dto).collect();
    Ok(HttpResponse::Ok().json(ResponseDto::success(Some(list))))
}

async fn follow(
    db: web::Data<DatabaseConnection>,
    auth: AuthUser,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let target = find_user(db.get_ref(), *path).await?;
    if target.id == auth.user_id {
        return Err(AppError::param_error("cannot follow yourself"));
    }

    if let Err(err) = accounts::follow(db.get_ref(), auth.user_id, target.id).await {
        let msg = err.to_string();
        if msg.contains("Duplicate") || msg.contains("UNIQUE") {
            return Err(AppError::fail("already following"));
        }
        error!("follow failed: {}", err);
        return Err(AppError::system_exception());
    }

    Ok(HttpResponse::Ok().json(ResponseDto::<EmptyResponse>::success(None)))
}

async fn stop_following(
    db: web::Data<DatabaseConnection>,
    auth: AuthUser,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let target = find_user(db.get_ref(), *path).await?;
    accounts::unfollow(db.get_ref(), auth.user_id, target.id)
        .await
        .map_err(|_| AppError::system_exception())?;

    Ok(HttpResponse::Ok().json(ResponseDto::<EmptyResponse>::success(None)))
}

async fn delete_account(
    db: web::Data<DatabaseConnection>,
    auth: AuthUser,
) -> Result<HttpResponse, AppError> {
    accounts::delete_user(db.get_ref(), auth.user_id)
        .await
        .map_err(|e| {
            error!("delete account failed: {}", e);
            AppError::system_exception()
        })?;

    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, "/"))
        .cookie(removal_cookie())
        .finish())
}

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .finish()
}

fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    cookie.set_path("/");
    cookie.make_removal();
    cookie
}

async fn find_user(db: &DatabaseConnection, id: i32) -> Result<user::Model, AppError> {
    user::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|_| AppError::system_exception())?
        .ok_or_else(|| AppError::fail("user not found"))
}

async fn query_users(
    db: &DatabaseConnection,
    sql: &str,
    user_id: i32,
) -> Result<Vec<UserDto>, AppError> {
    let stmt = Statement::from_sql_and_values(db.get_database_backend(), sql, vec![user_id.into()]);
    let users = user::Entity::find()
        .from_raw_sql(stmt)
        .all(db)
        .await
        .map_err(|_| AppError::system_exception())?;
    Ok(users.into_iter().map(to_user_dto).collect())
}

fn to_user_dto(model: user::Model) -> UserDto {
    UserDto {
        id: model.id,
        username: model.username,
        email: model.email,
        image_url: model.image_url,
        header_image_url: model.header_image_url,
        bio: model.bio,
        location: model.location,
        created: model.created.map(to_rfc3339),
    }
}

fn to_message_dto(model: message::Model) -> MessageDto {
    MessageDto {
        id: model.id,
        user_id: model.user_id,
        text: model.text,
        created: to_rfc3339(model.created),
    }
}

fn to_rfc3339(dt: chrono::DateTime<chrono::Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, false)
}
