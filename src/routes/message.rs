use actix_web::{http::header, web, HttpResponse};
use chrono::{SecondsFormat, Utc};
use log::{debug, error};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::entity::{like, message, user};
use crate::error::AppError;
use crate::response::ResponseDto;

/// Warbles are short by definition.
const MAX_TEXT_LEN: usize = 140;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/new").route(web::post().to(create)))
        .service(web::resource("/{id:\\d+}").route(web::get().to(show)))
        .service(web::resource("/{id:\\d+}/delete").route(web::post().to(remove)))
        .service(web::resource("/{id:\\d+}/like").route(web::post().to(toggle_like)));
}

#[derive(Deserialize)]
struct NewMessageForm {
    text: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MessageDto {
    id: i32,
    user_id: i32,
    username: Option<String>,
    text: String,
    created: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LikeDto {
    message_id: i32,
    liked: bool,
}

async fn create(
    db: web::Data<DatabaseConnection>,
    auth: AuthUser,
    payload: web::Form<NewMessageForm>,
) -> Result<HttpResponse, AppError> {
    let text = payload.text.clone().unwrap_or_default();
    let text = text.trim().to_string();
    if text.is_empty() {
        return Err(AppError::param_error("text cannot be empty"));
    }
    if text.chars().count() > MAX_TEXT_LEN {
        return Err(AppError::param_error("text too long (140 chars max)"));
    }

    let model = message::ActiveModel {
        user_id: Set(auth.user_id),
        text: Set(text),
        created: Set(Utc::now()),
        ..Default::default()
    };
    let inserted = model.insert(db.get_ref()).await.map_err(|e| {
        error!("message insert failed: {}", e);
        AppError::system_exception()
    })?;
    debug!("message saved id={}", inserted.id);

    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, format!("/api/users/{}", auth.user_id)))
        .finish())
}

async fn show(
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let message = find_message(db.get_ref(), *path).await?;

    let author = user::Entity::find_by_id(message.user_id)
        .one(db.get_ref())
        .await
        .map_err(|_| AppError::system_exception())?;

    let dto = MessageDto {
        id: message.id,
        user_id: message.user_id,
        username: author.map(|u| u.username),
        text: message.text,
        created: message.created.to_rfc3339_opts(SecondsFormat::Millis, false),
    };
    Ok(HttpResponse::Ok().json(ResponseDto::success(Some(dto))))
}

async fn remove(
    db: web::Data<DatabaseConnection>,
    auth: AuthUser,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let message = find_message(db.get_ref(), *path).await?;
    if message.user_id != auth.user_id {
        return Err(AppError::unauthorized());
    }

    message::Entity::delete_by_id(message.id)
        .exec(db.get_ref())
        .await
        .map_err(|e| {
            error!("message delete failed: {}", e);
            AppError::system_exception()
        })?;

    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, format!("/api/users/{}", auth.user_id)))
        .finish())
}

async fn toggle_like(
    db: web::Data<DatabaseConnection>,
    auth: AuthUser,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let message = find_message(db.get_ref(), *path).await?;

    let existing = like::Entity::find()
        .filter(like::Column::UserId.eq(auth.user_id))
        .filter(like::Column::MessageId.eq(message.id))
        .one(db.get_ref())
        .await
        .map_err(|_| AppError::system_exception())?;

    let liked = if let Some(existing) = existing {
        like::Entity::delete_by_id(existing.id)
            .exec(db.get_ref())
            .await
            .map_err(|_| AppError::system_exception())?;
        false
    } else {
        let model = like::ActiveModel {
            user_id: Set(auth.user_id),
            message_id: Set(message.id),
            created: Set(Some(Utc::now())),
            ..Default::default()
        };
        if let Err(err) = model.insert(db.get_ref()).await {
            // unique (user, message) backstop against double submits
            let msg = err.to_string();
            if !msg.contains("Duplicate") && !msg.contains("UNIQUE") {
                error!("like insert failed: {}", err);
                return Err(AppError::system_exception());
            }
        }
        true
    };

    let dto = LikeDto {
        message_id: message.id,
        liked,
    };
    Ok(HttpResponse::Ok().json(ResponseDto::success(Some(dto))))
}

async fn find_message(db: &DatabaseConnection, id: i32) -> Result<message::Model, AppError> {
    message::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|_| AppError::system_exception())?
        .ok_or_else(|| AppError::fail("message not found"))
}
