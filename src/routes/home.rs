use actix_web::{web, HttpResponse};
use chrono::SecondsFormat;
use sea_orm::{ConnectionTrait, DatabaseConnection, EntityTrait, Statement};
use serde::{Deserialize, Serialize};

use crate::auth::OptionalAuthUser;
use crate::entity::message;
use crate::error::AppError;
use crate::response::{ResponseDto, FLASH_UNAUTHORIZED};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/").route(web::get().to(index)));
}

#[derive(Deserialize)]
struct HomeQuery {
    flash: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MessageDto {
    id: i32,
    user_id: i32,
    text: String,
    created: String,
}

/// Home feed: the latest warbles from followed users plus the viewer's own.
/// Anonymous visitors get an empty feed. Renders the flash message left by
/// an unauthorized redirect.
async fn index(
    db: web::Data<DatabaseConnection>,
    auth: OptionalAuthUser,
    query: web::Query<HomeQuery>,
) -> Result<HttpResponse, AppError> {
    let feed = match auth.0 {
        Some(auth) => {
            let sql = "select m.* from t_message m \
                where m.user_id in (select followee_id from t_follow where follower_id = ?) \
                or m.user_id = ? \
                order by m.created desc limit 100";
            let stmt = Statement::from_sql_and_values(
                db.get_database_backend(),
                sql,
                vec![auth.user_id.into(), auth.user_id.into()],
            );
            message::Entity::find()
                .from_raw_sql(stmt)
                .all(db.get_ref())
                .await
                .map_err(|_| AppError::system_exception())?
        }
        None => Vec::new(),
    };

    let flash = match query.flash.as_deref() {
        Some("unauthorized") => FLASH_UNAUTHORIZED,
        _ => "",
    };

    let list: Vec<MessageDto> = feed
        .into_iter()
        .map(|m| MessageDto {
            id: m.id,
            user_id: m.user_id,
            text: m.text,
            created: m.created.to_rfc3339_opts(SecondsFormat::Millis, false),
        })
        .collect();

    Ok(HttpResponse::Ok().json(ResponseDto::with_msg(Some(list), flash)))
}
