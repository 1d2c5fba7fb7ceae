use actix_web::{error::JsonPayloadError, http::header, HttpRequest, HttpResponse};
use serde::Serialize;

use crate::error::AppError;

/// Flash message shown by the home page after an unauthorized redirect.
pub const FLASH_UNAUTHORIZED: &str = "Access unauthorized.";

#[derive(Serialize)]
pub struct ResponseDto<T: Serialize> {
    pub data: Option<T>,
    pub code: i32,
    pub msg: String,
}

impl<T: Serialize> ResponseDto<T> {
    pub fn success(data: Option<T>) -> Self {
        Self {
            data,
            code: 0,
            msg: "".to_string(),
        }
    }

    pub fn with_msg(data: Option<T>, msg: impl Into<String>) -> Self {
        Self {
            data,
            code: 0,
            msg: msg.into(),
        }
    }
}

pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let app_err = match err {
        JsonPayloadError::ContentType => AppError::param_error("invalid request payload"),
        JsonPayloadError::Deserialize(_) => AppError::param_error("invalid request payload"),
        _ => AppError::param_error("invalid request payload"),
    };
    app_err.into()
}

pub fn response_from_error(err: &AppError) -> HttpResponse {
    HttpResponse::Ok().json(ResponseDto::<()> {
        data: None,
        code: err.code(),
        msg: err.msg().to_string(),
    })
}

/// 302 back to the home page, which renders the flash message.
pub fn unauthorized_redirect() -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, "/?flash=unauthorized"))
        .finish()
}
