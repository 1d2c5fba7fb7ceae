use actix_web::{http::StatusCode, ResponseError};
use thiserror::Error;

use crate::response::{response_from_error, unauthorized_redirect};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{msg}")]
    Biz { code: i32, msg: String },
    /// Anonymous viewer, stale session, or wrong owner. Rendered as the
    /// redirect-plus-flash the original app showed, never as a 5xx.
    #[error("Access unauthorized.")]
    Unauthorized,
}

impl AppError {
    pub fn param_error(msg: impl Into<String>) -> Self {
        Self::Biz { code: 1, msg: msg.into() }
    }

    pub fn fail(msg: impl Into<String>) -> Self {
        Self::Biz { code: 2, msg: msg.into() }
    }

    pub fn unauthorized() -> Self {
        Self::Unauthorized
    }

    pub fn system_exception() -> Self {
        Self::Biz { code: 99, msg: "system exception".to_string() }
    }

    pub fn code(&self) -> i32 {
        match self {
            Self::Biz { code, .. } => *code,
            Self::Unauthorized => 3,
        }
    }

    pub fn msg(&self) -> &str {
        match self {
            Self::Biz { msg, .. } => msg,
            Self::Unauthorized => "Access unauthorized.",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Biz { .. } => StatusCode::OK,
            Self::Unauthorized => StatusCode::FOUND,
        }
    }

    fn error_response(&self) -> actix_web::HttpResponse {
        match self {
            Self::Biz { .. } => response_from_error(self),
            Self::Unauthorized => unauthorized_redirect(),
        }
    }
}
