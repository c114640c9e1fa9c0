use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use log::{error, warn};
use thiserror::Error;

use crate::db::errors::RecordError;

pub const DUPLICATE_EMAIL: &str = "Email already exists. Please use a different email.";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not Found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Database Error: {0}")]
    DatabaseError(String),
    #[error("Internal Server Error: {0}")]
    InternalServerError(String),
}

impl AppError {
    fn public_message(&self) -> &str {
        match self {
            AppError::NotFound(msg) | AppError::Conflict(msg) => msg,
            AppError::DatabaseError(_) => "Database error",
            AppError::InternalServerError(_) => "Something went wrong",
        }
    }
}

impl From<RecordError> for AppError {
    fn from(err: RecordError) -> Self {
        match err {
            RecordError::NotFound => AppError::NotFound("Employee not found".to_string()),
            RecordError::Conflict { constraint, message } => {
                warn!("Unique violation on {:?}: {}", constraint, message);
                AppError::Conflict(DUPLICATE_EMAIL.to_string())
            }
            RecordError::Store(e) => {
                error!("Database error: {:?}", e);
                AppError::DatabaseError(e.to_string())
            }
        }
    }
}

impl From<minijinja::Error> for AppError {
    fn from(err: minijinja::Error) -> Self {
        error!("Template error: {:#}", err);
        AppError::InternalServerError(err.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        error!("CSV error: {}", err);
        AppError::InternalServerError(err.to_string())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let body = format!(
            "<!doctype html><html><head><title>{code}</title></head><body>\
             <h1>{code} {reason}</h1><p>{message}</p><p><a href=\"/\">Back to employees</a></p>\
             </body></html>",
            code = status.as_u16(),
            reason = status.canonical_reason().unwrap_or(""),
            message = self.public_message(),
        );
        HttpResponse::build(status).content_type(ContentType::html()).body(body)
    }
}
