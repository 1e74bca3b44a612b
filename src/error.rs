//! API error type shared by domain functions and handlers.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use derive_more::Display;
use sea_orm::DbErr;
use serde_json::json;
use std::collections::BTreeMap;

/// Key used for errors that do not belong to a single field.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// Field name to list of messages.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug, Display)]
pub enum ApiError {
    #[display(fmt = "validation failed: {:?}", _0)]
    Validation(FieldErrors),
    #[display(fmt = "{}", _0)]
    NotFound(String),
    #[display(fmt = "{}", _0)]
    Unauthorized(String),
    #[display(fmt = "{}", _0)]
    Forbidden(String),
    #[display(fmt = "internal error: {}", _0)]
    Internal(String),
}

impl ApiError {
    /// A validation error attached to one field.
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.to_owned(), vec![message.into()]);
        ApiError::Validation(errors)
    }

    /// A validation error about the payload as a whole.
    pub fn non_field(message: impl Into<String>) -> Self {
        Self::field(NON_FIELD_ERRORS, message)
    }

    pub fn not_found(what: &str) -> Self {
        ApiError::NotFound(format!("{} not found.", what))
    }

    pub fn unauthenticated() -> Self {
        ApiError::Unauthorized("Authentication credentials were not provided.".to_owned())
    }

    pub fn forbidden() -> Self {
        ApiError::Forbidden("You do not have permission to perform this action.".to_owned())
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            ApiError::Validation(errors) => json!(errors),
            ApiError::NotFound(detail)
            | ApiError::Unauthorized(detail)
            | ApiError::Forbidden(detail) => json!({ "detail": detail }),
            ApiError::Internal(_) => json!({ "detail": "Internal server error." }),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        log::error!("database error: {:?}", err);
        ApiError::Internal(err.to_string())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields = FieldErrors::new();
        for (field, errs) in errors.field_errors() {
            let messages = errs
                .iter()
                .map(|e| match &e.message {
                    Some(message) => message.to_string(),
                    None => format!("Invalid value ({}).", e.code),
                })
                .collect();
            fields.insert(field.to_string(), messages);
        }
        if fields.is_empty() {
            fields.insert(NON_FIELD_ERRORS.to_owned(), vec!["Invalid data.".to_owned()]);
        }
        ApiError::Validation(fields)
    }
}

impl From<crate::storage::StorageError> for ApiError {
    fn from(err: crate::storage::StorageError) -> Self {
        log::error!("storage error: {}", err);
        ApiError::Internal(err.to_string())
    }
}

/// True when the error was raised by a uniqueness constraint.
///
/// sea-orm surfaces driver errors as strings; both SQLite ("UNIQUE constraint
/// failed") and Postgres ("duplicate key value violates unique constraint")
/// mention the constraint kind.
pub fn is_unique_violation(err: &DbErr) -> bool {
    match err {
        DbErr::Exec(message) | DbErr::Query(message) => {
            message.to_lowercase().contains("unique")
        }
        _ => false,
    }
}
