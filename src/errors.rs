// src/errors.rs
use std::collections::HashMap;

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("Validation error")]
    Validation { fields: HashMap<String, Vec<String>> },

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("OTP is invalid, expired, or already used")]
    OtpRejected,

    #[error("Mail provider error: {0}")]
    MailProvider(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, status_label, message, details, fields) = match self {
            AppError::Database(ref e) => {
                tracing::error!("database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "error",
                    "Internal server error".to_string(),
                    "Database error".to_string(),
                    json!({}),
                )
            }
            AppError::Validation { fields } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "fail",
                "Validation error".to_string(),
                "Invalid input".to_string(),
                json!(fields),
            ),
            AppError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, "error", msg.clone(), msg, json!({}))
            }
            AppError::Conflict(msg) => {
                (StatusCode::CONFLICT, "error", msg.clone(), msg, json!({}))
            }
            AppError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, "error", msg.clone(), msg, json!({}))
            }
            AppError::OtpRejected => {
                let msg = "OTP is invalid, expired, or already used".to_string();
                (StatusCode::BAD_REQUEST, "error", msg.clone(), msg, json!({}))
            }
            AppError::MailProvider(ref e) => {
                tracing::error!("mail provider error: {}", e);
                (
                    StatusCode::BAD_GATEWAY,
                    "error",
                    "Mail provider error".to_string(),
                    "Mail provider error".to_string(),
                    json!({}),
                )
            }
            AppError::Internal(ref e) => {
                tracing::error!("internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "error",
                    "Internal server error".to_string(),
                    e.clone(),
                    json!({}),
                )
            }
        };

        let body = Json(json!({
            "code": status.as_u16(),
            "status": status_label,
            "message": message,
            "data": {},
            "error": {
                "error_id": Uuid::new_v4().to_string(),
                "details": details,
                "fields": fields,
            },
            "metadata": {
                "request_id": Uuid::new_v4().to_string(),
            },
        }));

        (status, body).into_response()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let fields = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let messages = errs
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| format!("invalid value for {}", field))
                    })
                    .collect();
                (field.to_string(), messages)
            })
            .collect();
        AppError::Validation { fields }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let mut fields = HashMap::new();
        fields.insert("body".to_string(), vec![rejection.body_text()]);
        AppError::Validation { fields }
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(err: bcrypt::BcryptError) -> Self {
        AppError::Internal(format!("Password hashing failed: {}", err))
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        AppError::Internal(format!("Token encoding failed: {}", err))
    }
}

// Helper constructors
impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        AppError::Conflict(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        AppError::Unauthorized(msg.into())
    }

    pub fn validation(field: impl Into<String>, msg: impl Into<String>) -> Self {
        let mut fields = HashMap::new();
        fields.insert(field.into(), vec![msg.into()]);
        AppError::Validation { fields }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
