// src/response.rs
//
// Uniform success envelope shared by every handler:
// { code, status, message, data, error, metadata: { request_id } }
// Errors are wrapped by `AppError::into_response`.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

pub fn make_request_id() -> String {
    Uuid::new_v4().to_string()
}

pub fn success_response<T: Serialize>(
    code: StatusCode,
    message: &str,
    data: T,
    request_id: Option<String>,
) -> Response {
    let body = Json(json!({
        "code": code.as_u16(),
        "status": "success",
        "message": message,
        "data": data,
        "error": {},
        "metadata": {
            "request_id": request_id.unwrap_or_else(make_request_id),
        },
    }));

    (code, body).into_response()
}
