use axum::{
    extract::State,
    http::StatusCode,
    response::Response,
    Extension, Json,
};
use axum_extra::extract::WithRejection;
use validator::Validate;

use crate::dtos::auth_dtos::TokenData;
use crate::errors::{AppError, Result};
use crate::middleware::auth::CurrentUser;
use crate::middleware::request_id::RequestId;
use crate::models::user::{LoginRequest, RegisterRequest, User, UserResponse};
use crate::response::success_response;
use crate::services::mail_service::welcome_email_body;
use crate::services::password::{hash_password, verify_password};
use crate::state::AppState;

pub async fn register(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    WithRejection(Json(payload), _): WithRejection<Json<RegisterRequest>, AppError>,
) -> Result<Response> {
    payload.validate()?;

    if state
        .store
        .find_user_by_email(&payload.email)
        .await?
        .is_some()
    {
        return Err(AppError::conflict("Email already registered"));
    }

    let password_hash = hash_password(&payload.password)?;
    let user = User::new(payload.name, payload.email, password_hash, payload.phone);
    let user = state.store.create_user(user).await?;

    let mailer = state.mailer.clone();
    let to = user.email.clone();
    let body = welcome_email_body(&user.name);
    tokio::spawn(async move {
        if let Err(e) = mailer.send(&to, "Welcome!", &body).await {
            tracing::warn!("failed to send welcome email to {}: {}", to, e);
        }
    });

    Ok(success_response(
        StatusCode::CREATED,
        "User registered successfully",
        UserResponse::from(&user),
        Some(request_id.0),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    WithRejection(Json(payload), _): WithRejection<Json<LoginRequest>, AppError>,
) -> Result<Response> {
    payload.validate()?;

    // Unknown email and wrong password collapse into the same 401.
    let user = state
        .store
        .find_user_by_email(&payload.email)
        .await?
        .ok_or_else(|| AppError::unauthorized("Invalid credentials"))?;

    if !verify_password(&payload.password, &user.password_hash) {
        return Err(AppError::unauthorized("Invalid credentials"));
    }

    let access_token = state.tokens.issue(&user.id_hex())?;

    Ok(success_response(
        StatusCode::OK,
        "Login successful",
        TokenData {
            access_token,
            token_type: "bearer".to_string(),
        },
        Some(request_id.0),
    ))
}

pub async fn me(
    Extension(request_id): Extension<RequestId>,
    CurrentUser(user): CurrentUser,
) -> Result<Response> {
    Ok(success_response(
        StatusCode::OK,
        "User info retrieved successfully",
        UserResponse::from(&user),
        Some(request_id.0),
    ))
}
