use axum::{
    extract::State,
    http::StatusCode,
    response::Response,
    Extension, Json,
};
use axum_extra::extract::WithRejection;
use serde_json::json;
use validator::Validate;

use crate::dtos::auth_dtos::{
    ForgotPasswordRequest, ResetPasswordRequest, ResetTicketData, VerifyOTPRequest,
};
use crate::errors::{AppError, Result};
use crate::middleware::request_id::RequestId;
use crate::response::success_response;
use crate::services::mail_service::otp_email_body;
use crate::services::password::hash_password;
use crate::state::AppState;

// 1. Forgot Password - issue a code and mail it out-of-band.
pub async fn forgot_password(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    WithRejection(Json(payload), _): WithRejection<Json<ForgotPasswordRequest>, AppError>,
) -> Result<Response> {
    payload.validate()?;

    let user = state
        .store
        .find_user_by_email(&payload.email)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    let user_id = user
        ._id
        .ok_or_else(|| AppError::internal("User record has no id"))?;

    let code = state.otp.issue(&user_id).await?;

    // The code travels only by mail; a send failure is logged, never
    // surfaced to this request.
    let mailer = state.mailer.clone();
    let to = user.email.clone();
    let body = otp_email_body(&user.name, &code, state.otp_expire_minutes);
    tokio::spawn(async move {
        if let Err(e) = mailer.send(&to, "Your password reset code", &body).await {
            tracing::warn!("failed to send OTP email to {}: {}", to, e);
        }
    });

    Ok(success_response(
        StatusCode::OK,
        "OTP sent to your email",
        json!({}),
        Some(request_id.0),
    ))
}

// 2. Verify OTP - consume the code, hand back a reset ticket.
pub async fn verify_otp(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    WithRejection(Json(payload), _): WithRejection<Json<VerifyOTPRequest>, AppError>,
) -> Result<Response> {
    payload.validate()?;

    // An unknown email gets the same rejection as a wrong code.
    let user = state
        .store
        .find_user_by_email(&payload.email)
        .await?
        .ok_or(AppError::OtpRejected)?;

    let user_id = user
        ._id
        .ok_or_else(|| AppError::internal("User record has no id"))?;

    if !state.otp.validate(&user_id, &payload.code).await? {
        return Err(AppError::OtpRejected);
    }

    let reset_token = state.tokens.issue_reset_ticket(&user.id_hex())?;

    Ok(success_response(
        StatusCode::OK,
        "OTP verified successfully",
        ResetTicketData { reset_token },
        Some(request_id.0),
    ))
}

// 3. Reset Password - gated on the ticket minted by a verified OTP.
pub async fn reset_password(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    WithRejection(Json(payload), _): WithRejection<Json<ResetPasswordRequest>, AppError>,
) -> Result<Response> {
    payload.validate()?;

    let user = state
        .store
        .find_user_by_email(&payload.email)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    let subject = state
        .tokens
        .verify_reset_ticket(&payload.reset_token)
        .ok_or_else(|| AppError::unauthorized("Invalid or expired reset token"))?;

    if subject != user.id_hex() {
        return Err(AppError::unauthorized("Invalid or expired reset token"));
    }

    let user_id = user
        ._id
        .ok_or_else(|| AppError::internal("User record has no id"))?;

    let password_hash = hash_password(&payload.new_password)?;
    state
        .store
        .update_user_password(&user_id, &password_hash)
        .await?;

    // A ticket was burned; any code still outstanding is dead weight.
    state.store.invalidate_otps(&user_id).await?;

    Ok(success_response(
        StatusCode::OK,
        "Password reset successful",
        json!({}),
        Some(request_id.0),
    ))
}
