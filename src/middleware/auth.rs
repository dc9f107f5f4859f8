use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
};
use axum_extra::extract::CookieJar;
use mongodb::bson::oid::ObjectId;

use crate::errors::AppError;
use crate::models::user::User;
use crate::state::AppState;

/// Required-auth extractor: rejects with 401 when the request carries no
/// usable identity.
pub struct CurrentUser(pub User);

/// Optional-auth extractor: resolves to `None` for anonymous requests and
/// for requests carrying an invalid token alike.
pub struct MaybeUser(pub Option<User>);

/// Token transport: `Authorization: Bearer <token>` first, then the
/// `access_token` cookie, then the legacy `token` cookie.
fn extract_token(parts: &Parts, jar: &CookieJar) -> Option<String> {
    let header_token = parts
        .headers
        .get("authorization")
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .map(str::to_owned);

    if header_token.is_some() {
        return header_token;
    }

    jar.get("access_token")
        .or_else(|| jar.get("token"))
        .map(|cookie| cookie.value().to_string())
}

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);

        let Some(token) = extract_token(parts, &jar) else {
            return Ok(MaybeUser(None));
        };

        // Invalid token, unparseable subject, and vanished user all resolve
        // to anonymous here; the required-auth wrapper turns that into 401.
        let Some(subject) = state.tokens.verify(&token) else {
            return Ok(MaybeUser(None));
        };
        let Ok(user_id) = ObjectId::parse_str(&subject) else {
            return Ok(MaybeUser(None));
        };

        let user = state.store.find_user_by_id(&user_id).await?;
        Ok(MaybeUser(user))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match MaybeUser::from_request_parts(parts, state).await? {
            MaybeUser(Some(user)) => Ok(CurrentUser(user)),
            MaybeUser(None) => Err(AppError::unauthorized("Unauthorized")),
        }
    }
}
