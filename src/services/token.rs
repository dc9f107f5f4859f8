// src/services/token.rs
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::models::user::Claims;

const RESET_PURPOSE: &str = "password_reset";

#[derive(Debug, Serialize, Deserialize)]
struct ResetClaims {
    sub: String,
    purpose: String,
    iat: i64,
    exp: i64,
}

/// Issues and checks the two signed credentials of the subsystem: bearer
/// access tokens and the short-lived reset tickets handed out by a
/// successful OTP verification. Both are HS256 over the same server secret;
/// the `purpose` claim keeps them from standing in for each other.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl: Duration,
    reset_ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, access_ttl_minutes: i64, reset_ttl_minutes: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl: Duration::minutes(access_ttl_minutes),
            reset_ttl: Duration::minutes(reset_ttl_minutes),
        }
    }

    pub fn issue(&self, subject: &str) -> Result<String> {
        self.issue_with_ttl(subject, self.access_ttl)
    }

    pub fn issue_with_ttl(&self, subject: &str, ttl: Duration) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    /// Bad signature, malformed payload, expired, and missing subject all
    /// collapse to `None`; callers cannot tell the cases apart.
    pub fn verify(&self, token: &str) -> Option<String> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding_key, &validation).ok()?;

        // `exp` must be strictly in the future: a ttl=0 token is never valid.
        if data.claims.exp <= Utc::now().timestamp() {
            return None;
        }
        if data.claims.sub.is_empty() {
            return None;
        }
        Some(data.claims.sub)
    }

    pub fn issue_reset_ticket(&self, subject: &str) -> Result<String> {
        let now = Utc::now();
        let claims = ResetClaims {
            sub: subject.to_string(),
            purpose: RESET_PURPOSE.to_string(),
            iat: now.timestamp(),
            exp: (now + self.reset_ttl).timestamp(),
        };
        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    pub fn verify_reset_ticket(&self, token: &str) -> Option<String> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let data = decode::<ResetClaims>(token, &self.decoding_key, &validation).ok()?;

        if data.claims.purpose != RESET_PURPOSE {
            return None;
        }
        if data.claims.exp <= Utc::now().timestamp() {
            return None;
        }
        if data.claims.sub.is_empty() {
            return None;
        }
        Some(data.claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new("test-secret", 30, 10)
    }

    #[test]
    fn issued_token_verifies_to_subject() {
        let svc = service();
        let token = svc.issue("user-123").unwrap();
        assert_eq!(svc.verify(&token), Some("user-123".to_string()));
    }

    #[test]
    fn zero_ttl_token_is_rejected() {
        let svc = service();
        let token = svc.issue_with_ttl("user-123", Duration::zero()).unwrap();
        assert_eq!(svc.verify(&token), None);
    }

    #[test]
    fn expired_token_is_rejected() {
        let svc = service();
        let token = svc.issue_with_ttl("user-123", Duration::seconds(-5)).unwrap();
        assert_eq!(svc.verify(&token), None);
    }

    #[test]
    fn tampered_token_is_rejected() {
        let svc = service();
        let token = svc.issue("user-123").unwrap();
        let mut bytes = token.into_bytes();
        let last = bytes.len() - 1;
        bytes[last] = if bytes[last] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).unwrap();
        assert_eq!(svc.verify(&tampered), None);
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert_eq!(service().verify("not.a.jwt"), None);
        assert_eq!(service().verify(""), None);
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let other = TokenService::new("other-secret", 30, 10);
        let token = other.issue("user-123").unwrap();
        assert_eq!(service().verify(&token), None);
    }

    #[test]
    fn access_token_is_not_a_reset_ticket() {
        let svc = service();
        let access = svc.issue("user-123").unwrap();
        assert_eq!(svc.verify_reset_ticket(&access), None);
    }

    #[test]
    fn reset_ticket_round_trip() {
        let svc = service();
        let ticket = svc.issue_reset_ticket("user-123").unwrap();
        assert_eq!(svc.verify_reset_ticket(&ticket), Some("user-123".to_string()));
        // and the ticket must not double as an access token
        assert_eq!(svc.verify(&ticket), None);
    }
}
