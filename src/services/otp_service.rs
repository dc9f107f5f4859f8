// src/services/otp_service.rs
use std::sync::Arc;

use chrono::{Duration, Utc};
use mongodb::bson::oid::ObjectId;
use rand::Rng;

use crate::errors::Result;
use crate::models::otp::OneTimePassword;
use crate::store::CredentialStore;

#[derive(Clone)]
pub struct OTPService {
    store: Arc<dyn CredentialStore>,
    ttl: Duration,
}

impl OTPService {
    pub fn new(store: Arc<dyn CredentialStore>, ttl_minutes: i64) -> Self {
        Self {
            store,
            ttl: Duration::minutes(ttl_minutes),
        }
    }

    // Uniform over 100000..=999999: six digits, never zero-padded.
    pub fn generate_code() -> String {
        let mut rng = rand::thread_rng();
        rng.gen_range(100_000..=999_999).to_string()
    }

    /// Mints and persists a fresh code for the user. Any code still
    /// outstanding for the same user is retired first, so at most one code
    /// is live per user at a time.
    pub async fn issue(&self, user_id: &ObjectId) -> Result<String> {
        let retired = self.store.invalidate_otps(user_id).await?;
        if retired > 0 {
            tracing::debug!("retired {} outstanding OTP(s) for {}", retired, user_id);
        }

        let code = Self::generate_code();
        let expires_at = Utc::now() + self.ttl;
        self.store
            .create_otp(OneTimePassword::new(*user_id, code.clone(), expires_at))
            .await?;
        Ok(code)
    }

    /// Accepts iff an unused, unexpired row matches the code, consuming it in
    /// the same step. Rejection mutates nothing.
    pub async fn validate(&self, user_id: &ObjectId, code: &str) -> Result<bool> {
        self.store.consume_otp(user_id, code).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn service() -> (OTPService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (OTPService::new(store.clone(), 10), store)
    }

    #[test]
    fn code_is_six_digits_without_padding() {
        for _ in 0..1_000 {
            let code = OTPService::generate_code();
            assert_eq!(code.len(), 6);
            let n: u32 = code.parse().unwrap();
            assert!((100_000..=999_999).contains(&n));
        }
    }

    #[tokio::test]
    async fn issued_code_validates_exactly_once() {
        let (svc, _) = service();
        let user_id = ObjectId::new();

        let code = svc.issue(&user_id).await.unwrap();
        assert!(svc.validate(&user_id, &code).await.unwrap());
        // consumed: the same code is never accepted again
        assert!(!svc.validate(&user_id, &code).await.unwrap());
    }

    #[tokio::test]
    async fn wrong_code_is_rejected_without_consuming() {
        let (svc, _) = service();
        let user_id = ObjectId::new();

        let code = svc.issue(&user_id).await.unwrap();
        let wrong = if code == "100000" { "100001" } else { "100000" };
        assert!(!svc.validate(&user_id, wrong).await.unwrap());
        // the real code is still live
        assert!(svc.validate(&user_id, &code).await.unwrap());
    }

    #[tokio::test]
    async fn code_for_other_user_is_rejected() {
        let (svc, _) = service();
        let user_id = ObjectId::new();

        let code = svc.issue(&user_id).await.unwrap();
        assert!(!svc.validate(&ObjectId::new(), &code).await.unwrap());
    }

    #[tokio::test]
    async fn expired_code_is_rejected_even_if_unused() {
        let (svc, store) = service();
        let user_id = ObjectId::new();

        let stale = OneTimePassword::new(
            user_id,
            "482913".to_string(),
            Utc::now() - Duration::minutes(1),
        );
        store.create_otp(stale).await.unwrap();

        assert!(!svc.validate(&user_id, "482913").await.unwrap());
    }

    #[tokio::test]
    async fn reissue_retires_previous_code() {
        let (svc, _) = service();
        let user_id = ObjectId::new();

        let first = svc.issue(&user_id).await.unwrap();
        let second = svc.issue(&user_id).await.unwrap();

        assert!(!svc.validate(&user_id, &first).await.unwrap());
        assert!(svc.validate(&user_id, &second).await.unwrap());
    }

    #[tokio::test]
    async fn concurrent_validation_has_exactly_one_winner() {
        let (svc, _) = service();
        let user_id = ObjectId::new();
        let code = svc.issue(&user_id).await.unwrap();

        let a = {
            let svc = svc.clone();
            let code = code.clone();
            tokio::spawn(async move { svc.validate(&user_id, &code).await.unwrap() })
        };
        let b = {
            let svc = svc.clone();
            let code = code.clone();
            tokio::spawn(async move { svc.validate(&user_id, &code).await.unwrap() })
        };

        let (a, b) = (a.await.unwrap(), b.await.unwrap());
        assert!(a ^ b, "exactly one of two concurrent validations may win");
    }
}
