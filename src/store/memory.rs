// src/store/memory.rs
use async_trait::async_trait;
use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use tokio::sync::Mutex;

use crate::errors::{AppError, Result};
use crate::models::otp::OneTimePassword;
use crate::models::user::User;
use crate::store::CredentialStore;

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    otps: Vec<OneTimePassword>,
}

/// In-process store used by the test suite. One mutex guards both tables, so
/// `consume_otp` is a single critical section just like the conditional
/// update on the database side.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let inner = self.inner.lock().await;
        Ok(inner.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: &ObjectId) -> Result<Option<User>> {
        let inner = self.inner.lock().await;
        Ok(inner.users.iter().find(|u| u._id == Some(*id)).cloned())
    }

    async fn create_user(&self, user: User) -> Result<User> {
        let mut inner = self.inner.lock().await;
        if inner.users.iter().any(|u| u.email == user.email) {
            return Err(AppError::conflict("Email already registered"));
        }
        inner.users.push(user.clone());
        Ok(user)
    }

    async fn update_user_password(&self, id: &ObjectId, password_hash: &str) -> Result<()> {
        let mut inner = self.inner.lock().await;
        let user = inner
            .users
            .iter_mut()
            .find(|u| u._id == Some(*id))
            .ok_or_else(|| AppError::not_found("User not found"))?;
        user.password_hash = password_hash.to_string();
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn create_otp(&self, otp: OneTimePassword) -> Result<OneTimePassword> {
        let mut inner = self.inner.lock().await;
        inner.otps.push(otp.clone());
        Ok(otp)
    }

    async fn consume_otp(&self, user_id: &ObjectId, code: &str) -> Result<bool> {
        let mut inner = self.inner.lock().await;
        let now = Utc::now();
        match inner
            .otps
            .iter_mut()
            .find(|o| o.user_id == *user_id && o.code == code && !o.is_used && o.expires_at > now)
        {
            Some(otp) => {
                otp.is_used = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn invalidate_otps(&self, user_id: &ObjectId) -> Result<u64> {
        let mut inner = self.inner.lock().await;
        let mut retired = 0;
        for otp in inner
            .otps
            .iter_mut()
            .filter(|o| o.user_id == *user_id && !o.is_used)
        {
            otp.is_used = true;
            retired += 1;
        }
        Ok(retired)
    }
}
