// src/store/mod.rs
//
// Persistence seam for the auth subsystem. The handlers and services only
// know this trait; MongoDB is the production backend and `MemoryStore` backs
// the tests.
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

use crate::errors::Result;
use crate::models::otp::OneTimePassword;
use crate::models::user::User;

pub mod memory;
pub mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn find_user_by_id(&self, id: &ObjectId) -> Result<Option<User>>;

    /// Fails with a conflict when the email is already taken.
    async fn create_user(&self, user: User) -> Result<User>;

    async fn update_user_password(&self, id: &ObjectId, password_hash: &str) -> Result<()>;

    async fn create_otp(&self, otp: OneTimePassword) -> Result<OneTimePassword>;

    /// Atomically flips a matching, unused, unexpired code to used.
    /// Returns true for exactly one of any set of concurrent callers
    /// presenting the same code; false callers see no mutation.
    async fn consume_otp(&self, user_id: &ObjectId, code: &str) -> Result<bool>;

    /// Marks every outstanding unused code for the user as used, returning
    /// how many were retired.
    async fn invalidate_otps(&self, user_id: &ObjectId) -> Result<u64>;
}
