// src/store/mongo.rs
use async_trait::async_trait;
use chrono::Utc;
use mongodb::bson::{doc, oid::ObjectId, DateTime};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::IndexOptions;
use mongodb::{Collection, Database, IndexModel};

use crate::errors::{AppError, Result};
use crate::models::otp::OneTimePassword;
use crate::models::user::User;
use crate::store::CredentialStore;

const USERS: &str = "users";
const OTPS: &str = "otps";

#[derive(Clone)]
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn users(&self) -> Collection<User> {
        self.db.collection(USERS)
    }

    fn otps(&self) -> Collection<OneTimePassword> {
        self.db.collection(OTPS)
    }

    /// Unique index on email: the register handler checks first, the index
    /// settles concurrent inserts of the same address.
    pub async fn ensure_indexes(&self) -> Result<()> {
        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.users().create_index(email_index).await?;

        let otp_index = IndexModel::builder()
            .keys(doc! { "user_id": 1, "code": 1 })
            .build();
        self.otps().create_index(otp_index).await?;

        Ok(())
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(we)) if we.code == 11000
    )
}

fn bson_now() -> DateTime {
    DateTime::from_millis(Utc::now().timestamp_millis())
}

#[async_trait]
impl CredentialStore for MongoStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self.users().find_one(doc! { "email": email }).await?)
    }

    async fn find_user_by_id(&self, id: &ObjectId) -> Result<Option<User>> {
        Ok(self.users().find_one(doc! { "_id": id }).await?)
    }

    async fn create_user(&self, user: User) -> Result<User> {
        match self.users().insert_one(&user).await {
            Ok(_) => Ok(user),
            Err(e) if is_duplicate_key(&e) => {
                Err(AppError::conflict("Email already registered"))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn update_user_password(&self, id: &ObjectId, password_hash: &str) -> Result<()> {
        let update = doc! {
            "$set": {
                "password_hash": password_hash,
                "updated_at": bson_now(),
            }
        };
        let result = self.users().update_one(doc! { "_id": id }, update).await?;
        if result.matched_count == 0 {
            return Err(AppError::not_found("User not found"));
        }
        Ok(())
    }

    async fn create_otp(&self, otp: OneTimePassword) -> Result<OneTimePassword> {
        self.otps().insert_one(&otp).await?;
        Ok(otp)
    }

    async fn consume_otp(&self, user_id: &ObjectId, code: &str) -> Result<bool> {
        // Single conditional read-modify-write: only one concurrent caller
        // can match `is_used: false` for a given row.
        let filter = doc! {
            "user_id": user_id,
            "code": code,
            "is_used": false,
            "expires_at": { "$gt": bson_now() },
        };
        let update = doc! { "$set": { "is_used": true } };

        let consumed = self.otps().find_one_and_update(filter, update).await?;
        Ok(consumed.is_some())
    }

    async fn invalidate_otps(&self, user_id: &ObjectId) -> Result<u64> {
        let filter = doc! { "user_id": user_id, "is_used": false };
        let update = doc! { "$set": { "is_used": true } };
        let result = self.otps().update_many(filter, update).await?;
        Ok(result.modified_count)
    }
}
