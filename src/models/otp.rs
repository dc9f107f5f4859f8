use chrono::{DateTime, Utc};
use mongodb::bson;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

// One row per issued code. The code is stored as text so a leading digit is
// never lost, and `is_used` only ever flips false -> true.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneTimePassword {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,
    pub user_id: ObjectId,
    pub code: String,
    pub is_used: bool,

    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,

    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub expires_at: DateTime<Utc>,
}

impl OneTimePassword {
    pub fn new(user_id: ObjectId, code: String, expires_at: DateTime<Utc>) -> Self {
        OneTimePassword {
            _id: Some(ObjectId::new()),
            user_id,
            code,
            is_used: false,
            created_at: Utc::now(),
            expires_at,
        }
    }
}
