//! 신고(Flag) 엔티티
//!
//! `flags` 컬렉션에 (신고자, 신고 대상) 쌍마다 최대 하나만 저장됩니다.
//! 생성 후에는 수정되거나 삭제되지 않습니다.

use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Flag {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub flagger_id: ObjectId,
    pub flagged_username: String,
    pub reason: String,
    pub created_at: DateTime,
}

impl Flag {
    pub fn new(flagger_id: ObjectId, flagged_username: String, reason: String) -> Self {
        Self {
            id: ObjectId::new(),
            flagger_id,
            flagged_username,
            reason,
            created_at: DateTime::now(),
        }
    }
}
