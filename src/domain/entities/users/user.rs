//! 계정 엔티티
//!
//! MongoDB `users` 컬렉션에 저장되는 문서 구조입니다.
//! 차단 관계(`block_list` / `blocked_by_list`)와 팔로우 관계(`following` / `followers`)는
//! 두 문서에 나뉘어 저장되며, 양쪽을 함께 갱신하는 일은
//! [`RelationshipMutator`](crate::services::users::relationship_service::RelationshipMutator)가 담당합니다.

use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

use crate::core::errors::StoreError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Account {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub username: String,
    pub email: String,
    pub password_hash: String,

    /// 이 계정이 차단한 계정 ID 목록 (차단 순서 유지)
    #[serde(default)]
    pub block_list: Vec<ObjectId>,

    /// 이 계정을 차단한 계정 ID 목록
    #[serde(default)]
    pub blocked_by_list: Vec<ObjectId>,

    /// 팔로우 중인 사용자명
    #[serde(default)]
    pub following: Vec<String>,

    /// 팔로워 사용자명
    #[serde(default)]
    pub followers: Vec<String>,

    /// `followers` 길이의 비정규화 값
    #[serde(default)]
    pub follower_count: i64,

    /// 이 계정에 대한 신고(Flag) ID 목록
    #[serde(default)]
    pub flag_count: Vec<ObjectId>,

    pub profile_is_viewable: bool,
    pub accept_messages: bool,
    pub display_follower_count: bool,
    pub is_verified: bool,
    pub is_locked: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_code: Option<String>,

    /// 비밀번호 재설정 토큰. 재설정이 끝나면 지워집니다.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_hash: Option<String>,

    /// 재설정 토큰 만료 시각 (unix 초)
    #[serde(default)]
    pub token_expires_at: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_tag_line: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_badge_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_background_picture_url: Option<String>,

    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl Account {
    /// 가입 직후의 계정을 만듭니다.
    ///
    /// 프로필 공개, 메시지 수신, 팔로워 수 표시가 켜진 상태로 시작하며
    /// 관계 목록은 모두 비어 있습니다.
    pub fn new_local(
        username: String,
        email: String,
        password_hash: String,
        verification_code: String,
    ) -> Self {
        let now = DateTime::now();

        Self {
            id: None,
            username,
            email,
            password_hash,
            block_list: Vec::new(),
            blocked_by_list: Vec::new(),
            following: Vec::new(),
            followers: Vec::new(),
            follower_count: 0,
            flag_count: Vec::new(),
            profile_is_viewable: true,
            accept_messages: true,
            display_follower_count: true,
            is_verified: false,
            is_locked: false,
            verification_code: Some(verification_code),
            token_hash: None,
            token_expires_at: 0,
            current_tag_line: None,
            current_badge_url: None,
            profile_picture_url: None,
            profile_background_picture_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id_string(&self) -> Option<String> {
        self.id.as_ref().map(|id| id.to_hex())
    }

    /// 저장소에서 읽은 계정의 ID. 저장되지 않은 계정이면 에러입니다.
    pub fn object_id(&self) -> Result<ObjectId, StoreError> {
        self.id
            .ok_or_else(|| StoreError::InvalidId(format!("account '{}' has no id", self.username)))
    }

    pub fn is_blocked_by(&self, other: &ObjectId) -> bool {
        self.blocked_by_list.contains(other)
    }

    /// `now` 시점에 쓸 수 있는 재설정 토큰
    pub fn active_reset_token(&self, now: i64) -> Option<&str> {
        self.token_hash
            .as_deref()
            .filter(|token| !token.is_empty() && self.token_expires_at >= now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_local_defaults() {
        let account = Account::new_local(
            "alice".to_string(),
            "alice@example.com".to_string(),
            "hash".to_string(),
            "code".to_string(),
        );

        assert!(account.id.is_none());
        assert!(account.profile_is_viewable);
        assert!(account.accept_messages);
        assert!(account.display_follower_count);
        assert!(!account.is_verified);
        assert!(!account.is_locked);
        assert!(account.block_list.is_empty());
        assert!(account.followers.is_empty());
        assert_eq!(account.follower_count, 0);
        assert!(account.object_id().is_err());
        assert!(account.token_hash.is_none());
    }

    #[test]
    fn test_active_reset_token_respects_expiry() {
        let mut account = Account::new_local(
            "alice".to_string(),
            "alice@example.com".to_string(),
            "hash".to_string(),
            "code".to_string(),
        );
        assert_eq!(account.active_reset_token(100), None);

        account.token_hash = Some("token".to_string());
        account.token_expires_at = 200;
        assert_eq!(account.active_reset_token(100), Some("token"));
        assert_eq!(account.active_reset_token(200), Some("token"));
        assert_eq!(account.active_reset_token(201), None);
    }

    #[test]
    fn test_missing_lists_deserialize_as_empty() {
        let doc = mongodb::bson::doc! {
            "_id": ObjectId::new(),
            "username": "bob",
            "email": "bob@example.com",
            "password_hash": "hash",
            "profile_is_viewable": true,
            "accept_messages": true,
            "display_follower_count": false,
            "is_verified": true,
            "is_locked": false,
            "created_at": DateTime::now(),
            "updated_at": DateTime::now(),
        };

        let account: Account = mongodb::bson::from_document(doc).unwrap();
        assert!(account.blocked_by_list.is_empty());
        assert!(account.following.is_empty());
        assert_eq!(account.follower_count, 0);
        assert_eq!(account.token_expires_at, 0);
    }
}
