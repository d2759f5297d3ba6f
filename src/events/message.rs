use serde::{Deserialize, Serialize};

use crate::domain::dto::users::response::AccountSnapshot;

const RESOURCE_TYPE_USER: &str = "user";

/// 변경 종류. 메시지에는 HTTP 상태 코드 형태로 실립니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
}

impl ChangeKind {
    pub fn code(&self) -> u16 {
        match self {
            ChangeKind::Created => 201,
            ChangeKind::Updated => 200,
            ChangeKind::Deleted => 204,
        }
    }
}

/// 채널에 발행되는 메시지 본문
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccountEvent {
    pub message_type: u16,
    pub resource_type: String,
    pub user: AccountSnapshot,
}

impl AccountEvent {
    pub fn new(user: AccountSnapshot, kind: ChangeKind) -> Self {
        Self {
            message_type: kind.code(),
            resource_type: RESOURCE_TYPE_USER.to_string(),
            user,
        }
    }
}
