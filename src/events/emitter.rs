use async_trait::async_trait;

use super::message::ChangeKind;
use crate::core::errors::EventError;
use crate::domain::dto::users::response::AccountSnapshot;

/// 계정 변경 알림 발행 포트
#[async_trait]
pub trait EventEmitter: Send + Sync {
    async fn publish(&self, snapshot: AccountSnapshot, kind: ChangeKind) -> Result<(), EventError>;
}
