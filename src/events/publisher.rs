use std::sync::Arc;

use async_trait::async_trait;
use log::debug;

use super::emitter::EventEmitter;
use super::message::{AccountEvent, ChangeKind};
use crate::caching::redis::RedisClient;
use crate::core::errors::EventError;
use crate::domain::dto::users::response::AccountSnapshot;

/// Redis PUBLISH 기반 이벤트 발행기
pub struct RedisEventPublisher {
    redis: Arc<RedisClient>,
    channel: String,
}

impl RedisEventPublisher {
    pub fn new(redis: Arc<RedisClient>, channel: impl Into<String>) -> Self {
        Self {
            redis,
            channel: channel.into(),
        }
    }

    pub(crate) fn encode(snapshot: AccountSnapshot, kind: ChangeKind) -> Result<String, EventError> {
        serde_json::to_string(&AccountEvent::new(snapshot, kind))
            .map_err(|e| EventError::Encoding(e.to_string()))
    }
}

#[async_trait]
impl EventEmitter for RedisEventPublisher {
    async fn publish(&self, snapshot: AccountSnapshot, kind: ChangeKind) -> Result<(), EventError> {
        let username = snapshot.summary.username.clone();
        let payload = Self::encode(snapshot, kind)?;

        let receivers = self
            .redis
            .publish(&self.channel, payload)
            .await
            .map_err(|e| EventError::Delivery(e.to_string()))?;

        debug!(
            "📨 이벤트 발행: channel={}, user={}, type={}, receivers={}",
            self.channel,
            username,
            kind.code(),
            receivers
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::users::user::Account;
    use mongodb::bson::oid::ObjectId;

    #[test]
    fn test_encoded_event_shape() {
        let mut account = Account::new_local(
            "bob".to_string(),
            "bob@example.com".to_string(),
            "hash".to_string(),
            "code".to_string(),
        );
        account.id = Some(ObjectId::new());

        let payload = RedisEventPublisher::encode(AccountSnapshot::from(account), ChangeKind::Updated).unwrap();
        let value: serde_json::Value = serde_json::from_str(&payload).unwrap();

        assert_eq!(value["message_type"], 200);
        assert_eq!(value["resource_type"], "user");
        assert_eq!(value["user"]["username"], "bob");
        assert!(value["user"].get("password_hash").is_none());
    }
}
