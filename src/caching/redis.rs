//! Redis 클라이언트
//!
//! 조회 캐시([`LookupCache`])와 계정 변경 이벤트 채널(PUBLISH)에 함께 쓰입니다.
//! 연산마다 멀티플렉스 연결을 얻고, 스코프를 벗어나면 반환됩니다.

use async_trait::async_trait;
use log::info;
use redis::{AsyncCommands, Client};
use serde::{de::DeserializeOwned, Serialize};

use super::lookup_cache::LookupCache;
use crate::config::CacheConfig;
use crate::core::errors::CacheError;
use crate::domain::dto::users::response::UserResponse;

#[derive(Clone)]
pub struct RedisClient {
    client: Client,
}

impl RedisClient {
    /// `REDIS_URL`로 연결하고 PING으로 확인합니다.
    pub async fn new() -> Result<Self, redis::RedisError> {
        let client = Client::open(CacheConfig::redis_url())?;

        let mut conn = client.get_multiplexed_async_connection().await?;
        redis::cmd("PING").query_async::<()>(&mut conn).await?;

        info!("✅ Redis 연결 성공");
        Ok(Self { client })
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, redis::RedisError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let value: Option<String> = conn.get(key).await?;

        match value {
            Some(json) => {
                let deserialized = serde_json::from_str(&json).map_err(|e| {
                    redis::RedisError::from((redis::ErrorKind::TypeError, "Deserialization failed", e.to_string()))
                })?;
                Ok(Some(deserialized))
            }
            None => Ok(None),
        }
    }

    pub async fn set_with_expiry<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        seconds: u64,
    ) -> Result<(), redis::RedisError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let json = serde_json::to_string(value).map_err(|e| {
            redis::RedisError::from((redis::ErrorKind::TypeError, "Serialization failed", e.to_string()))
        })?;
        conn.set_ex(key, json, seconds).await
    }

    pub async fn del(&self, key: &str) -> Result<(), redis::RedisError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.del(key).await
    }

    /// 채널에 문자열 메시지를 발행하고 수신한 구독자 수를 돌려줍니다.
    pub async fn publish(&self, channel: &str, payload: String) -> Result<i64, redis::RedisError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.publish(channel, payload).await
    }
}

fn cache_error(e: redis::RedisError) -> CacheError {
    if e.kind() == redis::ErrorKind::TypeError {
        CacheError::Serialization(e.to_string())
    } else {
        CacheError::Backend(e.to_string())
    }
}

#[async_trait]
impl LookupCache for RedisClient {
    async fn get_summary(&self, key: &str) -> Result<Option<UserResponse>, CacheError> {
        self.get::<UserResponse>(key).await.map_err(cache_error)
    }

    async fn set_summary(
        &self,
        key: &str,
        summary: &UserResponse,
        ttl_seconds: u64,
    ) -> Result<(), CacheError> {
        self.set_with_expiry(key, summary, ttl_seconds)
            .await
            .map_err(cache_error)
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.del(key).await.map_err(cache_error)
    }
}
