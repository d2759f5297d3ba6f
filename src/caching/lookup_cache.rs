use async_trait::async_trait;

use crate::core::errors::CacheError;
use crate::domain::dto::users::response::UserResponse;

/// 계정 요약 캐시 포트
#[async_trait]
pub trait LookupCache: Send + Sync {
    async fn get_summary(&self, key: &str) -> Result<Option<UserResponse>, CacheError>;

    async fn set_summary(
        &self,
        key: &str,
        summary: &UserResponse,
        ttl_seconds: u64,
    ) -> Result<(), CacheError>;

    /// 키가 없어도 성공입니다.
    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}
