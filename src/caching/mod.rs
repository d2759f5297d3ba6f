//! 조회 캐시
//!
//! 사용자명으로 조회한 계정 요약을 `"<username>:<purpose>"` 키로 Redis에 보관합니다.
//! 정합성에 필요한 연산은 삭제(무효화)뿐이고, 저장은 최적화입니다.

pub mod keys;
pub mod lookup_cache;
pub mod redis;

pub use keys::{cache_key, user_lookup_key, FIND_USER_BY_USERNAME};
pub use lookup_cache::LookupCache;
