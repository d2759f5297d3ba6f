//! # Core Module
//!
//! 계층 전체가 공유하는 에러 타입을 둡니다.
//!
//! - 저장소/캐시/이벤트 계층: [`errors::StoreError`], [`errors::CacheError`], [`errors::EventError`]
//! - 관계 변경: [`errors::BlockError`], [`errors::FollowError`]
//! - HTTP 경계: [`errors::AppError`] (`actix_web::ResponseError` 구현)
//!
//! 하위 에러는 `From` 구현으로 `AppError`에 합쳐지므로 핸들러와 서비스에서는 `?`로 전파합니다.

pub mod errors;

pub use errors::*;
