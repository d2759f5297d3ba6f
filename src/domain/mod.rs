//! # Domain Layer Module
//!
//! ```text
//! Domain Layer (이 모듈)
//! ├── entities  - MongoDB에 저장되는 계정, 신고
//! ├── dto       - HTTP 요청/응답, 캐시 요약, 이벤트 스냅샷
//! └── models    - 인증 주체, 토큰 클레임, 프로필 변경
//! ```

pub mod dto;
pub mod entities;
pub mod models;
