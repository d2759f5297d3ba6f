//! 사용자 계정 서비스 백엔드
//!
//! 가입, 로그인, 프로필, 신고와 함께 차단/팔로우 관계를 관리합니다.
//! 관계 변경은 두 계정 문서를 하나의 트랜잭션으로 갱신하고, 커밋 후
//! 조회 캐시 무효화와 변경 이벤트 발행을 백그라운드로 시작합니다.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │   HTTP Routes   │ ← REST API 엔드포인트
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │    Handlers     │ ← 요청/응답 처리, AuthenticatedUser 추출
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐      ┌──────────────────────────┐
//! │    Services     │ ───▶ │ SideEffects (tokio::spawn)│
//! └─────────────────┘      └──────────────────────────┘
//!          │                    │               │
//!          ▼                    ▼               ▼
//! ┌─────────────────┐   ┌─────────────┐  ┌──────────────┐
//! │  AccountStore   │   │ LookupCache │  │ EventEmitter │
//! └─────────────────┘   └─────────────┘  └──────────────┘
//!          │                    │               │
//!          ▼                    └──── Redis ────┘
//!       MongoDB
//! ```
//!
//! # Examples
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use user_account_service::app_state::AppState;
//!
//! let store = Arc::new(MongoAccountStore::new(database));
//! let state = AppState::new(store, redis.clone(), events, tokens, ServiceSettings::from_config());
//! state.accounts.block_user(&actor_id, "bob").await?;
//! ```

pub mod app_state;
pub mod caching;
pub mod config;
pub mod core;
pub mod db;
pub mod domain;
pub mod events;
pub mod handlers;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;
