//! # Configuration Module
//!
//! 환경 변수 기반 설정값을 한곳에서 관리합니다.
//! 각 설정 구조체는 상태가 없고 `XxxConfig::field()` 형태의 정적 함수로 값을 읽습니다.
//!
//! - [`data_config`] - 데이터베이스, 캐시, 이벤트, 트랜잭션, 비밀번호 재설정, 서버 설정
//! - [`auth_config`] - JWT 설정
//!
//! ## 환경 변수
//!
//! ```bash
//! export MONGODB_URI="mongodb://localhost:27017/?replicaSet=rs0"
//! export DATABASE_NAME="user_accounts"
//! export REDIS_URL="redis://localhost:6379"
//! export CACHE_TTL_SECONDS="600"
//! export EVENT_CHANNEL="user-events"
//! export TRANSACTION_TIMEOUT_MS="5000"
//! export PASSWORD_RESET_TOKEN_EXPIRATION="30"
//! export JWT_SECRET="your-super-secret-key"
//! ```
//!
//! 관계 변경은 다중 문서 트랜잭션을 사용하므로 MongoDB는 레플리카셋으로 실행되어야 합니다.

pub mod auth_config;
pub mod data_config;

pub use auth_config::*;
pub use data_config::*;
