//! 계정 엔티티
//!
//! 관계 목록 네 개를 함께 들고 있습니다.
//!
//! - `block_list` / `blocked_by_list`: 계정 ID (차단은 ID 기준)
//! - `following` / `followers`: 사용자명 (팔로우는 이름 기준)
//!
//! ```rust,ignore
//! use crate::domain::entities::users::user::Account;
//!
//! let account = Account::new_local(
//!     "alice".to_string(),
//!     "alice@example.com".to_string(),
//!     password_hash,
//!     verification_code,
//! );
//! assert!(account.block_list.is_empty());
//! ```

pub mod user;
