//! 애플리케이션 전역 에러 시스템
//!
//! 계층마다 자기 에러 타입을 가지고, HTTP 경계에서만 [`AppError`]로 모입니다.
//!
//! ```text
//! StoreError / CacheError / EventError   ← 어댑터 계층 (MongoDB, Redis)
//!          │
//!          ▼
//! BlockError / FollowError               ← 관계 변경 코어
//!          │
//!          ▼
//! AppError (actix_web::ResponseError)    ← HTTP 응답
//! ```
//!
//! 캐시 무효화와 이벤트 발행 실패(`CacheError`, `EventError`)는 백그라운드
//! 작업 안에서 로그로만 남고 호출자에게 전파되지 않습니다.
//!
//! ## 사용 예제
//!
//! ```rust,ignore
//! use crate::core::errors::AppError;
//!
//! async fn get_user(username: &str) -> Result<UserResponse, AppError> {
//!     let user = store.find_by_username(username).await?
//!         .ok_or_else(|| AppError::NotFound("사용자를 찾을 수 없습니다".to_string()))?;
//!     Ok(UserResponse::from(user))
//! }
//! ```

use thiserror::Error;

/// 저장소(Identity Store) 에러
///
/// MongoDB 드라이버 에러 타입을 바깥으로 노출하지 않도록 문자열로 접어둡니다.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// 가드 없는 쓰기가 어떤 문서와도 매칭되지 않음
    #[error("no document matched {0}")]
    NoMatch(String),

    /// 조건부 쓰기(compare-and-set)의 가드가 실패함
    #[error("guard failed for {0}")]
    GuardFailed(String),

    /// 유니크 인덱스 충돌
    #[error("duplicate key: {0}")]
    Duplicate(String),

    /// 트랜잭션 제한 시간 초과 (트랜잭션은 abort 됨)
    #[error("transaction timed out after {0}ms")]
    Timeout(u64),

    /// 트랜잭션 시작/커밋 실패
    #[error("transaction failed: {0}")]
    Transaction(String),

    /// 그 밖의 데이터베이스 에러
    #[error("database error: {0}")]
    Database(String),

    /// 잘못된 ObjectId 형식
    #[error("invalid id: {0}")]
    InvalidId(String),
}

/// 조회 캐시(Lookup Cache) 에러
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cache backend error: {0}")]
    Backend(String),

    #[error("cache payload error: {0}")]
    Serialization(String),
}

/// 변경 이벤트 발행 에러
#[derive(Error, Debug)]
pub enum EventError {
    #[error("event encoding failed: {0}")]
    Encoding(String),

    #[error("event delivery failed: {0}")]
    Delivery(String),
}

/// 차단/차단 해제 에러
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BlockError {
    /// 대상 계정이 존재하지 않음
    #[error("user not found")]
    NotFound,

    /// 자기 자신을 대상으로 한 요청
    #[error("you can't block or unblock yourself")]
    InvalidOperation,

    #[error("user is already blocked")]
    AlreadyBlocked,

    #[error("this user is not blocked")]
    NotBlocked,

    /// 트랜잭션 실패. 원인은 로그에만 남습니다.
    #[error("{0}")]
    OperationFailed(String),
}

/// 팔로우/언팔로우 에러
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FollowError {
    #[error("user not found")]
    NotFound,

    #[error("you can't follow or unfollow yourself")]
    InvalidOperation,

    #[error("you are not following this user")]
    NotFollowing,

    /// 트랜잭션 실패를 감싸지 않고 그대로 전달
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// 애플리케이션 전역 에러 타입
///
/// 자동으로 HTTP 응답으로 변환되어 클라이언트에게 전달됩니다.
#[derive(Error, Debug)]
pub enum AppError {
    /// 데이터베이스 관련 에러 (500 Internal Server Error)
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// 입력값 검증 에러 (400 Bad Request)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 리소스 찾을 수 없음 에러 (404 Not Found)
    #[error("Not found: {0}")]
    NotFound(String),

    /// 충돌/중복 에러 (409 Conflict)
    #[error("Conflict error: {0}")]
    ConflictError(String),

    /// 인증 실패 에러 (401 Unauthorized)
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// 권한 부족 에러 (403 Forbidden)
    #[error("Authorization error: {0}")]
    AuthorizationError(String),

    /// 내부 서버 에러 (500 Internal Server Error)
    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl actix_web::ResponseError for AppError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;

        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ConflictError(_) => StatusCode::CONFLICT,
            AppError::AuthenticationError(_) => StatusCode::UNAUTHORIZED,
            AppError::AuthorizationError(_) => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 각 에러 타입을 적절한 HTTP 상태 코드와 JSON 응답으로 변환합니다.
    fn error_response(&self) -> actix_web::HttpResponse {
        actix_web::HttpResponse::build(self.status_code())
            .json(serde_json::json!({
                "status": "error",
                "error": self.to_string()
            }))
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(msg) => AppError::ConflictError(msg),
            StoreError::InvalidId(msg) => AppError::ValidationError(msg),
            StoreError::NoMatch(msg) => AppError::NotFound(msg),
            other => AppError::DatabaseError(other.to_string()),
        }
    }
}

impl From<BlockError> for AppError {
    fn from(err: BlockError) -> Self {
        match err {
            BlockError::NotFound => AppError::NotFound(err.to_string()),
            BlockError::InvalidOperation => AppError::ValidationError(err.to_string()),
            BlockError::AlreadyBlocked | BlockError::NotBlocked => {
                AppError::ConflictError(err.to_string())
            }
            BlockError::OperationFailed(msg) => AppError::InternalError(msg),
        }
    }
}

impl From<FollowError> for AppError {
    fn from(err: FollowError) -> Self {
        match err {
            FollowError::NotFound => AppError::NotFound(err.to_string()),
            FollowError::InvalidOperation => AppError::ValidationError(err.to_string()),
            FollowError::NotFollowing => AppError::ConflictError(err.to_string()),
            FollowError::Store(store) => AppError::from(store),
        }
    }
}

/// 편의성을 위한 Result 타입 별칭
pub type AppResult<T> = Result<T, AppError>;
