//! 데이터 저장소, 서버, 부수효과(캐시/이벤트) 관련 설정
//!
//! 모든 값은 환경 변수에서 읽으며, 없거나 파싱에 실패하면 기본값을 사용합니다.

use std::env;
use std::time::Duration;

/// 애플리케이션 실행 환경
#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    Development,
    Test,
    Staging,
    Production,
}

impl Environment {
    /// `ENVIRONMENT` 환경 변수로 현재 환경을 결정합니다. 기본값은 Production입니다.
    pub fn current() -> Self {
        Self::from_str(&env::var("ENVIRONMENT").unwrap_or_else(|_| "production".to_string()))
    }

    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Environment::Development,
            "test" | "testing" => Environment::Test,
            "staging" | "stage" => Environment::Staging,
            _ => Environment::Production,
        }
    }
}

/// 비밀번호 해싱 설정
pub struct PasswordConfig;

impl PasswordConfig {
    /// `BCRYPT_COST`(4~15)가 유효하면 그 값을, 아니면 환경별 기본값을 반환합니다.
    pub fn bcrypt_cost() -> u32 {
        env::var("BCRYPT_COST")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .filter(|cost| (4..=15).contains(cost))
            .unwrap_or_else(|| Self::bcrypt_cost_for_env(&Environment::current()))
    }

    pub fn bcrypt_cost_for_env(env: &Environment) -> u32 {
        match env {
            Environment::Development | Environment::Test => 4,
            Environment::Staging => 10,
            Environment::Production => 12,
        }
    }
}

/// HTTP 서버 설정
pub struct ServerConfig;

impl ServerConfig {
    pub fn port() -> u16 {
        env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(8080)
    }

    pub fn host() -> String {
        env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string())
    }

    pub fn workers() -> usize {
        env::var("SERVER_WORKERS")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|n| *n > 0)
            .unwrap_or(4)
    }
}

/// MongoDB 접속 설정
pub struct DatabaseConfig;

impl DatabaseConfig {
    pub fn uri() -> String {
        env::var("MONGODB_URI").unwrap_or_else(|_| "mongodb://localhost:27017".to_string())
    }

    pub fn database_name() -> String {
        env::var("DATABASE_NAME").unwrap_or_else(|_| "user_accounts_dev".to_string())
    }
}

/// 관계 변경 트랜잭션 설정
pub struct TransactionConfig;

impl TransactionConfig {
    /// 트랜잭션 한 번에 허용되는 최대 시간 (`TRANSACTION_TIMEOUT_MS`, 기본 5000ms)
    pub fn timeout() -> Duration {
        let millis = env::var("TRANSACTION_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|ms| *ms > 0)
            .unwrap_or(5000);
        Duration::from_millis(millis)
    }
}

/// 조회 캐시(Redis) 설정
pub struct CacheConfig;

impl CacheConfig {
    pub fn redis_url() -> String {
        env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string())
    }

    /// 계정 요약 캐시 TTL (`CACHE_TTL_SECONDS`, 기본 600초)
    pub fn ttl_seconds() -> u64 {
        env::var("CACHE_TTL_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(600)
    }
}

/// 계정 변경 이벤트 설정
pub struct EventConfig;

impl EventConfig {
    pub fn channel() -> String {
        env::var("EVENT_CHANNEL").unwrap_or_else(|_| "user-events".to_string())
    }
}

/// 목록 조회 페이지 크기
pub struct PageConfig;

impl PageConfig {
    pub fn users_page_size() -> u32 {
        env::var("USERS_PAGE_SIZE")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(20)
    }
}

/// 비밀번호 재설정 설정
pub struct PasswordResetConfig;

impl PasswordResetConfig {
    /// 재설정 토큰 유효 시간 (`PASSWORD_RESET_TOKEN_EXPIRATION`, 분 단위, 기본 30분)
    pub fn token_ttl() -> Duration {
        let minutes = env::var("PASSWORD_RESET_TOKEN_EXPIRATION")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|m| *m > 0)
            .unwrap_or(30);
        Duration::from_secs(minutes * 60)
    }

    /// 재설정 링크 앞부분. 뒤에 `/{token}`이 붙습니다.
    pub fn url_base() -> String {
        env::var("PASSWORD_RESET_URL_BASE")
            .unwrap_or_else(|_| "http://127.0.0.1:8080/api/v1/auth/reset".to_string())
    }
}

/// 요청 속도 제한 설정
#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    pub per_second: u64,
    pub burst_size: u32,
}

impl RateLimitConfig {
    pub fn load() -> Self {
        let per_second = env::var("RATE_LIMIT_PER_SECOND")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or_else(|| {
                log::warn!("RATE_LIMIT_PER_SECOND 미설정 또는 파싱 실패. 기본값 100 사용");
                100
            });

        let burst_size = env::var("RATE_LIMIT_BURST_SIZE")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or_else(|| {
                log::warn!("RATE_LIMIT_BURST_SIZE 미설정 또는 파싱 실패. 기본값 200 사용");
                200
            });

        Self { per_second, burst_size }
    }
}
