//! 인증(JWT) 관련 설정

use std::env;

/// JWT 토큰 설정
pub struct JwtConfig;

impl JwtConfig {
    /// HS256 서명 키. 설정되지 않으면 경고와 함께 개발용 기본값을 사용합니다.
    pub fn secret() -> String {
        env::var("JWT_SECRET").unwrap_or_else(|_| {
            log::warn!("JWT_SECRET not set, using default (not secure for production!)");
            "your-secret-key".to_string()
        })
    }

    /// 액세스 토큰 만료 시간 (시간 단위, 기본 24)
    pub fn expiration_hours() -> i64 {
        env::var("JWT_EXPIRATION_HOURS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(24)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwt_defaults() {
        if env::var("JWT_EXPIRATION_HOURS").is_err() {
            assert_eq!(JwtConfig::expiration_hours(), 24);
        }
        assert!(!JwtConfig::secret().is_empty());
    }
}
