use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use crate::config::JwtConfig;
use crate::core::errors::AppError;
use crate::domain::entities::users::user::Account;
use crate::domain::models::token::TokenClaims;

/// HS256 액세스 토큰 발급/검증
pub struct TokenService {
    secret: String,
    expiration_hours: i64,
}

impl TokenService {
    pub fn new(secret: impl Into<String>, expiration_hours: i64) -> Self {
        Self {
            secret: secret.into(),
            expiration_hours,
        }
    }

    /// `JWT_SECRET`, `JWT_EXPIRATION_HOURS`로 생성
    pub fn from_config() -> Self {
        Self::new(JwtConfig::secret(), JwtConfig::expiration_hours())
    }

    /// 초 단위 만료 시간
    pub fn expires_in(&self) -> i64 {
        self.expiration_hours * 3600
    }

    pub fn generate_access_token(&self, account: &Account) -> Result<String, AppError> {
        let now = Utc::now();
        let expiration = now + Duration::hours(self.expiration_hours);

        let claims = TokenClaims {
            sub: account
                .id_string()
                .ok_or_else(|| AppError::InternalError("사용자 ID가 없습니다".to_string()))?,
            username: account.username.clone(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AppError::InternalError(format!("JWT 토큰 생성 실패: {}", e)))
    }

    pub fn verify_token(&self, token: &str) -> Result<TokenClaims, AppError> {
        let decoding_key = DecodingKey::from_secret(self.secret.as_bytes());

        decode::<TokenClaims>(token, &decoding_key, &Validation::default())
            .map(|token_data| token_data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::AuthenticationError("토큰이 만료되었습니다".to_string())
                }
                _ => AppError::AuthenticationError("유효하지 않은 토큰입니다".to_string()),
            })
    }

    pub fn extract_bearer_token<'a>(&self, auth_header: &'a str) -> Result<&'a str, AppError> {
        auth_header
            .strip_prefix("Bearer ")
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AppError::AuthenticationError("유효하지 않은 인증 헤더 형식입니다".to_string()))
    }
}
