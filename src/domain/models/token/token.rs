use serde::{Deserialize, Serialize};

/// 액세스 토큰(HS256) 클레임
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenClaims {
    /// 계정 ID (hex)
    pub sub: String,
    pub username: String,
    pub iat: i64,
    pub exp: i64,
}
