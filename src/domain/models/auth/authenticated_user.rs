use std::future::{ready, Ready};

use actix_web::{http::header, web, FromRequest, HttpRequest};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::core::errors::AppError;
use crate::services::auth::token_service::TokenService;

/// Bearer 토큰으로 인증된 요청자
///
/// 핸들러 인자로 선언하면 `Authorization: Bearer <jwt>` 헤더를 검증해 채워집니다.
/// 토큰이 없거나 유효하지 않으면 401로 응답합니다.
///
/// ```rust,ignore
/// #[put("/{username}/block")]
/// async fn block_user(user: AuthenticatedUser, ...) -> Result<HttpResponse, AppError> { ... }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub username: String,
}

impl AuthenticatedUser {
    pub fn object_id(&self) -> Result<ObjectId, AppError> {
        ObjectId::parse_str(&self.user_id)
            .map_err(|_| AppError::AuthenticationError("토큰의 사용자 ID가 올바르지 않습니다".to_string()))
    }

    fn from_header(req: &HttpRequest) -> Result<Self, AppError> {
        let tokens = req
            .app_data::<web::Data<TokenService>>()
            .ok_or_else(|| AppError::InternalError("TokenService가 등록되지 않았습니다".to_string()))?;

        let auth_header = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::AuthenticationError("인증되지 않은 요청입니다".to_string()))?;

        let token = tokens.extract_bearer_token(auth_header)?;
        let claims = tokens.verify_token(token)?;

        Ok(Self {
            user_id: claims.sub,
            username: claims.username,
        })
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        ready(Self::from_header(req))
    }
}
