use serde::Deserialize;
use validator::Validate;

/// `POST /api/v1/auth/reset`: 재설정 링크 요청
#[derive(Debug, Deserialize, Validate)]
pub struct PasswordResetRequest {
    #[validate(email(message = "유효한 이메일 주소를 입력해주세요"))]
    pub email: String,
}

/// `PUT /api/v1/auth/reset/{token}`: 새 비밀번호
#[derive(Debug, Deserialize, Validate)]
pub struct NewPasswordRequest {
    #[validate(length(min = 8, message = "비밀번호는 최소 8자 이상이어야 합니다"))]
    pub password: String,
}
