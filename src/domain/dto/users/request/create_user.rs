use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// 회원가입 요청
///
/// 사용자명과 이메일은 서비스 계층에서 소문자로 정규화됩니다.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 2, max = 30, message = "사용자명은 2-30자 사이여야 합니다"))]
    #[validate(custom(function = "validate_username"))]
    pub username: String,

    #[validate(email(message = "유효한 이메일 주소를 입력해주세요"))]
    pub email: String,

    #[validate(length(min = 8, message = "비밀번호는 최소 8자 이상이어야 합니다"))]
    pub password: String,
}

/// 알파벳, 숫자, 언더스코어만 허용
pub(crate) fn validate_username(username: &str) -> Result<(), ValidationError> {
    if !username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(ValidationError::new("invalid_username")
            .with_message("사용자명은 알파벳, 숫자, 언더스코어만 사용 가능합니다".into()));
    }
    Ok(())
}
