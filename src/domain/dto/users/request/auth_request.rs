use serde::Deserialize;
use validator::Validate;

/// 로그인 요청. `identifier`는 이메일 또는 사용자명입니다.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "이메일 또는 사용자명을 입력해주세요"))]
    pub identifier: String,

    #[validate(length(min = 1, message = "비밀번호를 입력해주세요"))]
    pub password: String,
}
