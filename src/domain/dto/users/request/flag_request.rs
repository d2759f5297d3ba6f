use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct FlagRequest {
    #[validate(length(min = 1, max = 500, message = "신고 사유는 1-500자 사이여야 합니다"))]
    pub reason: String,
}

/// `GET /api/v1/users?page=N` (1부터 시작)
#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    pub page: Option<u32>,
}

impl ListUsersQuery {
    pub fn page(&self) -> u32 {
        self.page.filter(|p| *p > 0).unwrap_or(1)
    }
}
