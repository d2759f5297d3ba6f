use serde::{Deserialize, Serialize};

use crate::domain::entities::users::user::Account;

/// 계정 요약 (외부에 노출되는 비밀 아닌 필드)
///
/// 조회 캐시에 저장되는 값이기도 합니다. 비밀번호 해시, 인증 코드,
/// 차단 목록은 포함하지 않습니다.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub following: Vec<String>,
    pub followers: Vec<String>,
    /// `display_follower_count`가 꺼져 있으면 숨깁니다.
    pub follower_count: Option<i64>,
    pub profile_is_viewable: bool,
    pub accept_messages: bool,
    pub display_follower_count: bool,
    pub is_verified: bool,
    pub current_tag_line: Option<String>,
    pub current_badge_url: Option<String>,
    pub profile_picture_url: Option<String>,
    pub profile_background_picture_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Account> for UserResponse {
    fn from(account: Account) -> Self {
        let Account {
            id,
            username,
            email,
            following,
            followers,
            follower_count,
            profile_is_viewable,
            accept_messages,
            display_follower_count,
            is_verified,
            current_tag_line,
            current_badge_url,
            profile_picture_url,
            profile_background_picture_url,
            created_at,
            updated_at,
            ..
        } = account;

        Self {
            id: id.map(|id| id.to_hex()).unwrap_or_default(),
            username,
            email,
            following,
            followers,
            follower_count: display_follower_count.then_some(follower_count),
            profile_is_viewable,
            accept_messages,
            display_follower_count,
            is_verified,
            current_tag_line,
            current_badge_url,
            profile_picture_url,
            profile_background_picture_url,
            created_at: created_at.try_to_rfc3339_string().unwrap_or_default(),
            updated_at: updated_at.try_to_rfc3339_string().unwrap_or_default(),
        }
    }
}

/// 변경 이벤트에 실리는 계정 스냅샷
///
/// 요약에 관계 목록과 신고 수를 더한 형태입니다. 비밀 값은 여전히 제외됩니다.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccountSnapshot {
    #[serde(flatten)]
    pub summary: UserResponse,
    pub follower_total: i64,
    pub block_list: Vec<String>,
    pub blocked_by_list: Vec<String>,
    pub flag_count: usize,
    pub is_locked: bool,
}

impl From<Account> for AccountSnapshot {
    fn from(account: Account) -> Self {
        let block_list = account.block_list.iter().map(|id| id.to_hex()).collect();
        let blocked_by_list = account.blocked_by_list.iter().map(|id| id.to_hex()).collect();
        let flag_count = account.flag_count.len();
        let follower_total = account.follower_count;
        let is_locked = account.is_locked;

        Self {
            summary: UserResponse::from(account),
            follower_total,
            block_list,
            blocked_by_list,
            flag_count,
            is_locked,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserResponse {
    pub user: UserResponse,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user: UserResponse,
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

impl LoginResponse {
    pub fn new(account: Account, access_token: String, expires_in: i64) -> Self {
        Self {
            user: UserResponse::from(account),
            access_token,
            token_type: "Bearer".to_string(),
            expires_in,
        }
    }
}
