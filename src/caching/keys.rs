//! 캐시 키 생성
//!
//! 캐시를 채울 때와 무효화할 때 반드시 같은 함수로 키를 만들어야 합니다.
//! 다르게 만들면 항목이 TTL 만료 전까지 지워지지 않습니다.

/// 사용자명 조회 캐시의 용도 태그
pub const FIND_USER_BY_USERNAME: &str = "finduserbyusername";

/// `value`에서 공백을 모두 제거하고 `:<purpose>`를 붙입니다.
pub fn cache_key(value: &str, purpose: &str) -> String {
    let mut key: String = value.chars().filter(|c| !c.is_whitespace()).collect();
    key.push(':');
    key.push_str(purpose);
    key
}

pub fn user_lookup_key(username: &str) -> String {
    cache_key(username, FIND_USER_BY_USERNAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_format() {
        assert_eq!(cache_key("alice", "finduserbyusername"), "alice:finduserbyusername");
        assert_eq!(user_lookup_key("alice"), "alice:finduserbyusername");
    }

    #[test]
    fn test_cache_key_strips_whitespace() {
        assert_eq!(cache_key(" al ice\t", "purpose"), "alice:purpose");
        assert_eq!(user_lookup_key("bob "), user_lookup_key("bob"));
    }
}
