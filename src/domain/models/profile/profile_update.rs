//! 프로필 변경 요청
//!
//! 한 번의 요청은 한 필드만 바꿉니다. JSON 형태:
//!
//! ```json
//! { "field": "current_tag_line", "value": "hello" }
//! { "field": "profile_is_viewable", "value": false }
//! ```

use serde::{Deserialize, Serialize};

use crate::core::errors::AppError;

const MAX_TAG_LINE_LEN: usize = 160;
const MAX_URL_LEN: usize = 2048;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum ProfileUpdate {
    ProfileIsViewable(bool),
    AcceptMessages(bool),
    DisplayFollowerCount(bool),
    CurrentBadgeUrl(String),
    ProfilePictureUrl(String),
    ProfileBackgroundPictureUrl(String),
    CurrentTagLine(String),
}

impl ProfileUpdate {
    /// 문서에서 바뀌는 필드 이름
    pub fn field_name(&self) -> &'static str {
        match self {
            ProfileUpdate::ProfileIsViewable(_) => "profile_is_viewable",
            ProfileUpdate::AcceptMessages(_) => "accept_messages",
            ProfileUpdate::DisplayFollowerCount(_) => "display_follower_count",
            ProfileUpdate::CurrentBadgeUrl(_) => "current_badge_url",
            ProfileUpdate::ProfilePictureUrl(_) => "profile_picture_url",
            ProfileUpdate::ProfileBackgroundPictureUrl(_) => "profile_background_picture_url",
            ProfileUpdate::CurrentTagLine(_) => "current_tag_line",
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        match self {
            ProfileUpdate::CurrentTagLine(line) if line.chars().count() > MAX_TAG_LINE_LEN => {
                Err(AppError::ValidationError(format!(
                    "태그라인은 {}자 이하여야 합니다",
                    MAX_TAG_LINE_LEN
                )))
            }
            ProfileUpdate::CurrentBadgeUrl(url)
            | ProfileUpdate::ProfilePictureUrl(url)
            | ProfileUpdate::ProfileBackgroundPictureUrl(url) => {
                let url = url.trim();
                if url.is_empty() || url.len() > MAX_URL_LEN {
                    return Err(AppError::ValidationError(format!(
                        "{} 값이 올바르지 않습니다",
                        self.field_name()
                    )));
                }
                if !(url.starts_with("https://") || url.starts_with("http://")) {
                    return Err(AppError::ValidationError(
                        "URL은 http:// 또는 https:// 로 시작해야 합니다".to_string(),
                    ));
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_tagged_update() {
        let update: ProfileUpdate =
            serde_json::from_str(r#"{"field":"accept_messages","value":false}"#).unwrap();
        assert_eq!(update, ProfileUpdate::AcceptMessages(false));

        let update: ProfileUpdate =
            serde_json::from_str(r#"{"field":"current_tag_line","value":"hi"}"#).unwrap();
        assert_eq!(update.field_name(), "current_tag_line");
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = serde_json::from_str::<ProfileUpdate>(r#"{"field":"is_verified","value":true}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_urls_and_tag_line() {
        assert!(ProfileUpdate::ProfilePictureUrl("https://cdn.example.com/a.png".into()).validate().is_ok());
        assert!(ProfileUpdate::ProfilePictureUrl("   ".into()).validate().is_err());
        assert!(ProfileUpdate::CurrentBadgeUrl("ftp://x".into()).validate().is_err());
        assert!(ProfileUpdate::CurrentTagLine("x".repeat(161)).validate().is_err());
        assert!(ProfileUpdate::CurrentTagLine("짧은 소개".into()).validate().is_ok());
    }
}
