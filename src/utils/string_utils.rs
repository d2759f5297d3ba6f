use crate::core::errors::AppError;

/// 앞뒤 공백을 제거하고 소문자로 바꿉니다. 사용자명/이메일 정규화에 씁니다.
pub fn normalize_identifier(value: &str) -> String {
    value.trim().to_lowercase()
}

pub fn validate_required_string(value: &str, field_name: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::ValidationError(format!(
            "{}은(는) 필수입니다",
            field_name
        )));
    }
    Ok(trimmed.to_string())
}

/// 이메일 형태인지 대략적으로 판단합니다. 로그인 식별자 분기용입니다.
pub fn looks_like_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_identifier() {
        assert_eq!(normalize_identifier("  Alice "), "alice");
        assert_eq!(normalize_identifier("BOB@Example.COM"), "bob@example.com");
    }

    #[test]
    fn test_validate_required_string() {
        assert_eq!(validate_required_string("  World  ", "name").unwrap(), "World");
        assert!(validate_required_string("", "name").is_err());
        assert!(validate_required_string("\t\n", "name").is_err());
    }

    #[test]
    fn test_looks_like_email() {
        assert!(looks_like_email("alice@example.com"));
        assert!(!looks_like_email("alice"));
        assert!(!looks_like_email("@example.com"));
        assert!(!looks_like_email("alice@localhost"));
    }
}
