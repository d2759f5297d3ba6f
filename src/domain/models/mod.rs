//! 저장되지 않는 도메인 모델: 인증 주체, 토큰 클레임, 프로필 변경

pub mod auth;
pub mod profile;
pub mod token;
