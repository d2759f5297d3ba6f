//! # HTTP Request Handlers Module
//!
//! 요청 본문 검증, 인증 추출, 서비스 호출, 응답 변환만 담당합니다.
//! 비즈니스 규칙은 [`crate::services`]에 있습니다.
//!
//! ```text
//! Client ──▶ Handlers (이 모듈) ──▶ AccountService ──▶ AccountStore / LookupCache / EventEmitter
//! ```
//!
//! - [`users`] - 가입, 조회, 목록, 프로필, 신고, 탈퇴
//! - [`relationships`] - 차단/차단 해제, 팔로우/언팔로우
//! - [`auth`] - 로그인, 이메일 인증, 비밀번호 재설정
//!
//! 모든 핸들러는 `Result<HttpResponse, AppError>`를 반환하고, 에러는
//! `AppError`의 `ResponseError` 구현이 `{"status":"error","error":...}` JSON으로 바꿉니다.

pub mod auth;
pub mod relationships;
pub mod users;
