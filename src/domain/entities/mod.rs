//! 영속 엔티티: 계정([`users::user::Account`])과 신고([`flags::flag::Flag`])

pub mod flags;
pub mod users;
