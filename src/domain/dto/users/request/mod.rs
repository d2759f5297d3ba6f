pub mod auth_request;
pub mod create_user;
pub mod flag_request;
pub mod password_reset;

pub use auth_request::LoginRequest;
pub use create_user::CreateUserRequest;
pub use flag_request::{FlagRequest, ListUsersQuery};
pub use password_reset::{NewPasswordRequest, PasswordResetRequest};
