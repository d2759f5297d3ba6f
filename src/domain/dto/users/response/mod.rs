pub mod user_response;

pub use user_response::{AccountSnapshot, CreateUserResponse, LoginResponse, UserResponse};
