use actix_web::{get, post, put, web, HttpResponse};
use log::info;
use validator::Validate;

use crate::app_state::AppState;
use crate::core::errors::AppError;
use crate::domain::dto::users::request::{LoginRequest, NewPasswordRequest, PasswordResetRequest};

/// 이메일 또는 사용자명 + 비밀번호 로그인
#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let response = state.accounts.login(payload.into_inner()).await?;
    info!("로그인 성공 - 사용자: {}", response.user.username);

    Ok(HttpResponse::Ok().json(response))
}

/// 가입 메일의 인증 링크
#[get("/verify/{code}")]
pub async fn verify_account(
    state: web::Data<AppState>,
    code: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    state.accounts.verify_account(&code).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// 비밀번호 재설정 링크 요청
#[post("/reset")]
pub async fn request_password_reset(
    state: web::Data<AppState>,
    payload: web::Json<PasswordResetRequest>,
) -> Result<HttpResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    state.accounts.request_password_reset(&payload.email).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[put("/reset/{token}")]
pub async fn reset_password(
    state: web::Data<AppState>,
    token: web::Path<String>,
    payload: web::Json<NewPasswordRequest>,
) -> Result<HttpResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    state.accounts.reset_password(&token, &payload.password).await?;
    Ok(HttpResponse::NoContent().finish())
}
