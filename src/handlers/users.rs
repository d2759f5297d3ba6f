use actix_web::{delete, get, patch, post, web, HttpResponse};
use validator::Validate;

use crate::app_state::AppState;
use crate::core::errors::AppError;
use crate::domain::dto::users::request::{CreateUserRequest, FlagRequest, ListUsersQuery};
use crate::domain::models::auth::AuthenticatedUser;
use crate::domain::models::profile::ProfileUpdate;

#[post("")]
pub async fn create_user(
    state: web::Data<AppState>,
    payload: web::Json<CreateUserRequest>,
) -> Result<HttpResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let response = state.accounts.create_user(payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(response))
}

#[get("")]
pub async fn list_users(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    query: web::Query<ListUsersQuery>,
) -> Result<HttpResponse, AppError> {
    let users = state
        .accounts
        .list_users(&user.object_id()?, query.page())
        .await?;
    Ok(HttpResponse::Ok().json(users))
}

#[get("/blocked")]
pub async fn list_blocked_users(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let users = state.accounts.list_blocked_users(&user.object_id()?).await?;
    Ok(HttpResponse::Ok().json(users))
}

#[delete("/me")]
pub async fn delete_me(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    state.accounts.delete_user(&user.object_id()?).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[patch("/me/profile")]
pub async fn update_profile(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    payload: web::Json<ProfileUpdate>,
) -> Result<HttpResponse, AppError> {
    let updated = state
        .accounts
        .update_profile(&user.object_id()?, payload.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(updated))
}

#[get("/id/{id}")]
pub async fn get_user_by_id(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let user = state.accounts.get_user_by_id(&id).await?;
    Ok(HttpResponse::Ok().json(user))
}

#[get("/{username}")]
pub async fn get_user(
    state: web::Data<AppState>,
    username: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let user = state.accounts.get_user_by_username(&username).await?;
    Ok(HttpResponse::Ok().json(user))
}

#[post("/{username}/flag")]
pub async fn flag_user(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    username: web::Path<String>,
    payload: web::Json<FlagRequest>,
) -> Result<HttpResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    state
        .accounts
        .flag_user(&user.object_id()?, &username, &payload.reason)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
