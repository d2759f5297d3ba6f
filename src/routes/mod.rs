//! 라우트 테이블
//!
//! `/{username}` 패턴보다 고정 경로(`/blocked`, `/me`, `/id/{id}`)를 먼저 등록해야 합니다.

use actix_web::web;
use serde_json::json;

use crate::handlers;

pub fn configure_all_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health_check);

    configure_user_routes(cfg);
    configure_auth_routes(cfg);
}

fn configure_user_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/users")
            .service(handlers::users::create_user)
            .service(handlers::users::list_users)
            .service(handlers::users::list_blocked_users)
            .service(handlers::users::delete_me)
            .service(handlers::users::update_profile)
            .service(handlers::users::get_user_by_id)
            .service(handlers::users::get_user)
            .service(handlers::users::flag_user)
            .service(handlers::relationships::block_user)
            .service(handlers::relationships::unblock_user)
            .service(handlers::relationships::follow_user)
            .service(handlers::relationships::unfollow_user),
    );
}

fn configure_auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/auth")
            .service(handlers::auth::login)
            .service(handlers::auth::verify_account)
            .service(handlers::auth::request_password_reset)
            .service(handlers::auth::reset_password),
    );
}

#[actix_web::get("/health")]
async fn health_check() -> actix_web::HttpResponse {
    actix_web::HttpResponse::Ok().json(json!({
        "status": "healthy",
        "service": "user_account_service",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "features": {
            "database": "MongoDB",
            "cache": "Redis",
            "events": "Redis Pub/Sub"
        }
    }))
}
