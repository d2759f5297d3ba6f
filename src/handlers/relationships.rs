//! 차단 / 팔로우 엔드포인트
//!
//! 모두 인증이 필요하고, 성공하면 본문 없이 204를 돌려줍니다.
//! 캐시 무효화와 이벤트 발행은 응답 이후에 끝날 수 있습니다.

use actix_web::{delete, put, web, HttpResponse};

use crate::app_state::AppState;
use crate::core::errors::AppError;
use crate::domain::models::auth::AuthenticatedUser;

#[put("/{username}/block")]
pub async fn block_user(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    username: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    state.accounts.block_user(&user.object_id()?, &username).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[delete("/{username}/block")]
pub async fn unblock_user(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    username: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    state.accounts.unblock_user(&user.object_id()?, &username).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[put("/{username}/follow")]
pub async fn follow_user(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    username: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    state.accounts.follow_user(&user.username, &username).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[delete("/{username}/follow")]
pub async fn unfollow_user(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    username: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    state.accounts.unfollow_user(&user.username, &username).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use actix_web::http::{header, StatusCode};
    use actix_web::{test, App};
    use serde_json::Value;

    use crate::routes::configure_all_routes;
    use crate::test_support::{eventually, TestApp};

    #[actix_web::test]
    async fn test_block_and_unblock() {
        let ctx = TestApp::new();
        let alice = ctx.store.seed("alice");
        let bob = ctx.store.seed("bob");
        let app = test::init_service(
            App::new()
                .app_data(ctx.state.clone())
                .app_data(ctx.state.token_data())
                .configure(configure_all_routes),
        )
        .await;

        let block = || {
            test::TestRequest::put()
                .uri("/api/v1/users/Bob/block")
                .insert_header((header::AUTHORIZATION, ctx.bearer("alice")))
                .to_request()
        };
        let unblock = || {
            test::TestRequest::delete()
                .uri("/api/v1/users/bob/block")
                .insert_header((header::AUTHORIZATION, ctx.bearer("alice")))
                .to_request()
        };

        assert_eq!(test::call_service(&app, block()).await.status(), StatusCode::NO_CONTENT);
        assert_eq!(ctx.store.get("alice").block_list, vec![bob.id.unwrap()]);
        assert_eq!(ctx.store.get("bob").blocked_by_list, vec![alice.id.unwrap()]);

        assert_eq!(test::call_service(&app, block()).await.status(), StatusCode::CONFLICT);

        assert_eq!(test::call_service(&app, unblock()).await.status(), StatusCode::NO_CONTENT);
        assert!(ctx.store.get("alice").block_list.is_empty());
        assert!(ctx.store.get("bob").blocked_by_list.is_empty());

        let resp = test::call_service(&app, unblock()).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "error");
    }

    #[actix_web::test]
    async fn test_block_rejections() {
        let ctx = TestApp::new();
        ctx.store.seed("alice");
        let app = test::init_service(
            App::new()
                .app_data(ctx.state.clone())
                .app_data(ctx.state.token_data())
                .configure(configure_all_routes),
        )
        .await;

        let req = test::TestRequest::put()
            .uri("/api/v1/users/alice/block")
            .insert_header((header::AUTHORIZATION, ctx.bearer("alice")))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::put()
            .uri("/api/v1/users/ghost/block")
            .insert_header((header::AUTHORIZATION, ctx.bearer("alice")))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::put().uri("/api/v1/users/alice/block").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

        assert!(ctx.store.get("alice").block_list.is_empty());
        assert_eq!(ctx.store.committed(), 0);
    }

    #[actix_web::test]
    async fn test_follow_and_unfollow() {
        let ctx = TestApp::new();
        ctx.store.seed("alice");
        ctx.store.seed("bob");
        let app = test::init_service(
            App::new()
                .app_data(ctx.state.clone())
                .app_data(ctx.state.token_data())
                .configure(configure_all_routes),
        )
        .await;

        let req = test::TestRequest::put()
            .uri("/api/v1/users/bob/follow")
            .insert_header((header::AUTHORIZATION, ctx.bearer("alice")))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);

        let bob = ctx.store.get("bob");
        assert_eq!(bob.followers, vec!["alice".to_string()]);
        assert_eq!(bob.follower_count, 1);
        assert_eq!(ctx.store.get("alice").following, vec!["bob".to_string()]);
        assert!(eventually(|| ctx.events.attempts() == 2).await);

        for expected in [StatusCode::NO_CONTENT, StatusCode::CONFLICT] {
            let req = test::TestRequest::delete()
                .uri("/api/v1/users/bob/follow")
                .insert_header((header::AUTHORIZATION, ctx.bearer("alice")))
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), expected);
        }

        let bob = ctx.store.get("bob");
        assert!(bob.followers.is_empty());
        assert_eq!(bob.follower_count, 0);
    }
}
