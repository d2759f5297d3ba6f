use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_governor::{Governor, GovernorConfigBuilder};
use actix_web::http::header;
use actix_web::{middleware, web, App, HttpServer};
use dotenv::dotenv;
use env_logger::Env;
use log::{error, info};
use user_account_service::app_state::AppState;
use user_account_service::caching::redis::RedisClient;
use user_account_service::config::{EventConfig, RateLimitConfig, ServerConfig};
use user_account_service::db::Database;
use user_account_service::events::RedisEventPublisher;
use user_account_service::repositories::users::MongoAccountStore;
use user_account_service::routes::configure_all_routes;
use user_account_service::services::auth::TokenService;
use user_account_service::services::users::user_service::ServiceSettings;

#[actix_web::main]
async fn main() -> io::Result<()> {
    // 환경 설정 및 로깅 초기화
    load_env_file();
    init_logging();

    info!("🚀 사용자 계정 서비스 시작중...");

    let state = web::Data::new(build_app_state().await?);

    info!("✅ 모든 서비스가 성공적으로 초기화되었습니다!");

    start_http_server(state).await
}

async fn build_app_state() -> io::Result<AppState> {
    info!("📡 데이터베이스 연결 중...");

    let database = Arc::new(Database::new().await.map_err(|e| {
        error!("데이터베이스 연결 실패: {}", e);
        io::Error::other(e.to_string())
    })?);

    let redis_client = Arc::new(RedisClient::new().await.map_err(|e| {
        error!("Redis 연결 실패: {}", e);
        io::Error::other(e.to_string())
    })?);

    let store = Arc::new(MongoAccountStore::new(database));
    store.create_indexes().await.map_err(|e| {
        error!("인덱스 생성 실패: {}", e);
        io::Error::other(e.to_string())
    })?;

    let events = Arc::new(RedisEventPublisher::new(redis_client.clone(), EventConfig::channel()));

    Ok(AppState::new(
        store,
        redis_client,
        events,
        Arc::new(TokenService::from_config()),
        ServiceSettings::from_config(),
    ))
}

async fn start_http_server(state: web::Data<AppState>) -> io::Result<()> {
    let bind_address = format!("{}:{}", ServerConfig::host(), ServerConfig::port());

    info!("🌐 서버가 http://{} 에서 실행중입니다", bind_address);
    info!("📍 Health check: http://{}/health", bind_address);

    // Rate Limiting 설정
    let rate_limit = RateLimitConfig::load();
    let governor_conf = GovernorConfigBuilder::default()
        .requests_per_second(rate_limit.per_second)
        .burst_size(rate_limit.burst_size)
        .use_headers()
        .finish()
        .ok_or_else(|| io::Error::other("Rate Limiting 설정이 올바르지 않습니다"))?;

    info!(
        "🛡️ Rate Limiting 활성화: 초당 {}요청, 버스트 {}개",
        rate_limit.per_second, rate_limit.burst_size
    );

    let token_data = state.token_data();

    HttpServer::new(move || {
        App::new()
            // Rate Limiting 미들웨어 (가장 먼저 적용)
            .wrap(Governor::new(&governor_conf))
            .wrap(configure_cors())
            .wrap(middleware::Logger::default())
            .wrap(middleware::NormalizePath::trim())
            .app_data(state.clone())
            .app_data(token_data.clone())
            .configure(configure_all_routes)
    })
    .bind(bind_address)?
    .workers(ServerConfig::workers())
    .run()
    .await
}

fn load_env_file() {
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "dev".to_string());

    match profile.as_str() {
        "prod" => {
            if let Err(e) = dotenv::from_filename(".env.prod") {
                eprintln!(".env.prod 파일 로드 실패: {}", e);
            }
        }
        "dev" => {
            if let Err(e) = dotenv::from_filename(".env.dev") {
                eprintln!(".env.dev 파일 로드 실패: {}", e);
            }
        }
        _ => {
            dotenv().ok();
        }
    }
}

fn init_logging() {
    env_logger::init_from_env(Env::default().default_filter_or("info,actix_web=debug"));
    info!("Current profile: {}", std::env::var("PROFILE").unwrap_or_else(|_| "dev".to_string()));
}

fn configure_cors() -> Cors {
    Cors::default()
        .allowed_origin("http://localhost:3000")
        .allowed_origin("http://127.0.0.1:3000")
        .allowed_origin("http://localhost:8080")
        .allowed_origin("http://127.0.0.1:8080")
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "PATCH", "OPTIONS"])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::ACCEPT,
            header::CONTENT_TYPE,
        ])
        .supports_credentials()
        .max_age(3600)
}
