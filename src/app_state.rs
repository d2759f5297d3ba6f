//! 애플리케이션 조립
//!
//! 저장소, 캐시, 이벤트 발행기를 생성자 주입으로 묶어 핸들러에 `web::Data`로 넘깁니다.

use std::sync::Arc;

use actix_web::web;

use crate::caching::LookupCache;
use crate::events::EventEmitter;
use crate::repositories::users::store::AccountStore;
use crate::services::auth::token_service::TokenService;
use crate::services::users::user_service::{AccountService, ServiceSettings};

pub struct AppState {
    pub accounts: AccountService,
    pub tokens: Arc<TokenService>,
}

impl AppState {
    pub fn new<S>(
        store: Arc<S>,
        cache: Arc<dyn LookupCache>,
        events: Arc<dyn EventEmitter>,
        tokens: Arc<TokenService>,
        settings: ServiceSettings,
    ) -> Self
    where
        S: AccountStore + 'static,
    {
        let accounts = AccountService::new(store, cache, events, Arc::clone(&tokens), settings);
        Self { accounts, tokens }
    }

    /// `AuthenticatedUser` 추출기가 찾는 토큰 서비스 핸들
    pub fn token_data(&self) -> web::Data<TokenService> {
        web::Data::from(Arc::clone(&self.tokens))
    }
}
