//! 커밋 이후의 부수효과: 캐시 무효화와 변경 이벤트 발행
//!
//! 둘 다 `tokio::spawn`으로 분리된 작업에서 실행되며 호출자는 기다리지 않습니다.
//! 따라서 응답이 나간 뒤에도 잠시 오래된 캐시가 읽힐 수 있습니다.
//! 실패는 로그로만 남습니다.

use std::sync::Arc;

use log::{debug, error, warn};

use crate::caching::{user_lookup_key, LookupCache};
use crate::domain::dto::users::response::AccountSnapshot;
use crate::domain::entities::users::user::Account;
use crate::events::{ChangeKind, EventEmitter};

#[derive(Clone)]
pub struct SideEffects {
    cache: Arc<dyn LookupCache>,
    events: Arc<dyn EventEmitter>,
}

impl SideEffects {
    pub fn new(cache: Arc<dyn LookupCache>, events: Arc<dyn EventEmitter>) -> Self {
        Self { cache, events }
    }

    /// 사용자명 조회 캐시 항목 삭제를 백그라운드로 시작합니다.
    pub fn invalidate(&self, username: &str) {
        let cache = Arc::clone(&self.cache);
        let key = user_lookup_key(username);

        tokio::spawn(async move {
            match cache.delete(&key).await {
                Ok(()) => debug!("🧹 캐시 무효화: {}", key),
                Err(e) => warn!("⚠️ 캐시 무효화 실패 (key={}): {}", key, e),
            }
        });
    }

    /// 변경 후 계정 스냅샷 발행을 백그라운드로 시작합니다.
    pub fn emit(&self, account: Account, kind: ChangeKind) {
        let events = Arc::clone(&self.events);

        tokio::spawn(async move {
            let username = account.username.clone();
            if let Err(e) = events.publish(AccountSnapshot::from(account), kind).await {
                error!(
                    "❌ 이벤트 발행 실패 (user={}, type={}): {}",
                    username,
                    kind.code(),
                    e
                );
            }
        });
    }

    /// 읽기 경로(캐시 조회/채우기)용
    pub fn cache(&self) -> &Arc<dyn LookupCache> {
        &self.cache
    }
}
