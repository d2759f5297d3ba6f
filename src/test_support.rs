//! 테스트용 인메모리 협력 객체
//!
//! - [`InMemoryAccountStore`]: 스테이징 복사본에 쓰기를 적용하고 모두 성공했을 때만 교체하는 트랜잭션 저장소.
//!   실패와 지연을 주입할 수 있습니다.
//! - [`RecordingCache`], [`RecordingEmitter`]: 호출을 기록하고 실패를 주입할 수 있는 캐시/이벤트 발행기.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use actix_web::web;
use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, DateTime};

use crate::app_state::AppState;
use crate::caching::LookupCache;
use crate::core::errors::{CacheError, EventError, StoreError};
use crate::domain::dto::users::response::{AccountSnapshot, UserResponse};
use crate::domain::entities::flags::flag::Flag;
use crate::domain::entities::users::user::Account;
use crate::domain::models::profile::ProfileUpdate;
use crate::events::{ChangeKind, EventEmitter};
use crate::repositories::users::store::{
    AccountSelector, AccountStore, AccountUpdate, DocumentWrite, IdListField, IdentityStore,
    NameListField, WriteGuard,
};
use crate::services::auth::token_service::TokenService;
use crate::services::users::side_effects::SideEffects;
use crate::services::users::user_service::ServiceSettings;

pub(crate) const TEST_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Default)]
pub(crate) struct InMemoryAccountStore {
    accounts: Mutex<Vec<Account>>,
    flags: Mutex<Vec<Flag>>,
    failure: Mutex<Option<StoreError>>,
    delay: Mutex<Option<Duration>>,
    committed: AtomicUsize,
    aborted: AtomicUsize,
}

fn id_list<'a>(account: &'a mut Account, field: IdListField) -> &'a mut Vec<ObjectId> {
    match field {
        IdListField::BlockList => &mut account.block_list,
        IdListField::BlockedByList => &mut account.blocked_by_list,
    }
}

fn name_list<'a>(account: &'a mut Account, field: NameListField) -> &'a mut Vec<String> {
    match field {
        NameListField::Following => &mut account.following,
        NameListField::Followers => &mut account.followers,
    }
}

fn selector_matches(selector: &AccountSelector, account: &Account) -> bool {
    match selector {
        AccountSelector::Id(id) => account.id.as_ref() == Some(id),
        AccountSelector::Username(name) => &account.username == name,
    }
}

fn guard_holds(guard: Option<&WriteGuard>, account: &Account) -> bool {
    match guard {
        None => true,
        Some(WriteGuard::IdPresent { field, id }) => match field {
            IdListField::BlockList => account.block_list.contains(id),
            IdListField::BlockedByList => account.blocked_by_list.contains(id),
        },
        Some(WriteGuard::IdAbsent { field, id }) => match field {
            IdListField::BlockList => !account.block_list.contains(id),
            IdListField::BlockedByList => !account.blocked_by_list.contains(id),
        },
        Some(WriteGuard::NamePresent { field, name }) => match field {
            NameListField::Following => account.following.contains(name),
            NameListField::Followers => account.followers.contains(name),
        },
    }
}

fn apply_updates(account: &mut Account, updates: &[AccountUpdate]) {
    for update in updates {
        match update {
            AccountUpdate::PushId { field, id } => id_list(account, *field).push(*id),
            AccountUpdate::SetIdList { field, ids } => *id_list(account, *field) = ids.clone(),
            AccountUpdate::PushName { field, name } => name_list(account, *field).push(name.clone()),
            AccountUpdate::PullName { field, name } => name_list(account, *field).retain(|n| n != name),
            AccountUpdate::IncFollowerCount(delta) => account.follower_count += delta,
        }
    }
    account.updated_at = DateTime::now();
}

impl InMemoryAccountStore {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// 저장된 계정 하나를 추가합니다.
    pub(crate) fn seed(&self, username: &str) -> Account {
        let mut account = Account::new_local(
            username.to_string(),
            format!("{}@example.com", username),
            "hash".to_string(),
            format!("code-{}", username),
        );
        account.id = Some(ObjectId::new());
        self.accounts.lock().unwrap().push(account.clone());
        account
    }

    pub(crate) fn get(&self, username: &str) -> Account {
        self.accounts
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.username == username)
            .cloned()
            .unwrap_or_else(|| panic!("no account named {}", username))
    }

    /// 저장된 계정을 직접 고칩니다.
    pub(crate) fn modify<F: FnOnce(&mut Account)>(&self, username: &str, f: F) {
        let mut accounts = self.accounts.lock().unwrap();
        let account = accounts
            .iter_mut()
            .find(|a| a.username == username)
            .unwrap_or_else(|| panic!("no account named {}", username));
        f(account);
    }

    pub(crate) fn snapshot(&self) -> Vec<Account> {
        self.accounts.lock().unwrap().clone()
    }

    pub(crate) fn flags(&self) -> Vec<Flag> {
        self.flags.lock().unwrap().clone()
    }

    /// 이후 모든 트랜잭션이 커밋 직전에 이 에러로 실패합니다.
    pub(crate) fn fail_transactions_with(&self, err: StoreError) {
        *self.failure.lock().unwrap() = Some(err);
    }

    pub(crate) fn delay_transactions(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub(crate) fn committed(&self) -> usize {
        self.committed.load(Ordering::SeqCst)
    }

    pub(crate) fn aborted(&self) -> usize {
        self.aborted.load(Ordering::SeqCst)
    }

    fn commit_writes(&self, writes: &[DocumentWrite]) -> Result<Vec<Account>, StoreError> {
        let mut accounts = self.accounts.lock().unwrap();
        let mut staged = accounts.clone();
        let mut updated = Vec::with_capacity(writes.len());

        for write in writes {
            let account = staged
                .iter_mut()
                .find(|a| selector_matches(&write.selector, a) && guard_holds(write.guard.as_ref(), a))
                .ok_or_else(|| write.no_match_error())?;
            apply_updates(account, &write.updates);
            updated.push(account.clone());
        }

        if let Some(err) = self.failure.lock().unwrap().clone() {
            return Err(err);
        }

        *accounts = staged;
        Ok(updated)
    }

    fn update_one<F>(&self, id: &ObjectId, f: F) -> Option<Account>
    where
        F: FnOnce(&mut Account) -> bool,
    {
        let mut accounts = self.accounts.lock().unwrap();
        let account = accounts.iter_mut().find(|a| a.id.as_ref() == Some(id))?;
        if !f(account) {
            return None;
        }
        account.updated_at = DateTime::now();
        Some(account.clone())
    }
}

#[async_trait]
impl IdentityStore for InMemoryAccountStore {
    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Account>, StoreError> {
        Ok(self.accounts.lock().unwrap().iter().find(|a| a.id.as_ref() == Some(id)).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, StoreError> {
        Ok(self.accounts.lock().unwrap().iter().find(|a| a.username == username).cloned())
    }

    async fn transact(
        &self,
        writes: Vec<DocumentWrite>,
        timeout: Duration,
    ) -> Result<Vec<Account>, StoreError> {
        let delay = *self.delay.lock().unwrap();
        let attempt = async {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            self.commit_writes(&writes)
        };

        match tokio::time::timeout(timeout, attempt).await {
            Ok(Ok(updated)) => {
                self.committed.fetch_add(1, Ordering::SeqCst);
                Ok(updated)
            }
            Ok(Err(err)) => {
                self.aborted.fetch_add(1, Ordering::SeqCst);
                Err(err)
            }
            Err(_) => {
                self.aborted.fetch_add(1, Ordering::SeqCst);
                Err(StoreError::Timeout(timeout.as_millis() as u64))
            }
        }
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn insert_account(&self, mut account: Account) -> Result<Account, StoreError> {
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.iter().any(|a| a.username == account.username || a.email == account.email) {
            return Err(StoreError::Duplicate(account.username.clone()));
        }
        account.id = Some(ObjectId::new());
        accounts.push(account.clone());
        Ok(account)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        Ok(self.accounts.lock().unwrap().iter().find(|a| a.email == email).cloned())
    }

    async fn find_by_verification_code(&self, code: &str) -> Result<Option<Account>, StoreError> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.verification_code.as_deref() == Some(code))
            .cloned())
    }

    async fn find_many_by_ids(&self, ids: &[ObjectId]) -> Result<Vec<Account>, StoreError> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.id.map(|id| ids.contains(&id)).unwrap_or(false))
            .cloned()
            .collect())
    }

    async fn list_viewable(
        &self,
        excluded: &[ObjectId],
        skip: u64,
        limit: i64,
    ) -> Result<Vec<Account>, StoreError> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|a| a.profile_is_viewable)
            .filter(|a| a.id.map(|id| !excluded.contains(&id)).unwrap_or(true))
            .skip(skip as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn update_profile(
        &self,
        id: &ObjectId,
        update: &ProfileUpdate,
    ) -> Result<Option<Account>, StoreError> {
        Ok(self.update_one(id, |account| {
            match update {
                ProfileUpdate::ProfileIsViewable(v) => account.profile_is_viewable = *v,
                ProfileUpdate::AcceptMessages(v) => account.accept_messages = *v,
                ProfileUpdate::DisplayFollowerCount(v) => account.display_follower_count = *v,
                ProfileUpdate::CurrentBadgeUrl(v) => account.current_badge_url = Some(v.trim().to_string()),
                ProfileUpdate::ProfilePictureUrl(v) => account.profile_picture_url = Some(v.trim().to_string()),
                ProfileUpdate::ProfileBackgroundPictureUrl(v) => {
                    account.profile_background_picture_url = Some(v.trim().to_string())
                }
                ProfileUpdate::CurrentTagLine(v) => account.current_tag_line = Some(v.trim().to_string()),
            }
            true
        }))
    }

    async fn mark_verified(&self, id: &ObjectId) -> Result<Option<Account>, StoreError> {
        Ok(self.update_one(id, |account| {
            if account.is_verified {
                return false;
            }
            account.is_verified = true;
            true
        }))
    }

    async fn set_reset_token(
        &self,
        id: &ObjectId,
        token: &str,
        expires_at: i64,
    ) -> Result<Option<Account>, StoreError> {
        Ok(self.update_one(id, |account| {
            account.token_hash = Some(token.to_string());
            account.token_expires_at = expires_at;
            true
        }))
    }

    async fn find_by_reset_token(&self, token: &str) -> Result<Option<Account>, StoreError> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.token_hash.as_deref() == Some(token))
            .cloned())
    }

    async fn update_password(
        &self,
        id: &ObjectId,
        password_hash: &str,
    ) -> Result<Option<Account>, StoreError> {
        Ok(self.update_one(id, |account| {
            account.password_hash = password_hash.to_string();
            account.token_hash = None;
            account.token_expires_at = 0;
            true
        }))
    }

    async fn delete_account(&self, id: &ObjectId) -> Result<Option<Account>, StoreError> {
        let mut accounts = self.accounts.lock().unwrap();
        let position = accounts.iter().position(|a| a.id.as_ref() == Some(id));
        Ok(position.map(|index| accounts.remove(index)))
    }

    async fn find_flag(
        &self,
        flagger_id: &ObjectId,
        flagged_username: &str,
    ) -> Result<Option<Flag>, StoreError> {
        Ok(self
            .flags
            .lock()
            .unwrap()
            .iter()
            .find(|f| &f.flagger_id == flagger_id && f.flagged_username == flagged_username)
            .cloned())
    }

    async fn insert_flag(&self, flag: Flag) -> Result<Option<Account>, StoreError> {
        let mut flags = self.flags.lock().unwrap();
        if flags
            .iter()
            .any(|f| f.flagger_id == flag.flagger_id && f.flagged_username == flag.flagged_username)
        {
            return Err(StoreError::Duplicate("flag".to_string()));
        }

        let mut accounts = self.accounts.lock().unwrap();
        let Some(account) = accounts.iter_mut().find(|a| a.username == flag.flagged_username) else {
            return Ok(None);
        };
        account.flag_count.push(flag.id);
        account.updated_at = DateTime::now();
        let updated = account.clone();
        flags.push(flag);
        Ok(Some(updated))
    }
}

/// 키별 요약을 보관하고 삭제 호출을 기록하는 캐시
#[derive(Default)]
pub(crate) struct RecordingCache {
    entries: Mutex<HashMap<String, UserResponse>>,
    deleted: Mutex<Vec<String>>,
    fail: AtomicBool,
}

impl RecordingCache {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn fail_all(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    pub(crate) fn put(&self, key: &str, summary: UserResponse) {
        self.entries.lock().unwrap().insert(key.to_string(), summary);
    }

    pub(crate) fn contains(&self, key: &str) -> bool {
        self.entries.lock().unwrap().contains_key(key)
    }

    pub(crate) fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    fn check(&self) -> Result<(), CacheError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(CacheError::Backend("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl LookupCache for RecordingCache {
    async fn get_summary(&self, key: &str) -> Result<Option<UserResponse>, CacheError> {
        self.check()?;
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn set_summary(
        &self,
        key: &str,
        summary: &UserResponse,
        _ttl_seconds: u64,
    ) -> Result<(), CacheError> {
        self.check()?;
        self.put(key, summary.clone());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.check()?;
        self.entries.lock().unwrap().remove(key);
        self.deleted.lock().unwrap().push(key.to_string());
        Ok(())
    }
}

/// 발행된 (사용자명, 종류) 쌍을 기록하는 이벤트 발행기
#[derive(Default)]
pub(crate) struct RecordingEmitter {
    published: Mutex<Vec<(AccountSnapshot, ChangeKind)>>,
    attempts: AtomicUsize,
    fail: AtomicBool,
}

impl RecordingEmitter {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn fail_all(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    pub(crate) fn published(&self) -> Vec<(String, ChangeKind)> {
        self.published
            .lock()
            .unwrap()
            .iter()
            .map(|(snapshot, kind)| (snapshot.summary.username.clone(), *kind))
            .collect()
    }

    pub(crate) fn snapshots(&self) -> Vec<AccountSnapshot> {
        self.published.lock().unwrap().iter().map(|(s, _)| s.clone()).collect()
    }

    pub(crate) fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EventEmitter for RecordingEmitter {
    async fn publish(&self, snapshot: AccountSnapshot, kind: ChangeKind) -> Result<(), EventError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(EventError::Delivery("broker unavailable".to_string()));
        }
        self.published.lock().unwrap().push((snapshot, kind));
        Ok(())
    }
}

pub(crate) fn side_effects(cache: &Arc<RecordingCache>, events: &Arc<RecordingEmitter>) -> SideEffects {
    SideEffects::new(cache.clone(), events.clone())
}

/// 조건이 참이 될 때까지 잠시 기다립니다. 백그라운드 작업 확인용입니다.
pub(crate) async fn eventually<F: Fn() -> bool>(condition: F) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}

/// 백그라운드 작업이 돌 기회를 준 뒤 반환합니다.
pub(crate) async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

pub(crate) fn test_settings() -> ServiceSettings {
    ServiceSettings {
        transaction_timeout: TEST_TIMEOUT,
        cache_ttl_seconds: 600,
        page_size: 20,
        bcrypt_cost: 4,
        reset_token_ttl: Duration::from_secs(30 * 60),
        reset_url_base: "http://localhost/api/v1/auth/reset".to_string(),
    }
}

/// HTTP 핸들러 테스트용 조립체
pub(crate) struct TestApp {
    pub store: Arc<InMemoryAccountStore>,
    pub cache: Arc<RecordingCache>,
    pub events: Arc<RecordingEmitter>,
    pub state: web::Data<AppState>,
}

impl TestApp {
    pub(crate) fn new() -> Self {
        let store = InMemoryAccountStore::new();
        let cache = RecordingCache::new();
        let events = RecordingEmitter::new();
        let state = web::Data::new(AppState::new(
            store.clone(),
            cache.clone(),
            events.clone(),
            Arc::new(TokenService::new("handler-test-secret", 1)),
            test_settings(),
        ));

        Self {
            store,
            cache,
            events,
            state,
        }
    }

    /// 저장된 계정으로 발급한 `Authorization` 헤더 값
    pub(crate) fn bearer(&self, username: &str) -> String {
        let account = self.store.get(username);
        let token = self.state.tokens.generate_access_token(&account).unwrap();
        format!("Bearer {}", token)
    }
}
