//! 계정 저장소 포트
//!
//! 관계 변경 코어는 [`IdentityStore`]만 알고, 계정 서비스는 그 확장인
//! [`AccountStore`]를 사용합니다. 운영 구현은
//! [`MongoAccountStore`](super::user_repo::MongoAccountStore)입니다.
//!
//! ## 트랜잭션 쓰기 모델
//!
//! 하나의 트랜잭션은 [`DocumentWrite`] 목록입니다. 각 쓰기는 선택자로 문서 하나를 고르고,
//! 선택적으로 가드(compare-and-set 조건)를 걸고, 갱신 연산들을 적용합니다.
//!
//! ```rust,ignore
//! let writes = vec![
//!     DocumentWrite::by_id(actor_id).push_id(IdListField::BlockList, target_id),
//!     DocumentWrite::by_id(target_id)
//!         .guard(WriteGuard::IdAbsent { field: IdListField::BlockedByList, id: actor_id })
//!         .push_id(IdListField::BlockedByList, actor_id),
//! ];
//! let updated = store.transact(writes, timeout).await?;
//! ```
//!
//! 모든 쓰기는 `updated_at`도 함께 갱신합니다.

use std::time::Duration;

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

use crate::core::errors::StoreError;
use crate::domain::entities::flags::flag::Flag;
use crate::domain::entities::users::user::Account;
use crate::domain::models::profile::ProfileUpdate;

/// ID 목록 필드
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdListField {
    BlockList,
    BlockedByList,
}

impl IdListField {
    pub fn field_name(&self) -> &'static str {
        match self {
            IdListField::BlockList => "block_list",
            IdListField::BlockedByList => "blocked_by_list",
        }
    }
}

/// 사용자명 목록 필드
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameListField {
    Following,
    Followers,
}

impl NameListField {
    pub fn field_name(&self) -> &'static str {
        match self {
            NameListField::Following => "following",
            NameListField::Followers => "followers",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AccountSelector {
    Id(ObjectId),
    Username(String),
}

impl std::fmt::Display for AccountSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountSelector::Id(id) => write!(f, "account id {}", id.to_hex()),
            AccountSelector::Username(name) => write!(f, "account '{}'", name),
        }
    }
}

/// 쓰기 조건. 만족하지 않으면 트랜잭션 전체가 `StoreError::GuardFailed`로 중단됩니다.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteGuard {
    IdPresent { field: IdListField, id: ObjectId },
    IdAbsent { field: IdListField, id: ObjectId },
    NamePresent { field: NameListField, name: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum AccountUpdate {
    PushId { field: IdListField, id: ObjectId },
    /// 목록 전체 교체
    SetIdList { field: IdListField, ids: Vec<ObjectId> },
    PushName { field: NameListField, name: String },
    /// 해당 이름을 모두 제거
    PullName { field: NameListField, name: String },
    IncFollowerCount(i64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentWrite {
    pub selector: AccountSelector,
    pub guard: Option<WriteGuard>,
    pub updates: Vec<AccountUpdate>,
}

impl DocumentWrite {
    pub fn by_id(id: ObjectId) -> Self {
        Self {
            selector: AccountSelector::Id(id),
            guard: None,
            updates: Vec::new(),
        }
    }

    pub fn by_username(username: impl Into<String>) -> Self {
        Self {
            selector: AccountSelector::Username(username.into()),
            guard: None,
            updates: Vec::new(),
        }
    }

    pub fn guard(mut self, guard: WriteGuard) -> Self {
        self.guard = Some(guard);
        self
    }

    pub fn push_id(mut self, field: IdListField, id: ObjectId) -> Self {
        self.updates.push(AccountUpdate::PushId { field, id });
        self
    }

    pub fn set_id_list(mut self, field: IdListField, ids: Vec<ObjectId>) -> Self {
        self.updates.push(AccountUpdate::SetIdList { field, ids });
        self
    }

    pub fn push_name(mut self, field: NameListField, name: impl Into<String>) -> Self {
        self.updates.push(AccountUpdate::PushName { field, name: name.into() });
        self
    }

    pub fn pull_name(mut self, field: NameListField, name: impl Into<String>) -> Self {
        self.updates.push(AccountUpdate::PullName { field, name: name.into() });
        self
    }

    pub fn inc_follower_count(mut self, delta: i64) -> Self {
        self.updates.push(AccountUpdate::IncFollowerCount(delta));
        self
    }

    /// 매칭 실패 시 돌려줄 에러. 가드가 있으면 가드 실패로 봅니다.
    pub fn no_match_error(&self) -> StoreError {
        match self.guard {
            Some(_) => StoreError::GuardFailed(self.selector.to_string()),
            None => StoreError::NoMatch(self.selector.to_string()),
        }
    }
}

/// 관계 변경 코어가 소비하는 저장소 인터페이스
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Account>, StoreError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, StoreError>;

    /// 쓰기 목록을 하나의 트랜잭션으로 적용하고, 갱신 후 문서를 쓰기 순서대로 돌려줍니다.
    ///
    /// 하나라도 실패하거나 `timeout`을 넘기면 트랜잭션은 abort 되고 어떤 변경도 보이지 않습니다.
    async fn transact(
        &self,
        writes: Vec<DocumentWrite>,
        timeout: Duration,
    ) -> Result<Vec<Account>, StoreError>;
}

/// 계정 서비스용 저장소 인터페이스
#[async_trait]
pub trait AccountStore: IdentityStore {
    /// 새 계정을 저장하고 ID가 채워진 계정을 돌려줍니다.
    /// 사용자명/이메일 중복은 `StoreError::Duplicate`입니다.
    async fn insert_account(&self, account: Account) -> Result<Account, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;

    async fn find_by_verification_code(&self, code: &str) -> Result<Option<Account>, StoreError>;

    async fn find_many_by_ids(&self, ids: &[ObjectId]) -> Result<Vec<Account>, StoreError>;

    /// 공개 프로필 계정 목록 (최신 가입 순). `excluded`의 ID는 제외합니다.
    async fn list_viewable(
        &self,
        excluded: &[ObjectId],
        skip: u64,
        limit: i64,
    ) -> Result<Vec<Account>, StoreError>;

    async fn update_profile(
        &self,
        id: &ObjectId,
        update: &ProfileUpdate,
    ) -> Result<Option<Account>, StoreError>;

    /// 아직 인증되지 않은 계정만 인증 처리합니다. 이미 인증됐거나 없으면 `None`.
    async fn mark_verified(&self, id: &ObjectId) -> Result<Option<Account>, StoreError>;

    /// 재설정 토큰과 만료 시각(unix 초)을 저장합니다.
    async fn set_reset_token(
        &self,
        id: &ObjectId,
        token: &str,
        expires_at: i64,
    ) -> Result<Option<Account>, StoreError>;

    async fn find_by_reset_token(&self, token: &str) -> Result<Option<Account>, StoreError>;

    /// 비밀번호 해시를 바꾸고 재설정 토큰을 지웁니다.
    async fn update_password(
        &self,
        id: &ObjectId,
        password_hash: &str,
    ) -> Result<Option<Account>, StoreError>;

    /// 삭제된 문서를 돌려줍니다. 다른 계정의 관계 목록은 건드리지 않습니다.
    async fn delete_account(&self, id: &ObjectId) -> Result<Option<Account>, StoreError>;

    async fn find_flag(
        &self,
        flagger_id: &ObjectId,
        flagged_username: &str,
    ) -> Result<Option<Flag>, StoreError>;

    /// 신고를 저장하고 대상 계정의 `flag_count`에 추가합니다.
    async fn insert_flag(&self, flag: Flag) -> Result<Option<Account>, StoreError>;
}
