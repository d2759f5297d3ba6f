//! MongoDB 계정 저장소
//!
//! `users`, `flags` 두 컬렉션을 사용합니다. 관계 변경 트랜잭션은
//! snapshot read concern, majority write concern으로 실행되며
//! 제한 시간을 넘기면 abort 됩니다. 다중 문서 트랜잭션이므로 레플리카셋이 필요합니다.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::TryStreamExt;
use log::{debug, info, warn};
use mongodb::{
    bson::{doc, oid::ObjectId, DateTime, Document},
    error::{ErrorKind, WriteFailure, TRANSIENT_TRANSACTION_ERROR},
    options::{
        Acknowledgment, FindOneAndUpdateOptions, IndexOptions, ReadConcern, ReturnDocument,
        TransactionOptions, WriteConcern,
    },
    ClientSession, Collection, IndexModel,
};
use tokio::time::Instant;

use super::store::{
    AccountSelector, AccountStore, AccountUpdate, DocumentWrite, IdentityStore, WriteGuard,
};
use crate::core::errors::StoreError;
use crate::db::Database;
use crate::domain::entities::flags::flag::Flag;
use crate::domain::entities::users::user::Account;
use crate::domain::models::profile::ProfileUpdate;

const USERS_COLLECTION: &str = "users";
const FLAGS_COLLECTION: &str = "flags";
const DUPLICATE_KEY_CODE: i32 = 11000;
const INITIAL_RETRY_DELAY: Duration = Duration::from_millis(5);
const MAX_RETRY_DELAY: Duration = Duration::from_millis(100);

#[derive(Clone)]
pub struct MongoAccountStore {
    db: Arc<Database>,
}

impl MongoAccountStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    fn users(&self) -> Collection<Account> {
        self.db.get_database().collection(USERS_COLLECTION)
    }

    fn flags(&self) -> Collection<Flag> {
        self.db.get_database().collection(FLAGS_COLLECTION)
    }

    /// 컬렉션 인덱스 생성
    ///
    /// - `users`: email/username 유니크, 가입일 내림차순, 인증 코드, 재설정 토큰
    /// - `flags`: (flagger_id, flagged_username) 유니크
    pub async fn create_indexes(&self) -> Result<(), StoreError> {
        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder()
                .unique(true)
                .name("email_unique".to_string())
                .build())
            .build();

        let username_index = IndexModel::builder()
            .keys(doc! { "username": 1 })
            .options(IndexOptions::builder()
                .unique(true)
                .name("username_unique".to_string())
                .build())
            .build();

        let created_at_index = IndexModel::builder()
            .keys(doc! { "created_at": -1 })
            .options(IndexOptions::builder()
                .name("created_at_desc".to_string())
                .build())
            .build();

        let verification_index = IndexModel::builder()
            .keys(doc! { "verification_code": 1 })
            .options(IndexOptions::builder()
                .sparse(true)
                .name("verification_code".to_string())
                .build())
            .build();

        let reset_token_index = IndexModel::builder()
            .keys(doc! { "token_hash": 1 })
            .options(IndexOptions::builder()
                .sparse(true)
                .name("token_hash".to_string())
                .build())
            .build();

        self.users()
            .create_indexes([
                email_index,
                username_index,
                created_at_index,
                verification_index,
                reset_token_index,
            ])
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let flag_pair_index = IndexModel::builder()
            .keys(doc! { "flagger_id": 1, "flagged_username": 1 })
            .options(IndexOptions::builder()
                .unique(true)
                .name("flagger_flagged_unique".to_string())
                .build())
            .build();

        self.flags()
            .create_indexes([flag_pair_index])
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        info!("✅ MongoDB 인덱스 생성 완료");
        Ok(())
    }

    fn transaction_options() -> TransactionOptions {
        TransactionOptions::builder()
            .read_concern(ReadConcern::snapshot())
            .write_concern(WriteConcern::builder().w(Acknowledgment::Majority).build())
            .build()
    }

    async fn start_transaction(&self) -> Result<ClientSession, StoreError> {
        let mut session = self
            .db
            .client()
            .start_session()
            .await
            .map_err(|e| StoreError::Transaction(e.to_string()))?;

        session
            .start_transaction()
            .with_options(Self::transaction_options())
            .await
            .map_err(|e| StoreError::Transaction(e.to_string()))?;

        Ok(session)
    }

    async fn abort(session: &mut ClientSession) {
        if let Err(e) = session.abort_transaction().await {
            warn!("트랜잭션 abort 실패: {}", e);
        }
    }

    /// 세션 하나로 한 번 시도합니다. 실패하거나 마감 시각을 넘기면 abort 합니다.
    async fn attempt_transaction(
        &self,
        writes: &[DocumentWrite],
        deadline: Instant,
        timeout_ms: u64,
    ) -> Result<Vec<Account>, AttemptError> {
        let mut session = self.start_transaction().await.map_err(AttemptError::Failed)?;

        match tokio::time::timeout_at(deadline, self.apply_and_commit(&mut session, writes)).await {
            Ok(Ok(updated)) => Ok(updated),
            Ok(Err(err)) => {
                Self::abort(&mut session).await;
                Err(err)
            }
            Err(_) => {
                Self::abort(&mut session).await;
                Err(AttemptError::Failed(StoreError::Timeout(timeout_ms)))
            }
        }
    }

    /// 세션 안에서 쓰기를 순서대로 적용한 뒤 커밋합니다.
    async fn apply_and_commit(
        &self,
        session: &mut ClientSession,
        writes: &[DocumentWrite],
    ) -> Result<Vec<Account>, AttemptError> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let mut updated = Vec::with_capacity(writes.len());
        for write in writes {
            let account = self
                .users()
                .find_one_and_update(filter_document(write), update_document(&write.updates))
                .with_options(options.clone())
                .session(&mut *session)
                .await
                .map_err(AttemptError::from_driver)?
                .ok_or_else(|| AttemptError::Failed(write.no_match_error()))?;
            updated.push(account);
        }

        session
            .commit_transaction()
            .await
            .map_err(AttemptError::from_driver)?;

        Ok(updated)
    }
}

/// 트랜잭션 한 번의 실패. `Transient`는 쓰기 충돌 등으로 처음부터 다시 시도할 수 있습니다.
#[derive(Debug)]
enum AttemptError {
    Transient(String),
    Failed(StoreError),
}

impl AttemptError {
    fn from_driver(e: mongodb::error::Error) -> Self {
        if e.contains_label(TRANSIENT_TRANSACTION_ERROR) {
            AttemptError::Transient(e.to_string())
        } else {
            AttemptError::Failed(map_write_error(e))
        }
    }
}

/// `Transient` 실패를 마감 시각까지 재시도합니다. 대기 간격은 두 배씩 늘어나고 상한이 있습니다.
async fn retry_transient<T, F, Fut>(
    deadline: Instant,
    timeout_ms: u64,
    mut attempt: F,
) -> Result<T, StoreError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AttemptError>>,
{
    let mut retry_delay = INITIAL_RETRY_DELAY;
    let mut tries: u32 = 1;

    loop {
        match attempt().await {
            Ok(value) => {
                if tries > 1 {
                    debug!("트랜잭션 재시도 성공 (시도 {}회)", tries);
                }
                return Ok(value);
            }
            Err(AttemptError::Failed(err)) => return Err(err),
            Err(AttemptError::Transient(msg)) => {
                if Instant::now() >= deadline {
                    return Err(StoreError::Timeout(timeout_ms));
                }
                warn!("일시적 트랜잭션 충돌, 재시도 ({}회차): {}", tries, msg);
                tokio::time::sleep_until((Instant::now() + retry_delay).min(deadline)).await;
                retry_delay = (retry_delay * 2).min(MAX_RETRY_DELAY);
                tries += 1;
            }
        }
    }
}

/// 쓰기 하나의 필터: 선택자 + 가드
pub(crate) fn filter_document(write: &DocumentWrite) -> Document {
    let mut filter = match &write.selector {
        AccountSelector::Id(id) => doc! { "_id": *id },
        AccountSelector::Username(name) => doc! { "username": name.as_str() },
    };

    if let Some(guard) = &write.guard {
        match guard {
            WriteGuard::IdPresent { field, id } => filter.insert(field.field_name(), *id),
            WriteGuard::IdAbsent { field, id } => {
                filter.insert(field.field_name(), doc! { "$ne": *id })
            }
            WriteGuard::NamePresent { field, name } => {
                filter.insert(field.field_name(), name.as_str())
            }
        };
    }

    filter
}

/// 갱신 연산들을 연산자별로 모은 update 문서
pub(crate) fn update_document(updates: &[AccountUpdate]) -> Document {
    let mut set = doc! { "updated_at": DateTime::now() };
    let mut push = Document::new();
    let mut pull = Document::new();
    let mut inc: i64 = 0;

    for update in updates {
        match update {
            AccountUpdate::PushId { field, id } => {
                push.insert(field.field_name(), *id);
            }
            AccountUpdate::SetIdList { field, ids } => {
                set.insert(field.field_name(), ids.clone());
            }
            AccountUpdate::PushName { field, name } => {
                push.insert(field.field_name(), name.as_str());
            }
            AccountUpdate::PullName { field, name } => {
                pull.insert(field.field_name(), name.as_str());
            }
            AccountUpdate::IncFollowerCount(delta) => inc += delta,
        }
    }

    let mut update = doc! { "$set": set };
    if !push.is_empty() {
        update.insert("$push", push);
    }
    if !pull.is_empty() {
        update.insert("$pull", pull);
    }
    if inc != 0 {
        update.insert("$inc", doc! { "follower_count": inc });
    }
    update
}

fn profile_update_document(update: &ProfileUpdate) -> Document {
    let field = update.field_name();
    let mut set = doc! { "updated_at": DateTime::now() };

    match update {
        ProfileUpdate::ProfileIsViewable(value)
        | ProfileUpdate::AcceptMessages(value)
        | ProfileUpdate::DisplayFollowerCount(value) => {
            set.insert(field, *value);
        }
        ProfileUpdate::CurrentBadgeUrl(value)
        | ProfileUpdate::ProfilePictureUrl(value)
        | ProfileUpdate::ProfileBackgroundPictureUrl(value)
        | ProfileUpdate::CurrentTagLine(value) => {
            set.insert(field, value.trim());
        }
    }

    doc! { "$set": set }
}

/// 새 비밀번호 저장과 함께 재설정 토큰을 비웁니다.
fn password_update_document(password_hash: &str) -> Document {
    doc! {
        "$set": {
            "password_hash": password_hash,
            "token_expires_at": 0_i64,
            "updated_at": DateTime::now(),
        },
        "$unset": { "token_hash": "" },
    }
}

fn is_duplicate_key(e: &mongodb::error::Error) -> bool {
    matches!(
        e.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(we)) if we.code == DUPLICATE_KEY_CODE
    )
}

fn map_write_error(e: mongodb::error::Error) -> StoreError {
    if is_duplicate_key(&e) {
        StoreError::Duplicate(e.to_string())
    } else {
        StoreError::Database(e.to_string())
    }
}

fn map_transaction_error(e: mongodb::error::Error) -> StoreError {
    if e.contains_label(TRANSIENT_TRANSACTION_ERROR) {
        StoreError::Transaction(e.to_string())
    } else {
        map_write_error(e)
    }
}

#[async_trait]
impl IdentityStore for MongoAccountStore {
    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Account>, StoreError> {
        self.users()
            .find_one(doc! { "_id": *id })
            .await
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, StoreError> {
        self.users()
            .find_one(doc! { "username": username })
            .await
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    /// 일시적 충돌(`TransientTransactionError`)은 제한 시간 안에서 처음부터 다시 시도합니다.
    /// 재시도에서는 가드가 최신 상태로 다시 평가됩니다.
    async fn transact(
        &self,
        writes: Vec<DocumentWrite>,
        timeout: Duration,
    ) -> Result<Vec<Account>, StoreError> {
        let deadline = Instant::now() + timeout;
        let timeout_ms = timeout.as_millis() as u64;
        let writes = &writes;

        let updated = retry_transient(deadline, timeout_ms, move || {
            self.attempt_transaction(writes, deadline, timeout_ms)
        })
        .await?;

        debug!("트랜잭션 커밋: 문서 {}개", updated.len());
        Ok(updated)
    }
}

#[async_trait]
impl AccountStore for MongoAccountStore {
    async fn insert_account(&self, mut account: Account) -> Result<Account, StoreError> {
        let result = self
            .users()
            .insert_one(&account)
            .await
            .map_err(map_write_error)?;

        let id = result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| StoreError::InvalidId(result.inserted_id.to_string()))?;
        account.id = Some(id);
        Ok(account)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        self.users()
            .find_one(doc! { "email": email })
            .await
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    async fn find_by_verification_code(&self, code: &str) -> Result<Option<Account>, StoreError> {
        self.users()
            .find_one(doc! { "verification_code": code })
            .await
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    async fn find_many_by_ids(&self, ids: &[ObjectId]) -> Result<Vec<Account>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let cursor = self
            .users()
            .find(doc! { "_id": { "$in": ids.to_vec() } })
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        cursor
            .try_collect::<Vec<Account>>()
            .await
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    async fn list_viewable(
        &self,
        excluded: &[ObjectId],
        skip: u64,
        limit: i64,
    ) -> Result<Vec<Account>, StoreError> {
        let cursor = self
            .users()
            .find(doc! {
                "profile_is_viewable": true,
                "_id": { "$nin": excluded.to_vec() },
            })
            .sort(doc! { "created_at": -1 })
            .skip(skip)
            .limit(limit)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        cursor
            .try_collect::<Vec<Account>>()
            .await
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    async fn update_profile(
        &self,
        id: &ObjectId,
        update: &ProfileUpdate,
    ) -> Result<Option<Account>, StoreError> {
        self.users()
            .find_one_and_update(doc! { "_id": *id }, profile_update_document(update))
            .with_options(FindOneAndUpdateOptions::builder()
                .return_document(ReturnDocument::After)
                .build())
            .await
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    async fn mark_verified(&self, id: &ObjectId) -> Result<Option<Account>, StoreError> {
        self.users()
            .find_one_and_update(
                doc! { "_id": *id, "is_verified": false },
                doc! { "$set": { "is_verified": true, "updated_at": DateTime::now() } },
            )
            .with_options(FindOneAndUpdateOptions::builder()
                .return_document(ReturnDocument::After)
                .build())
            .await
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    async fn set_reset_token(
        &self,
        id: &ObjectId,
        token: &str,
        expires_at: i64,
    ) -> Result<Option<Account>, StoreError> {
        self.users()
            .find_one_and_update(
                doc! { "_id": *id },
                doc! { "$set": {
                    "token_hash": token,
                    "token_expires_at": expires_at,
                    "updated_at": DateTime::now(),
                } },
            )
            .with_options(FindOneAndUpdateOptions::builder()
                .return_document(ReturnDocument::After)
                .build())
            .await
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    async fn find_by_reset_token(&self, token: &str) -> Result<Option<Account>, StoreError> {
        self.users()
            .find_one(doc! { "token_hash": token })
            .await
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    async fn update_password(
        &self,
        id: &ObjectId,
        password_hash: &str,
    ) -> Result<Option<Account>, StoreError> {
        self.users()
            .find_one_and_update(doc! { "_id": *id }, password_update_document(password_hash))
            .with_options(FindOneAndUpdateOptions::builder()
                .return_document(ReturnDocument::After)
                .build())
            .await
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    async fn delete_account(&self, id: &ObjectId) -> Result<Option<Account>, StoreError> {
        self.users()
            .find_one_and_delete(doc! { "_id": *id })
            .await
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    async fn find_flag(
        &self,
        flagger_id: &ObjectId,
        flagged_username: &str,
    ) -> Result<Option<Flag>, StoreError> {
        self.flags()
            .find_one(doc! { "flagger_id": *flagger_id, "flagged_username": flagged_username })
            .await
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    async fn insert_flag(&self, flag: Flag) -> Result<Option<Account>, StoreError> {
        let mut session = self.start_transaction().await?;

        let inserted = self
            .flags()
            .insert_one(&flag)
            .session(&mut session)
            .await
            .map_err(map_transaction_error);
        if let Err(err) = inserted {
            Self::abort(&mut session).await;
            return Err(err);
        }

        let updated = self
            .users()
            .find_one_and_update(
                doc! { "username": flag.flagged_username.as_str() },
                doc! {
                    "$push": { "flag_count": flag.id },
                    "$set": { "updated_at": DateTime::now() },
                },
            )
            .with_options(FindOneAndUpdateOptions::builder()
                .return_document(ReturnDocument::After)
                .build())
            .session(&mut session)
            .await
            .map_err(map_transaction_error);

        match updated {
            Ok(Some(account)) => {
                session
                    .commit_transaction()
                    .await
                    .map_err(|e| StoreError::Transaction(e.to_string()))?;
                Ok(Some(account))
            }
            Ok(None) => {
                Self::abort(&mut session).await;
                Ok(None)
            }
            Err(err) => {
                Self::abort(&mut session).await;
                Err(err)
            }
        }
    }
}
