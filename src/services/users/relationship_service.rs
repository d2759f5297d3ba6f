//! # 관계 변경 (차단 / 팔로우)
//!
//! 차단, 차단 해제, 팔로우, 언팔로우를 두 문서에 대한 하나의 트랜잭션으로 처리합니다.
//! 커밋 후에는 캐시 무효화와 변경 이벤트 발행을 백그라운드로 시작하고 기다리지 않습니다.
//!
//! ## 불변식
//!
//! - 차단 대칭: A의 `block_list`에 B가 있으면, 그리고 그때만 B의 `blocked_by_list`에 A가 있습니다.
//! - 팔로우 대칭: A가 B를 팔로우하면 A의 `following`에 B가, B의 `followers`에 A가 있고
//!   B의 `follower_count`는 `followers` 길이와 같습니다.
//!
//! ## 흐름
//!
//! ```text
//! 검증 (NotFound / InvalidOperation / AlreadyBlocked / NotBlocked)
//!   │   실패 시 아무것도 쓰지 않고 즉시 반환
//!   ▼
//! transact([actor 쓰기, target 쓰기], timeout)   ← 전부 또는 전무
//!   │
//!   ├─▶ tokio::spawn(캐시 삭제)      ┐ 실패는 로그만
//!   └─▶ tokio::spawn(이벤트 발행)    ┘
//! ```
//!
//! 조건부 쓰기(가드)로 검증과 쓰기 사이의 경쟁을 닫습니다. 예를 들어 차단 쓰기는
//! "대상의 `blocked_by_list`에 요청자가 아직 없을 때만" 적용됩니다.

use std::sync::Arc;
use std::time::Duration;

use log::{error, info};
use mongodb::bson::oid::ObjectId;

use super::side_effects::SideEffects;
use crate::core::errors::{BlockError, FollowError, StoreError};
use crate::domain::entities::users::user::Account;
use crate::events::ChangeKind;
use crate::repositories::users::store::{
    DocumentWrite, IdListField, IdentityStore, NameListField, WriteGuard,
};
use crate::utils::block_list::generate_new_block_list;

const BLOCK_FAILED: &str = "failed to block user";
const UNBLOCK_FAILED: &str = "failed to unblock user";

pub struct RelationshipMutator {
    store: Arc<dyn IdentityStore>,
    side_effects: SideEffects,
    transaction_timeout: Duration,
}

impl RelationshipMutator {
    pub fn new(
        store: Arc<dyn IdentityStore>,
        side_effects: SideEffects,
        transaction_timeout: Duration,
    ) -> Self {
        Self {
            store,
            side_effects,
            transaction_timeout,
        }
    }

    /// 사용자명으로 대상을 찾습니다. 조회 실패는 `failure` 메시지로 접습니다.
    async fn resolve_target(&self, username: &str, failure: &str) -> Result<(Account, ObjectId), BlockError> {
        let target = self
            .store
            .find_by_username(username)
            .await
            .map_err(|e| {
                error!("대상 조회 실패 (username={}): {}", username, e);
                BlockError::OperationFailed(failure.to_string())
            })?
            .ok_or(BlockError::NotFound)?;

        let target_id = target.object_id().map_err(|_| BlockError::NotFound)?;
        Ok((target, target_id))
    }

    /// 차단
    ///
    /// 요청자의 `block_list`에 대상을, 대상의 `blocked_by_list`에 요청자를 추가합니다.
    pub async fn block(&self, actor_id: &ObjectId, target_username: &str) -> Result<(), BlockError> {
        let (target, target_id) = self.resolve_target(target_username, BLOCK_FAILED).await?;

        if target_id == *actor_id {
            return Err(BlockError::InvalidOperation);
        }
        if target.is_blocked_by(actor_id) {
            return Err(BlockError::AlreadyBlocked);
        }

        let writes = vec![
            DocumentWrite::by_id(*actor_id).push_id(IdListField::BlockList, target_id),
            DocumentWrite::by_id(target_id)
                .guard(WriteGuard::IdAbsent {
                    field: IdListField::BlockedByList,
                    id: *actor_id,
                })
                .push_id(IdListField::BlockedByList, *actor_id),
        ];

        let updated = match self.store.transact(writes, self.transaction_timeout).await {
            Ok(updated) => updated,
            Err(StoreError::GuardFailed(_)) => return Err(BlockError::AlreadyBlocked),
            Err(StoreError::NoMatch(_)) => return Err(BlockError::NotFound),
            Err(e) => {
                error!("차단 트랜잭션 실패 (actor={}, target={}): {}", actor_id, target_username, e);
                return Err(BlockError::OperationFailed(BLOCK_FAILED.to_string()));
            }
        };

        info!("🚫 차단 완료: {} -> {}", actor_id, target_username);
        self.after_block_change(updated);
        Ok(())
    }

    /// 차단 해제
    ///
    /// 양쪽 목록에서 상대를 뺀 새 목록으로 통째로 교체합니다. 어느 한쪽에라도 없으면
    /// 고치지 않고 `NotBlocked`로 거절합니다.
    pub async fn unblock(&self, actor_id: &ObjectId, target_username: &str) -> Result<(), BlockError> {
        let (target, target_id) = self.resolve_target(target_username, UNBLOCK_FAILED).await?;

        if target_id == *actor_id {
            return Err(BlockError::InvalidOperation);
        }

        let (target_blocked_by, found) = generate_new_block_list(actor_id, &target.blocked_by_list);
        if !found {
            return Err(BlockError::NotBlocked);
        }

        let actor = self
            .store
            .find_by_id(actor_id)
            .await
            .map_err(|e| {
                error!("요청자 조회 실패 (actor={}): {}", actor_id, e);
                BlockError::OperationFailed(UNBLOCK_FAILED.to_string())
            })?
            .ok_or(BlockError::NotFound)?;

        let (actor_block_list, found) = generate_new_block_list(&target_id, &actor.block_list);
        if !found {
            return Err(BlockError::NotBlocked);
        }

        let writes = vec![
            DocumentWrite::by_id(*actor_id)
                .guard(WriteGuard::IdPresent {
                    field: IdListField::BlockList,
                    id: target_id,
                })
                .set_id_list(IdListField::BlockList, actor_block_list),
            DocumentWrite::by_id(target_id)
                .guard(WriteGuard::IdPresent {
                    field: IdListField::BlockedByList,
                    id: *actor_id,
                })
                .set_id_list(IdListField::BlockedByList, target_blocked_by),
        ];

        let updated = match self.store.transact(writes, self.transaction_timeout).await {
            Ok(updated) => updated,
            Err(StoreError::GuardFailed(_)) => return Err(BlockError::NotBlocked),
            Err(StoreError::NoMatch(_)) => return Err(BlockError::NotFound),
            Err(e) => {
                error!("차단 해제 트랜잭션 실패 (actor={}, target={}): {}", actor_id, target_username, e);
                return Err(BlockError::OperationFailed(UNBLOCK_FAILED.to_string()));
            }
        };

        info!("✅ 차단 해제 완료: {} -> {}", actor_id, target_username);
        self.after_block_change(updated);
        Ok(())
    }

    /// 팔로우
    ///
    /// 중복 검사는 하지 않습니다. 같은 요청을 반복하면 목록에 중복 항목이 생깁니다.
    pub async fn follow(&self, actor_username: &str, target_username: &str) -> Result<(), FollowError> {
        if actor_username == target_username {
            return Err(FollowError::InvalidOperation);
        }

        let writes = vec![
            DocumentWrite::by_username(actor_username)
                .push_name(NameListField::Following, target_username),
            DocumentWrite::by_username(target_username)
                .push_name(NameListField::Followers, actor_username)
                .inc_follower_count(1),
        ];

        let updated = self
            .store
            .transact(writes, self.transaction_timeout)
            .await
            .map_err(|e| match e {
                StoreError::NoMatch(_) => FollowError::NotFound,
                other => FollowError::Store(other),
            })?;

        info!("➕ 팔로우 완료: {} -> {}", actor_username, target_username);
        self.after_follow_change(updated);
        Ok(())
    }

    /// 언팔로우
    ///
    /// `follower_count`는 제거된 항목 수만큼 원자적으로 감소합니다.
    pub async fn unfollow(&self, actor_username: &str, target_username: &str) -> Result<(), FollowError> {
        if actor_username == target_username {
            return Err(FollowError::InvalidOperation);
        }

        let target = self
            .store
            .find_by_username(target_username)
            .await?
            .ok_or(FollowError::NotFound)?;

        let occurrences = target.followers.iter().filter(|name| *name == actor_username).count();
        if occurrences == 0 {
            return Err(FollowError::NotFollowing);
        }

        let writes = vec![
            DocumentWrite::by_username(actor_username)
                .pull_name(NameListField::Following, target_username),
            DocumentWrite::by_username(target_username)
                .guard(WriteGuard::NamePresent {
                    field: NameListField::Followers,
                    name: actor_username.to_string(),
                })
                .pull_name(NameListField::Followers, actor_username)
                .inc_follower_count(-(occurrences as i64)),
        ];

        let updated = self
            .store
            .transact(writes, self.transaction_timeout)
            .await
            .map_err(|e| match e {
                StoreError::NoMatch(_) => FollowError::NotFound,
                StoreError::GuardFailed(_) => FollowError::NotFollowing,
                other => FollowError::Store(other),
            })?;

        info!("➖ 언팔로우 완료: {} -> {}", actor_username, target_username);
        self.after_follow_change(updated);
        Ok(())
    }

    /// 차단 계열: 요청자(첫 번째 문서)의 캐시만 무효화, 양쪽 모두 이벤트 발행
    fn after_block_change(&self, updated: Vec<Account>) {
        if let Some(actor) = updated.first() {
            self.side_effects.invalidate(&actor.username);
        }
        for account in updated {
            self.side_effects.emit(account, ChangeKind::Updated);
        }
    }

    /// 팔로우 계열: 요약에 팔로워 목록이 포함되므로 양쪽 캐시를 무효화
    fn after_follow_change(&self, updated: Vec<Account>) {
        for account in updated {
            self.side_effects.invalidate(&account.username);
            self.side_effects.emit(account, ChangeKind::Updated);
        }
    }
}
