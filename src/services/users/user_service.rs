//! 계정 서비스
//!
//! HTTP 핸들러와 저장소/캐시/이벤트 사이의 얇은 오케스트레이션 계층입니다.
//! 관계 변경(차단/팔로우)은 [`RelationshipMutator`]에 그대로 위임합니다.

use std::sync::Arc;
use std::time::Duration;

use bcrypt::{hash, verify};
use log::{debug, info, warn};
use mongodb::bson::oid::ObjectId;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::relationship_service::RelationshipMutator;
use super::side_effects::SideEffects;
use crate::caching::{user_lookup_key, LookupCache};
use crate::config::{CacheConfig, PageConfig, PasswordConfig, PasswordResetConfig, TransactionConfig};
use crate::core::errors::{AppError, AppResult, StoreError};
use crate::domain::dto::users::request::{CreateUserRequest, LoginRequest};
use crate::domain::dto::users::response::{CreateUserResponse, LoginResponse, UserResponse};
use crate::domain::entities::flags::flag::Flag;
use crate::domain::entities::users::user::Account;
use crate::domain::models::profile::ProfileUpdate;
use crate::events::{ChangeKind, EventEmitter};
use crate::repositories::users::store::AccountStore;
use crate::services::auth::token_service::TokenService;
use crate::utils::string_utils::{looks_like_email, normalize_identifier, validate_required_string};

/// 서비스 동작 파라미터
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub transaction_timeout: Duration,
    pub cache_ttl_seconds: u64,
    pub page_size: u32,
    pub bcrypt_cost: u32,
    pub reset_token_ttl: Duration,
    pub reset_url_base: String,
}

impl ServiceSettings {
    pub fn from_config() -> Self {
        Self {
            transaction_timeout: TransactionConfig::timeout(),
            cache_ttl_seconds: CacheConfig::ttl_seconds(),
            page_size: PageConfig::users_page_size(),
            bcrypt_cost: PasswordConfig::bcrypt_cost(),
            reset_token_ttl: PasswordResetConfig::token_ttl(),
            reset_url_base: PasswordResetConfig::url_base(),
        }
    }
}

pub struct AccountService {
    store: Arc<dyn AccountStore>,
    relationships: RelationshipMutator,
    side_effects: SideEffects,
    tokens: Arc<TokenService>,
    settings: ServiceSettings,
}

/// `uuid v4` + `-` + 그 uuid의 SHA-256 hex
fn generate_verification_code() -> String {
    let id = Uuid::new_v4().to_string();
    let digest = Sha256::digest(id.as_bytes());
    format!("{}-{:x}", id, digest)
}

fn not_found() -> AppError {
    AppError::NotFound("사용자를 찾을 수 없습니다".to_string())
}

impl AccountService {
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
        let side_effects = SideEffects::new(cache, events);
        let relationships = RelationshipMutator::new(
            store.clone(),
            side_effects.clone(),
            settings.transaction_timeout,
        );

        Self {
            store,
            relationships,
            side_effects,
            tokens,
            settings,
        }
    }

    async fn require_account(&self, id: &ObjectId) -> AppResult<Account> {
        self.store.find_by_id(id).await?.ok_or_else(not_found)
    }

    /// 회원가입
    pub async fn create_user(&self, request: CreateUserRequest) -> AppResult<CreateUserResponse> {
        let username = normalize_identifier(&request.username);
        let email = normalize_identifier(&request.email);

        if self.store.find_by_username(&username).await?.is_some() {
            return Err(AppError::ConflictError("이미 사용 중인 사용자명입니다".to_string()));
        }
        if self.store.find_by_email(&email).await?.is_some() {
            return Err(AppError::ConflictError("이미 사용 중인 이메일입니다".to_string()));
        }

        let hash_start = std::time::Instant::now();
        let password_hash = hash(&request.password, self.settings.bcrypt_cost)
            .map_err(|e| AppError::InternalError(format!("비밀번호 해싱 실패: {}", e)))?;
        debug!("Password hashing took: {:?}", hash_start.elapsed());

        let account = Account::new_local(username, email, password_hash, generate_verification_code());
        let created = self.store.insert_account(account).await?;

        info!("👤 사용자 생성: {}", created.username);
        self.side_effects.emit(created.clone(), ChangeKind::Created);

        Ok(CreateUserResponse {
            user: UserResponse::from(created),
            message: "사용자가 성공적으로 생성되었습니다".to_string(),
        })
    }

    /// 로그인. 식별자가 이메일 형태면 이메일로, 아니면 사용자명으로 찾습니다.
    pub async fn login(&self, request: LoginRequest) -> AppResult<LoginResponse> {
        let identifier = normalize_identifier(&validate_required_string(&request.identifier, "식별자")?);
        let invalid = || AppError::AuthenticationError("잘못된 사용자명/이메일 또는 비밀번호입니다".to_string());

        let account = if looks_like_email(&identifier) {
            self.store.find_by_email(&identifier).await?
        } else {
            self.store.find_by_username(&identifier).await?
        }
        .ok_or_else(invalid)?;

        let is_valid = verify(&request.password, &account.password_hash)
            .map_err(|e| AppError::InternalError(format!("비밀번호 검증 실패: {}", e)))?;
        if !is_valid {
            return Err(invalid());
        }
        if account.is_locked {
            return Err(AppError::AuthorizationError("잠긴 계정입니다".to_string()));
        }

        let access_token = self.tokens.generate_access_token(&account)?;
        Ok(LoginResponse::new(account, access_token, self.tokens.expires_in()))
    }

    /// 이메일 인증 코드 확인
    pub async fn verify_account(&self, code: &str) -> AppResult<()> {
        let account = self
            .store
            .find_by_verification_code(code)
            .await?
            .ok_or_else(|| AppError::NotFound("유효하지 않은 인증 코드입니다".to_string()))?;

        if account.is_verified {
            return Err(AppError::ConflictError("이미 인증된 계정입니다".to_string()));
        }

        let verified = self
            .store
            .mark_verified(&account.object_id()?)
            .await?
            .ok_or_else(|| AppError::ConflictError("이미 인증된 계정입니다".to_string()))?;

        self.side_effects.invalidate(&verified.username);
        self.side_effects.emit(verified, ChangeKind::Updated);
        Ok(())
    }

    /// 비밀번호 재설정 링크 발급
    ///
    /// 아직 유효한 토큰이 있으면 그대로 다시 쓰고, 없거나 만료됐으면 새로 만듭니다.
    /// 메일 발송 대신 링크를 로그로 남깁니다.
    pub async fn request_password_reset(&self, email: &str) -> AppResult<()> {
        let email = normalize_identifier(email);
        let account = self
            .store
            .find_by_email(&email)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("등록되지 않은 이메일입니다: {}", email)))?;

        let now = chrono::Utc::now().timestamp();
        let token = match account.active_reset_token(now) {
            Some(token) => token.to_string(),
            None => {
                let token = generate_verification_code();
                let expires_at = now + self.settings.reset_token_ttl.as_secs() as i64;
                self.store
                    .set_reset_token(&account.object_id()?, &token, expires_at)
                    .await?
                    .ok_or_else(not_found)?;
                token
            }
        };

        info!("🔑 비밀번호 재설정 링크 ({}): {}/{}", account.username, self.settings.reset_url_base, token);
        Ok(())
    }

    /// 재설정 토큰으로 비밀번호를 바꿉니다. 성공하면 토큰은 지워집니다.
    pub async fn reset_password(&self, token: &str, password: &str) -> AppResult<()> {
        if password.chars().count() < 8 {
            return Err(AppError::ValidationError("비밀번호는 최소 8자 이상이어야 합니다".to_string()));
        }

        let account = self
            .store
            .find_by_reset_token(token)
            .await?
            .ok_or_else(|| AppError::NotFound("유효하지 않은 재설정 토큰입니다".to_string()))?;

        if account.active_reset_token(chrono::Utc::now().timestamp()).is_none() {
            return Err(AppError::AuthenticationError("만료된 재설정 토큰입니다".to_string()));
        }

        let password_hash = hash(password, self.settings.bcrypt_cost)
            .map_err(|e| AppError::InternalError(format!("비밀번호 해싱 실패: {}", e)))?;

        let updated = self
            .store
            .update_password(&account.object_id()?, &password_hash)
            .await?
            .ok_or_else(not_found)?;

        info!("🔑 비밀번호 재설정 완료: {}", updated.username);
        self.side_effects.invalidate(&updated.username);
        Ok(())
    }

    /// 사용자명 조회 (read-through 캐시)
    pub async fn get_user_by_username(&self, username: &str) -> AppResult<UserResponse> {
        let username = normalize_identifier(username);
        let key = user_lookup_key(&username);
        let cache = self.side_effects.cache();

        match cache.get_summary(&key).await {
            Ok(Some(summary)) => {
                debug!("캐시 적중: {}", key);
                return Ok(summary);
            }
            Ok(None) => {}
            Err(e) => warn!("⚠️ 캐시 조회 실패 (key={}): {}", key, e),
        }

        let account = self.store.find_by_username(&username).await?.ok_or_else(not_found)?;
        let summary = UserResponse::from(account);

        if let Err(e) = cache.set_summary(&key, &summary, self.settings.cache_ttl_seconds).await {
            warn!("⚠️ 캐시 저장 실패 (key={}): {}", key, e);
        }
        Ok(summary)
    }

    pub async fn get_user_by_id(&self, id: &str) -> AppResult<UserResponse> {
        let object_id = ObjectId::parse_str(id)
            .map_err(|_| AppError::ValidationError("유효하지 않은 ID 형식입니다".to_string()))?;
        Ok(UserResponse::from(self.require_account(&object_id).await?))
    }

    /// 공개 프로필 목록. 요청자 본인과 차단 관계에 있는 계정은 빠집니다.
    pub async fn list_users(&self, actor_id: &ObjectId, page: u32) -> AppResult<Vec<UserResponse>> {
        let actor = self.require_account(actor_id).await?;

        let mut excluded = Vec::with_capacity(actor.block_list.len() + actor.blocked_by_list.len() + 1);
        excluded.push(*actor_id);
        excluded.extend(actor.block_list.iter().copied());
        excluded.extend(actor.blocked_by_list.iter().copied());

        let page_size = self.settings.page_size;
        let skip = u64::from(page.max(1) - 1) * u64::from(page_size);

        let accounts = self
            .store
            .list_viewable(&excluded, skip, i64::from(page_size))
            .await?;
        Ok(accounts.into_iter().map(UserResponse::from).collect())
    }

    pub async fn list_blocked_users(&self, actor_id: &ObjectId) -> AppResult<Vec<UserResponse>> {
        let actor = self.require_account(actor_id).await?;
        let accounts = self.store.find_many_by_ids(&actor.block_list).await?;
        Ok(accounts.into_iter().map(UserResponse::from).collect())
    }

    pub async fn update_profile(
        &self,
        actor_id: &ObjectId,
        update: ProfileUpdate,
    ) -> AppResult<UserResponse> {
        update.validate()?;

        let updated = self
            .store
            .update_profile(actor_id, &update)
            .await?
            .ok_or_else(not_found)?;

        debug!("프로필 변경: {} ({})", updated.username, update.field_name());
        self.side_effects.invalidate(&updated.username);
        self.side_effects.emit(updated.clone(), ChangeKind::Updated);
        Ok(UserResponse::from(updated))
    }

    /// 신고. (신고자, 대상) 쌍마다 한 번만 허용됩니다.
    pub async fn flag_user(
        &self,
        flagger_id: &ObjectId,
        flagged_username: &str,
        reason: &str,
    ) -> AppResult<()> {
        let flagged_username = normalize_identifier(flagged_username);
        let reason = validate_required_string(reason, "신고 사유")?;

        let target = self
            .store
            .find_by_username(&flagged_username)
            .await?
            .ok_or_else(not_found)?;
        if target.id.as_ref() == Some(flagger_id) {
            return Err(AppError::ValidationError("자기 자신은 신고할 수 없습니다".to_string()));
        }

        let already_flagged = || AppError::ConflictError("이미 신고한 사용자입니다".to_string());
        if self.store.find_flag(flagger_id, &flagged_username).await?.is_some() {
            return Err(already_flagged());
        }

        let flag = Flag::new(*flagger_id, flagged_username, reason);
        let flagged = match self.store.insert_flag(flag).await {
            Ok(Some(account)) => account,
            Ok(None) => return Err(not_found()),
            Err(StoreError::Duplicate(_)) => return Err(already_flagged()),
            Err(e) => return Err(e.into()),
        };

        info!("🚩 신고 접수: {} (누적 {})", flagged.username, flagged.flag_count.len());
        self.side_effects.emit(flagged, ChangeKind::Updated);
        Ok(())
    }

    /// 계정 삭제. 다른 계정의 관계 목록에 남은 참조는 정리하지 않습니다.
    pub async fn delete_user(&self, actor_id: &ObjectId) -> AppResult<()> {
        let deleted = self
            .store
            .delete_account(actor_id)
            .await?
            .ok_or_else(not_found)?;

        info!("🗑️ 사용자 삭제: {}", deleted.username);
        self.side_effects.invalidate(&deleted.username);
        self.side_effects.emit(deleted, ChangeKind::Deleted);
        Ok(())
    }

    pub async fn block_user(&self, actor_id: &ObjectId, target_username: &str) -> AppResult<()> {
        let target = normalize_identifier(target_username);
        Ok(self.relationships.block(actor_id, &target).await?)
    }

    pub async fn unblock_user(&self, actor_id: &ObjectId, target_username: &str) -> AppResult<()> {
        let target = normalize_identifier(target_username);
        Ok(self.relationships.unblock(actor_id, &target).await?)
    }

    pub async fn follow_user(&self, actor_username: &str, target_username: &str) -> AppResult<()> {
        let target = normalize_identifier(target_username);
        Ok(self.relationships.follow(actor_username, &target).await?)
    }

    pub async fn unfollow_user(&self, actor_username: &str, target_username: &str) -> AppResult<()> {
        let target = normalize_identifier(target_username);
        Ok(self.relationships.unfollow(actor_username, &target).await?)
    }
}
