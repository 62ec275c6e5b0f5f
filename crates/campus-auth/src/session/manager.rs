//! High-level session flows built on the codec, registry, and resolver.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::info;
use uuid::Uuid;

use campus_core::config::auth::AuthConfig;
use campus_core::config::session::SessionConfig;
use campus_core::error::AppError;
use campus_core::result::AppResult;
use campus_entity::session::{DeviceInfo, SessionRecord};
use campus_entity::user::RoleCode;

use crate::context::AuthorizationContext;
use crate::directory::UserDirectory;
use crate::password::PasswordHasher;
use crate::registry::SessionRegistry;
use crate::scope::{ResolvedScope, RoleScopeResolver};
use crate::token::{TokenClaims, TokenCodec};

/// Everything produced by a successful login or role switch.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    /// The signed bearer token to hand to the client.
    pub token: String,
    /// The claims embedded in the token.
    pub claims: TokenClaims,
    /// The newly created session.
    pub session: SessionRecord,
    /// The resolved scope the session was validated against.
    pub scope: ResolvedScope,
    /// The session that was evicted by single-device enforcement, if any;
    /// used to notify the displaced device.
    pub evicted: Option<SessionRecord>,
}

/// Orchestrates credential checks, scope resolution, token issuance, and
/// registry bookkeeping for the whole session lifecycle.
pub struct SessionManager {
    codec: TokenCodec,
    registry: Arc<SessionRegistry>,
    resolver: Arc<RoleScopeResolver>,
    users: Arc<dyn UserDirectory>,
    hasher: PasswordHasher,
    multi_device_login: bool,
    online_window: Duration,
}

impl SessionManager {
    /// Wires a manager from its parts.
    pub fn new(
        codec: TokenCodec,
        registry: Arc<SessionRegistry>,
        resolver: Arc<RoleScopeResolver>,
        users: Arc<dyn UserDirectory>,
        hasher: PasswordHasher,
        auth_config: &AuthConfig,
        session_config: &SessionConfig,
    ) -> Self {
        Self {
            codec,
            registry,
            resolver,
            users,
            hasher,
            multi_device_login: auth_config.multi_device_login,
            online_window: Duration::minutes(session_config.online_window_minutes as i64),
        }
    }

    /// Authenticates credentials, resolves the claimed scope, and opens a
    /// new session.
    ///
    /// Unknown usernames and wrong passwords are indistinguishable to the
    /// caller. For admin, organization, and principal roles with
    /// multi-device login disabled, all prior sessions of the user are
    /// evicted before the new one is created; the whole sequence runs
    /// under the user's lock so two concurrent logins cannot both observe
    /// "no prior session".
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        claimed_role: RoleCode,
        school_id: Option<Uuid>,
        period_id: Option<Uuid>,
        device: &DeviceInfo,
    ) -> AppResult<LoginOutcome> {
        let account = self
            .users
            .find_account_by_username(username)
            .await?
            .ok_or_else(|| AppError::invalid_credentials("Invalid username or password"))?;

        if !self
            .hasher
            .verify_password(password, &account.user.password_hash)?
        {
            return Err(AppError::invalid_credentials("Invalid username or password"));
        }

        let outcome = self
            .open_session(Arc::new(account), claimed_role, school_id, period_id, device)
            .await?;

        self.users
            .update_last_login(outcome.claims.user_id, Utc::now())
            .await?;

        info!(
            user_id = %outcome.claims.user_id,
            role = %outcome.scope.role,
            school_id = %outcome.scope.school.id,
            evicted = outcome.evicted.is_some(),
            "User logged in"
        );
        Ok(outcome)
    }

    /// Replaces an authenticated session with one for a different (role,
    /// school, period) selection. The old session is invalidated first.
    pub async fn switch(
        &self,
        context: &AuthorizationContext,
        claimed_role: RoleCode,
        school_id: Option<Uuid>,
        period_id: Option<Uuid>,
        device: &DeviceInfo,
    ) -> AppResult<LoginOutcome> {
        // Reload the account so a newly granted or revoked assignment is
        // honored immediately.
        let account = self
            .users
            .find_account(context.user_id())
            .await?
            .ok_or_else(|| AppError::session_not_found("Account no longer exists"))?;

        self.registry.delete_by_id(context.session().id).await?;

        let outcome = self
            .open_session(Arc::new(account), claimed_role, school_id, period_id, device)
            .await?;

        info!(
            user_id = %context.user_id(),
            role = %outcome.scope.role,
            school_id = %outcome.scope.school.id,
            "Role switched"
        );
        Ok(outcome)
    }

    /// Verifies a bearer token and builds the request context.
    ///
    /// The registry entry is touched as a side effect; the touch never
    /// blocks on the store.
    pub async fn authenticate(&self, token: &str) -> AppResult<AuthorizationContext> {
        let claims = self.codec.parse(token)?;

        let entry = self
            .registry
            .find_by_token(token)
            .ok_or_else(|| AppError::session_not_found("Session not found or expired"))?;

        let scope = self
            .resolver
            .resolve(
                &entry.account,
                claims.role_code,
                claims.school_id,
                claims.period_id,
            )
            .await?;

        self.registry.touch(token, Utc::now());

        Ok(AuthorizationContext::new(entry.account, entry.record, scope))
    }

    /// Closes one session. Idempotent.
    pub async fn logout(&self, session_id: Uuid) -> AppResult<bool> {
        self.registry.delete_by_id(session_id).await
    }

    /// Closes every session of a user. Returns the number closed.
    pub async fn logout_all(&self, user_id: Uuid) -> AppResult<u64> {
        let closed = {
            let lock = self.registry.lock_user(user_id);
            let _guard = lock.lock().await;
            self.registry.delete_by_user(user_id).await?
        };
        self.registry.release_user(user_id);
        Ok(closed)
    }

    /// Closes the given sessions of a user. Ids the user does not own are
    /// skipped, so one caller cannot revoke another user's device.
    /// Returns the number closed.
    pub async fn delete_sessions(&self, user_id: Uuid, ids: &[Uuid]) -> AppResult<u64> {
        let closed = {
            let lock = self.registry.lock_user(user_id);
            let _guard = lock.lock().await;

            let owned: HashSet<Uuid> = self
                .registry
                .find_by_user(user_id)
                .iter()
                .map(|r| r.id)
                .collect();

            let mut closed = 0u64;
            for id in ids {
                if owned.contains(id) && self.registry.delete_by_id(*id).await? {
                    closed += 1;
                }
            }
            closed
        };
        self.registry.release_user(user_id);
        Ok(closed)
    }

    /// All live sessions of a user, oldest first.
    pub fn list_sessions(&self, user_id: Uuid) -> Vec<SessionRecord> {
        self.registry.find_by_user(user_id)
    }

    /// Sessions active within the configured online window.
    pub fn online_count(&self) -> usize {
        self.registry.online_count(self.online_window)
    }

    async fn open_session(
        &self,
        account: Arc<campus_entity::user::UserAccount>,
        claimed_role: RoleCode,
        school_id: Option<Uuid>,
        period_id: Option<Uuid>,
        device: &DeviceInfo,
    ) -> AppResult<LoginOutcome> {
        let scope = self
            .resolver
            .resolve(&account, claimed_role, school_id, period_id)
            .await?;

        let (token, claims) = self.codec.issue(
            account.id(),
            scope.role,
            Some(scope.school.id),
            scope.period.as_ref().map(|p| p.id),
        )?;

        let enforce_single_device =
            scope.role.is_single_device_enforced() && !self.multi_device_login;

        let (session, evicted) = if enforce_single_device {
            let result = {
                let lock = self.registry.lock_user(account.id());
                let _guard = lock.lock().await;

                let evicted = self.registry.last_by_user(account.id());
                self.registry.delete_by_user(account.id()).await?;
                let session = self
                    .registry
                    .add(&token, &claims, Arc::clone(&account), device)
                    .await?;
                (session, evicted)
            };
            self.registry.release_user(account.id());
            result
        } else {
            let session = self
                .registry
                .add(&token, &claims, Arc::clone(&account), device)
                .await?;
            (session, None)
        };

        Ok(LoginOutcome {
            token,
            claims,
            session,
            scope,
            evicted,
        })
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("multi_device_login", &self.multi_device_login)
            .finish()
    }
}
