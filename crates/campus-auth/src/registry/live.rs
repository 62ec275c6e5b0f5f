//! The live session collection.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use campus_core::error::AppError;
use campus_core::result::AppResult;
use campus_entity::session::{DeviceInfo, SessionRecord};
use campus_entity::user::UserAccount;

use crate::directory::UserDirectory;
use crate::token::TokenClaims;

use super::store::SessionStoreBackend;

/// A live registry entry: the session row plus its resolved account.
#[derive(Debug, Clone)]
pub struct ActiveSession {
    /// The session row, as persisted (last-active-at may be newer here).
    pub record: SessionRecord,
    /// The account the session belongs to, loaded once at add/init time.
    pub account: Arc<UserAccount>,
}

/// Process-wide collection of active sessions.
///
/// Keyed by token hash; secondary indexes by session id and user id keep
/// deletion and per-user queries cheap. Reads (lookup, touch) take only a
/// shard lock; writes go to the persistent store first, then to memory.
pub struct SessionRegistry {
    /// token hash -> live entry.
    entries: DashMap<String, ActiveSession>,
    /// session id -> token hash.
    by_id: DashMap<Uuid, String>,
    /// user id -> token hashes of that user's sessions.
    by_user: DashMap<Uuid, HashSet<String>>,
    /// Per-user serialization points for the eviction sequence.
    user_locks: DashMap<Uuid, Arc<Mutex<()>>>,
    store: Arc<dyn SessionStoreBackend>,
    users: Arc<dyn UserDirectory>,
}

impl SessionRegistry {
    /// Creates an empty registry over the given store and user directory.
    pub fn new(store: Arc<dyn SessionStoreBackend>, users: Arc<dyn UserDirectory>) -> Self {
        Self {
            entries: DashMap::new(),
            by_id: DashMap::new(),
            by_user: DashMap::new(),
            user_locks: DashMap::new(),
            store,
            users,
        }
    }

    /// Hex SHA-256 of a bearer token; the registry never holds raw tokens.
    pub fn hash_token(token: &str) -> String {
        let digest = Sha256::digest(token.as_bytes());
        format!("{digest:x}")
    }

    /// Bulk-loads all non-expired sessions and their accounts from the
    /// store. Called once at startup; a failure here is fatal.
    ///
    /// Sessions referencing a user that no longer exists are dropped from
    /// the store rather than loaded.
    pub async fn init(&self) -> AppResult<usize> {
        let records = self.store.load_active().await?;

        let mut user_ids: Vec<Uuid> = records.iter().map(|r| r.user_id).collect();
        user_ids.sort_unstable();
        user_ids.dedup();

        let accounts = self.users.find_accounts(&user_ids).await?;
        let accounts: std::collections::HashMap<Uuid, Arc<UserAccount>> = accounts
            .into_iter()
            .map(|a| (a.id(), Arc::new(a)))
            .collect();

        let mut loaded = 0usize;
        for record in records {
            match accounts.get(&record.user_id) {
                Some(account) => {
                    self.insert_entry(record, Arc::clone(account));
                    loaded += 1;
                }
                None => {
                    warn!(
                        session_id = %record.id,
                        user_id = %record.user_id,
                        "Dropping session for missing user"
                    );
                    self.store.delete_by_id(record.id).await?;
                }
            }
        }

        info!(sessions = loaded, "Session registry initialized");
        Ok(loaded)
    }

    /// Persists and registers a new session for the given claims.
    ///
    /// Callers combining this with single-device eviction must hold the
    /// user's lock (see [`SessionRegistry::lock_user`]) across the whole
    /// capture/delete/add sequence.
    pub async fn add(
        &self,
        token: &str,
        claims: &TokenClaims,
        account: Arc<UserAccount>,
        device: &DeviceInfo,
    ) -> AppResult<SessionRecord> {
        let now = Utc::now();
        let expires_at = DateTime::<Utc>::from_timestamp(claims.exp, 0)
            .ok_or_else(|| AppError::internal("Token expiry out of range"))?;

        let record = SessionRecord {
            id: Uuid::new_v4(),
            token_hash: Self::hash_token(token),
            user_id: claims.user_id,
            device_token: device.device_token.clone(),
            ip_address: device.ip_address.clone(),
            user_agent: device.user_agent.clone(),
            created_at: now,
            expires_at,
            last_active_at: now,
        };

        self.store.insert(&record).await?;
        self.insert_entry(record.clone(), account);
        Ok(record)
    }

    /// Removes one session from the store and from memory. Idempotent.
    pub async fn delete_by_id(&self, id: Uuid) -> AppResult<bool> {
        let matched = self.store.delete_by_id(id).await?;
        if let Some((_, hash)) = self.by_id.remove(&id) {
            self.remove_entry(&hash);
        }
        Ok(matched)
    }

    /// Removes every session of a user from the store and from memory.
    /// Returns the number of store rows removed. Idempotent.
    pub async fn delete_by_user(&self, user_id: Uuid) -> AppResult<u64> {
        let removed = self.store.delete_by_user(user_id).await?;
        if let Some((_, hashes)) = self.by_user.remove(&user_id) {
            for hash in hashes {
                if let Some((_, entry)) = self.entries.remove(&hash) {
                    self.by_id.remove(&entry.record.id);
                }
            }
        }
        Ok(removed)
    }

    /// Looks up the live session for a raw bearer token.
    pub fn find_by_token(&self, token: &str) -> Option<ActiveSession> {
        let hash = Self::hash_token(token);
        let entry = self.entries.get(&hash)?;
        if entry.record.is_expired() {
            return None;
        }
        Some(entry.value().clone())
    }

    /// All live sessions of a user, oldest first.
    pub fn find_by_user(&self, user_id: Uuid) -> Vec<SessionRecord> {
        let hashes = match self.by_user.get(&user_id) {
            Some(set) => set.iter().cloned().collect::<Vec<_>>(),
            None => return Vec::new(),
        };
        let mut records: Vec<SessionRecord> = hashes
            .iter()
            .filter_map(|h| self.entries.get(h).map(|e| e.record.clone()))
            .collect();
        records.sort_by_key(|r| r.created_at);
        records
    }

    /// The most recently created session of a user, if any.
    pub fn last_by_user(&self, user_id: Uuid) -> Option<SessionRecord> {
        self.find_by_user(user_id).pop()
    }

    /// Updates last-active-at in memory only. Never touches the store, so
    /// it is safe on every authenticated request.
    pub fn touch(&self, token: &str, at: DateTime<Utc>) {
        let hash = Self::hash_token(token);
        if let Some(mut entry) = self.entries.get_mut(&hash) {
            entry.record.last_active_at = at;
        }
    }

    /// Counts sessions whose last activity falls within the trailing
    /// window ending now.
    pub fn online_count(&self, window: Duration) -> usize {
        let now = Utc::now();
        self.entries
            .iter()
            .filter(|e| e.record.is_online_within(window, now))
            .count()
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops expired sessions from the store and from memory. Returns the
    /// number of store rows removed. Run periodically in the background.
    pub async fn purge_expired(&self) -> AppResult<u64> {
        let removed = self.store.delete_expired().await?;

        let stale: Vec<String> = self
            .entries
            .iter()
            .filter(|e| e.record.is_expired())
            .map(|e| e.key().clone())
            .collect();
        for hash in stale {
            self.remove_entry(&hash);
        }

        Ok(removed)
    }

    /// The serialization point for all session mutations of one user.
    ///
    /// The single-device eviction sequence (capture last session, delete
    /// all, add new) must run entirely under this lock.
    pub fn lock_user(&self, user_id: Uuid) -> Arc<Mutex<()>> {
        self.user_locks
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Drops the user's lock entry once no caller holds it any more, so
    /// the lock map does not grow with every user that ever logged in.
    /// Callers release after dropping their `Arc` from [`lock_user`].
    pub fn release_user(&self, user_id: Uuid) {
        self.user_locks
            .remove_if(&user_id, |_, lock| Arc::strong_count(lock) == 1);
    }

    fn insert_entry(&self, record: SessionRecord, account: Arc<UserAccount>) {
        let hash = record.token_hash.clone();
        self.by_id.insert(record.id, hash.clone());
        self.by_user
            .entry(record.user_id)
            .or_default()
            .insert(hash.clone());
        self.entries.insert(hash, ActiveSession { record, account });
    }

    fn remove_entry(&self, hash: &str) {
        if let Some((_, entry)) = self.entries.remove(hash) {
            self.by_id.remove(&entry.record.id);
            if let Some(mut set) = self.by_user.get_mut(&entry.record.user_id) {
                set.remove(hash);
            }
        }
    }
}

impl std::fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("entries", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MemorySessionStore, MemoryUserDirectory, account, claims_for, device};
    use campus_core::error::ErrorKind;
    use campus_entity::user::RoleCode;

    fn registry_with(
        accounts: Vec<UserAccount>,
    ) -> (SessionRegistry, Arc<MemorySessionStore>, Arc<MemoryUserDirectory>) {
        let store = Arc::new(MemorySessionStore::default());
        let users = Arc::new(MemoryUserDirectory::with_accounts(accounts));
        let registry = SessionRegistry::new(store.clone(), users.clone());
        (registry, store, users)
    }

    #[tokio::test]
    async fn test_add_then_find_by_token() {
        let acct = account(Uuid::new_v4(), "alice");
        let (registry, store, _) = registry_with(vec![acct.clone()]);

        let claims = claims_for(&acct, RoleCode::Teacher);
        let record = registry
            .add("tok-alice", &claims, Arc::new(acct.clone()), &device())
            .await
            .unwrap();

        let found = registry.find_by_token("tok-alice").unwrap();
        assert_eq!(found.record.id, record.id);
        assert_eq!(found.account.id(), acct.id());
        assert_eq!(store.row_count(), 1);
        assert!(registry.find_by_token("tok-unknown").is_none());
    }

    #[tokio::test]
    async fn test_find_by_user_and_last() {
        let acct = account(Uuid::new_v4(), "bob");
        let (registry, _, _) = registry_with(vec![acct.clone()]);
        let arc = Arc::new(acct.clone());

        let claims = claims_for(&acct, RoleCode::Student);
        let first = registry
            .add("tok-1", &claims, arc.clone(), &device())
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = registry
            .add("tok-2", &claims, arc.clone(), &device())
            .await
            .unwrap();

        let sessions = registry.find_by_user(acct.id());
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].id, first.id);
        assert_eq!(sessions[1].id, second.id);
        assert_eq!(registry.last_by_user(acct.id()).unwrap().id, second.id);
        assert!(registry.last_by_user(Uuid::new_v4()).is_none());
    }

    #[tokio::test]
    async fn test_delete_by_id_is_idempotent() {
        let acct = account(Uuid::new_v4(), "carol");
        let (registry, store, _) = registry_with(vec![acct.clone()]);

        let claims = claims_for(&acct, RoleCode::Student);
        let record = registry
            .add("tok", &claims, Arc::new(acct), &device())
            .await
            .unwrap();

        assert!(registry.delete_by_id(record.id).await.unwrap());
        assert!(registry.find_by_token("tok").is_none());
        assert_eq!(store.row_count(), 0);

        // Second delete matches nothing but does not fail.
        assert!(!registry.delete_by_id(record.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_by_user_removes_all() {
        let acct = account(Uuid::new_v4(), "dave");
        let other = account(Uuid::new_v4(), "erin");
        let (registry, store, _) = registry_with(vec![acct.clone(), other.clone()]);

        let claims = claims_for(&acct, RoleCode::Student);
        registry
            .add("tok-a", &claims, Arc::new(acct.clone()), &device())
            .await
            .unwrap();
        registry
            .add("tok-b", &claims, Arc::new(acct.clone()), &device())
            .await
            .unwrap();
        let other_claims = claims_for(&other, RoleCode::Student);
        registry
            .add("tok-c", &other_claims, Arc::new(other.clone()), &device())
            .await
            .unwrap();

        assert_eq!(registry.delete_by_user(acct.id()).await.unwrap(), 2);
        assert!(registry.find_by_user(acct.id()).is_empty());
        assert!(registry.find_by_token("tok-c").is_some());
        assert_eq!(store.row_count(), 1);
    }

    #[tokio::test]
    async fn test_touch_updates_memory_only() {
        let acct = account(Uuid::new_v4(), "frank");
        let (registry, store, _) = registry_with(vec![acct.clone()]);

        let claims = claims_for(&acct, RoleCode::Student);
        registry
            .add("tok", &claims, Arc::new(acct), &device())
            .await
            .unwrap();

        let later = Utc::now() + Duration::minutes(10);
        registry.touch("tok", later);

        let entry = registry.find_by_token("tok").unwrap();
        assert_eq!(entry.record.last_active_at, later);
        // The store row is untouched.
        assert_ne!(store.rows()[0].last_active_at, later);
    }

    #[tokio::test]
    async fn test_online_count_respects_window() {
        let acct = account(Uuid::new_v4(), "gina");
        let (registry, _, _) = registry_with(vec![acct.clone()]);
        let arc = Arc::new(acct.clone());

        let claims = claims_for(&acct, RoleCode::Student);
        registry.add("tok-1", &claims, arc.clone(), &device()).await.unwrap();
        registry.add("tok-2", &claims, arc.clone(), &device()).await.unwrap();
        registry.touch("tok-2", Utc::now() - Duration::hours(2));

        assert_eq!(registry.online_count(Duration::minutes(15)), 1);
        assert_eq!(registry.online_count(Duration::hours(3)), 2);
    }

    #[tokio::test]
    async fn test_init_loads_active_sessions() {
        let acct = account(Uuid::new_v4(), "hank");
        let store = Arc::new(MemorySessionStore::default());
        let users = Arc::new(MemoryUserDirectory::with_accounts(vec![acct.clone()]));

        // Seed the store out of band, as if a previous process wrote it.
        let seeded = SessionRecord {
            id: Uuid::new_v4(),
            token_hash: SessionRegistry::hash_token("tok-seeded"),
            user_id: acct.id(),
            device_token: None,
            ip_address: "10.0.0.1".to_string(),
            user_agent: None,
            created_at: Utc::now() - Duration::days(1),
            expires_at: Utc::now() + Duration::days(30),
            last_active_at: Utc::now() - Duration::days(1),
        };
        store.seed(seeded.clone());

        let registry = SessionRegistry::new(store, users);
        assert_eq!(registry.init().await.unwrap(), 1);

        let found = registry.find_by_token("tok-seeded").unwrap();
        assert_eq!(found.record.id, seeded.id);
        assert_eq!(found.account.id(), acct.id());
    }

    #[tokio::test]
    async fn test_init_drops_sessions_for_missing_users() {
        let store = Arc::new(MemorySessionStore::default());
        let users = Arc::new(MemoryUserDirectory::with_accounts(vec![]));

        store.seed(SessionRecord {
            id: Uuid::new_v4(),
            token_hash: SessionRegistry::hash_token("tok-orphan"),
            user_id: Uuid::new_v4(),
            device_token: None,
            ip_address: "10.0.0.1".to_string(),
            user_agent: None,
            created_at: Utc::now(),
            expires_at: Utc::now() + Duration::days(30),
            last_active_at: Utc::now(),
        });

        let registry = SessionRegistry::new(store.clone(), users);
        assert_eq!(registry.init().await.unwrap(), 0);
        assert!(registry.is_empty());
        assert_eq!(store.row_count(), 0);
    }

    #[tokio::test]
    async fn test_init_fails_when_store_unavailable() {
        let store = Arc::new(MemorySessionStore::default());
        store.set_failing(true);
        let users = Arc::new(MemoryUserDirectory::with_accounts(vec![]));

        let registry = SessionRegistry::new(store, users);
        let err = registry.init().await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::StoreUnavailable);
    }

    #[tokio::test]
    async fn test_purge_expired_drops_stale_entries() {
        let acct = account(Uuid::new_v4(), "iris");
        let (registry, _, _) = registry_with(vec![acct.clone()]);

        let mut claims = claims_for(&acct, RoleCode::Student);
        claims.exp = (Utc::now() - Duration::hours(1)).timestamp();
        registry
            .add("tok-stale", &claims, Arc::new(acct.clone()), &device())
            .await
            .unwrap();

        let live_claims = claims_for(&acct, RoleCode::Student);
        registry
            .add("tok-live", &live_claims, Arc::new(acct), &device())
            .await
            .unwrap();

        assert_eq!(registry.purge_expired().await.unwrap(), 1);
        assert_eq!(registry.len(), 1);
        assert!(registry.find_by_token("tok-live").is_some());
    }

    #[tokio::test]
    async fn test_expired_entry_not_returned_by_find() {
        let acct = account(Uuid::new_v4(), "judy");
        let (registry, _, _) = registry_with(vec![acct.clone()]);

        let mut claims = claims_for(&acct, RoleCode::Student);
        claims.exp = (Utc::now() - Duration::seconds(1)).timestamp();
        registry
            .add("tok", &claims, Arc::new(acct), &device())
            .await
            .unwrap();

        assert!(registry.find_by_token("tok").is_none());
    }

    #[tokio::test]
    async fn test_release_user_drops_only_idle_locks() {
        let (registry, _, _) = registry_with(vec![]);
        let user_id = Uuid::new_v4();

        let lock = registry.lock_user(user_id);
        registry.release_user(user_id);
        // Still held by a caller, so the entry stays.
        assert_eq!(registry.user_locks.len(), 1);

        drop(lock);
        registry.release_user(user_id);
        assert!(registry.user_locks.is_empty());

        // Releasing an unknown user is a no-op.
        registry.release_user(Uuid::new_v4());
    }

    #[tokio::test]
    async fn test_concurrent_adds_all_land() {
        let acct = account(Uuid::new_v4(), "kate");
        let (registry, store, _) = registry_with(vec![acct.clone()]);
        let registry = Arc::new(registry);
        let arc = Arc::new(acct.clone());

        let mut handles = Vec::new();
        for i in 0..16 {
            let registry = registry.clone();
            let arc = arc.clone();
            let claims = claims_for(&acct, RoleCode::Student);
            handles.push(tokio::spawn(async move {
                registry
                    .add(&format!("tok-{i}"), &claims, arc, &device())
                    .await
                    .unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        assert_eq!(registry.len(), 16);
        assert_eq!(store.row_count(), 16);
        assert_eq!(registry.find_by_user(acct.id()).len(), 16);
    }
}
