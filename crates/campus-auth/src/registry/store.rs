//! Persistent backing store for the session registry.

use async_trait::async_trait;
use uuid::Uuid;

use campus_core::result::AppResult;
use campus_database::repositories::SessionRepository;
use campus_entity::session::SessionRecord;

/// Durable store the in-memory registry reconciles against.
///
/// The registry writes to the store before mutating memory, so the store
/// never lists a session memory has already dropped, only the reverse
/// (and only briefly).
#[async_trait]
pub trait SessionStoreBackend: Send + Sync {
    /// All non-expired session rows, oldest first.
    async fn load_active(&self) -> AppResult<Vec<SessionRecord>>;

    /// Persist a new session row.
    async fn insert(&self, record: &SessionRecord) -> AppResult<()>;

    /// Delete a row by session id. Returns whether a row matched.
    async fn delete_by_id(&self, id: Uuid) -> AppResult<bool>;

    /// Delete all rows for a user. Returns rows removed.
    async fn delete_by_user(&self, user_id: Uuid) -> AppResult<u64>;

    /// Delete rows past their expiry. Returns rows removed.
    async fn delete_expired(&self) -> AppResult<u64>;
}

#[async_trait]
impl SessionStoreBackend for SessionRepository {
    async fn load_active(&self) -> AppResult<Vec<SessionRecord>> {
        SessionRepository::load_active(self).await
    }

    async fn insert(&self, record: &SessionRecord) -> AppResult<()> {
        SessionRepository::insert(self, record).await
    }

    async fn delete_by_id(&self, id: Uuid) -> AppResult<bool> {
        SessionRepository::delete_by_id(self, id).await
    }

    async fn delete_by_user(&self, user_id: Uuid) -> AppResult<u64> {
        SessionRepository::delete_by_user(self, user_id).await
    }

    async fn delete_expired(&self) -> AppResult<u64> {
        SessionRepository::delete_expired(self).await
    }
}
