//! Session entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A persisted user session.
///
/// Created at login or role switch, deleted on logout, switch, or
/// single-device eviction. The in-memory registry entry is the live twin
/// of this row and additionally holds the resolved user account.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SessionRecord {
    /// Unique session identifier.
    pub id: Uuid,
    /// SHA-256 hash of the bearer token (hex).
    pub token_hash: String,
    /// The user this session belongs to.
    pub user_id: Uuid,
    /// Opaque client device token (push registration etc.).
    pub device_token: Option<String>,
    /// IP address from which the session was created.
    pub ip_address: String,
    /// User-Agent header value.
    pub user_agent: Option<String>,
    /// When the session was created (login time).
    pub created_at: DateTime<Utc>,
    /// When the session expires (matches token expiry).
    pub expires_at: DateTime<Utc>,
    /// Last activity timestamp. Touched in memory on every authenticated
    /// request; persistence may lag.
    pub last_active_at: DateTime<Utc>,
}

impl SessionRecord {
    /// Check whether the session has expired.
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }

    /// Check whether the session counts as online within the given
    /// trailing window.
    pub fn is_online_within(&self, window: chrono::Duration, now: DateTime<Utc>) -> bool {
        self.last_active_at > now - window
    }
}
