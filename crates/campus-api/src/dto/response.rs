//! Response DTOs.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use campus_auth::AuthorizationContext;
use campus_entity::session::{DeviceMeta, SessionRecord};
use campus_entity::user::User;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Plain message response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Human-readable message.
    pub message: String,
}

/// User summary for responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    /// User ID.
    pub id: Uuid,
    /// Username.
    pub username: String,
    /// Display name.
    pub display_name: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
    /// Last successful login.
    pub last_login_at: Option<DateTime<Utc>>,
}

impl UserResponse {
    /// Builds a summary from the user row.
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            display_name: user.display_name.clone(),
            phone: user.phone.clone(),
            last_login_at: user.last_login_at,
        }
    }
}

/// Academic period summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodResponse {
    /// Period ID.
    pub id: Uuid,
    /// Display name, e.g. "2025-2026".
    pub name: String,
    /// First day of the period.
    pub starts_on: NaiveDate,
    /// Last day of the period.
    pub ends_on: NaiveDate,
}

/// The resolved scope of a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopeResponse {
    /// Active role code.
    pub role: String,
    /// Active school or organization unit.
    pub school_id: Uuid,
    /// Active unit's display name.
    pub school_name: String,
    /// Whether the active unit is a top-level geography.
    pub region_view: bool,
    /// Attached academic period, if any.
    pub period: Option<PeriodResponse>,
    /// Every school id the scope may read or write.
    pub school_ids: Vec<Uuid>,
    /// School ids where the user holds an administrative-class role.
    pub admin_school_ids: Vec<Uuid>,
}

impl ScopeResponse {
    /// Builds the scope view of an authorization context.
    pub fn from_context(ctx: &AuthorizationContext) -> Self {
        Self {
            role: ctx.role().to_string(),
            school_id: ctx.school_id(),
            school_name: ctx.school().name.clone(),
            region_view: ctx.region_view(),
            period: ctx.period().map(|p| PeriodResponse {
                id: p.id,
                name: p.name.clone(),
                starts_on: p.starts_on,
                ends_on: p.ends_on,
            }),
            school_ids: ctx.school_ids(),
            admin_school_ids: ctx.admin_school_ids(),
        }
    }
}

/// A session displaced by single-device enforcement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvictedSessionResponse {
    /// The displaced session's ID.
    pub id: Uuid,
    /// When the displaced session was created.
    pub created_at: DateTime<Utc>,
    /// Platform family of the displaced device.
    pub platform: String,
    /// Client family of the displaced device.
    pub client: String,
}

impl EvictedSessionResponse {
    /// Builds the notification view of an evicted session.
    pub fn from_record(record: &SessionRecord) -> Self {
        let meta = DeviceMeta::from_user_agent(record.user_agent.as_deref());
        Self {
            id: record.id,
            created_at: record.created_at,
            platform: meta.platform,
            client: meta.client,
        }
    }
}

/// Login and role-switch response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Bearer token for subsequent requests.
    pub token: String,
    /// Token expiry.
    pub expires_at: DateTime<Utc>,
    /// The authenticated user.
    pub user: UserResponse,
    /// The resolved scope.
    pub scope: ScopeResponse,
    /// The session displaced by single-device enforcement, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evicted_session: Option<EvictedSessionResponse>,
}

/// One entry in the session listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    /// Session ID.
    pub id: Uuid,
    /// IP address the session was created from.
    pub ip_address: String,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// Last activity.
    pub last_active_at: DateTime<Utc>,
    /// Whether this is the session behind the current request.
    pub current: bool,
    /// Platform family.
    pub platform: String,
    /// Client family.
    pub client: String,
}

impl SessionResponse {
    /// Builds a listing entry; `current_id` marks the caller's session.
    pub fn from_record(record: &SessionRecord, current_id: Uuid) -> Self {
        let meta = DeviceMeta::from_user_agent(record.user_agent.as_deref());
        Self {
            id: record.id,
            ip_address: record.ip_address.clone(),
            created_at: record.created_at,
            last_active_at: record.last_active_at,
            current: record.id == current_id,
            platform: meta.platform,
            client: meta.client,
        }
    }
}

/// Online presence counter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnlineCountResponse {
    /// Sessions active within the online window.
    pub online: usize,
}

/// Health probe response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status: "ok" or "degraded".
    pub status: String,
    /// Whether the database answered the probe.
    pub database: bool,
    /// Crate version.
    pub version: String,
}
