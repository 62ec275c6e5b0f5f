//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::assignment::RoleAssignment;

/// A registered user in the Campus system.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Unique login name.
    pub username: String,
    /// Argon2 password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Human-readable display name.
    pub display_name: Option<String>,
    /// Contact phone number.
    pub phone: Option<String>,
    /// Home classroom for teachers (if assigned).
    pub home_classroom_id: Option<Uuid>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
    /// Last successful login time.
    pub last_login_at: Option<DateTime<Utc>>,
}

/// A guardian link between two user accounts.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserLink {
    /// The guardian (parent) user.
    pub parent_id: Uuid,
    /// The dependent (student) user.
    pub child_id: Uuid,
}

/// A user together with their stored role assignments and guardian links.
///
/// This is the shape the session registry and the scope resolver operate
/// on; assignments and links are loaded in a batch alongside the base row,
/// never lazily per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    /// The base user row.
    pub user: User,
    /// All stored (role, school) grants.
    pub assignments: Vec<RoleAssignment>,
    /// Ids of linked child accounts (for parents).
    pub child_ids: Vec<Uuid>,
}

impl UserAccount {
    /// Returns the user id.
    pub fn id(&self) -> Uuid {
        self.user.id
    }

    /// Whether the user has any stored role assignment at all.
    pub fn has_roles(&self) -> bool {
        !self.assignments.is_empty()
    }

    /// Assignments matching the given role code.
    pub fn assignments_for(
        &self,
        role: super::role::RoleCode,
    ) -> impl Iterator<Item = &RoleAssignment> {
        self.assignments.iter().filter(move |a| a.role == role)
    }
}
