//! Organization unit entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A node in the organization tree: region → district → school.
///
/// The tree is self-referential through `parent_id`; a node with no parent
/// is a top-level geography (region or province-level district). The short
/// `code` is what the static province→districts table resolves against.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct School {
    /// Unique unit identifier.
    pub id: Uuid,
    /// Parent unit, `None` for top-level geographies.
    pub parent_id: Option<Uuid>,
    /// Short geographic/administrative code (e.g. `"ag"`, `"brk"`).
    pub code: String,
    /// Display name.
    pub name: String,
    /// When the unit was created.
    pub created_at: DateTime<Utc>,
    /// When the unit was last updated.
    pub updated_at: DateTime<Utc>,
}

impl School {
    /// Whether this unit is a top-level geography (no parent).
    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }
}
