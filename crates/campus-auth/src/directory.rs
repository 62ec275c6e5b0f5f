//! Read-side lookup traits over the persistence layer.
//!
//! The registry, resolver, and session manager depend on these traits
//! rather than on concrete repositories, so tests can substitute
//! in-memory fixtures without a database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use campus_core::result::AppResult;
use campus_database::repositories::{PeriodRepository, SchoolRepository, UserRepository};
use campus_entity::period::AcademicPeriod;
use campus_entity::school::School;
use campus_entity::user::UserAccount;

/// User account lookups.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Load a full account (user row, assignments, child links) by login name.
    async fn find_account_by_username(&self, username: &str) -> AppResult<Option<UserAccount>>;

    /// Load a full account by user id.
    async fn find_account(&self, id: Uuid) -> AppResult<Option<UserAccount>>;

    /// Batch-load accounts for a set of user ids.
    async fn find_accounts(&self, ids: &[Uuid]) -> AppResult<Vec<UserAccount>>;

    /// Record a successful login.
    async fn update_last_login(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<()>;
}

/// Organization tree lookups.
#[async_trait]
pub trait SchoolDirectory: Send + Sync {
    /// Find a unit by id.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<School>>;

    /// Batch-find units by id.
    async fn find_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<School>>;

    /// Find units by short code.
    async fn find_by_codes(&self, codes: &[String]) -> AppResult<Vec<School>>;

    /// Find child units of the given parents, bounded by `limit`.
    async fn find_by_parents(&self, parent_ids: &[Uuid], limit: i64) -> AppResult<Vec<School>>;

    /// Every unit in the tree, bounded by `limit`.
    async fn find_all(&self, limit: i64) -> AppResult<Vec<School>>;
}

/// Academic period lookups.
#[async_trait]
pub trait PeriodDirectory: Send + Sync {
    /// Find a period by id.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<AcademicPeriod>>;
}

#[async_trait]
impl UserDirectory for UserRepository {
    async fn find_account_by_username(&self, username: &str) -> AppResult<Option<UserAccount>> {
        UserRepository::find_account_by_username(self, username).await
    }

    async fn find_account(&self, id: Uuid) -> AppResult<Option<UserAccount>> {
        UserRepository::find_account(self, id).await
    }

    async fn find_accounts(&self, ids: &[Uuid]) -> AppResult<Vec<UserAccount>> {
        UserRepository::find_accounts(self, ids).await
    }

    async fn update_last_login(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
        UserRepository::update_last_login(self, id, at).await
    }
}

#[async_trait]
impl SchoolDirectory for SchoolRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<School>> {
        SchoolRepository::find_by_id(self, id).await
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<School>> {
        SchoolRepository::find_by_ids(self, ids).await
    }

    async fn find_by_codes(&self, codes: &[String]) -> AppResult<Vec<School>> {
        SchoolRepository::find_by_codes(self, codes).await
    }

    async fn find_by_parents(&self, parent_ids: &[Uuid], limit: i64) -> AppResult<Vec<School>> {
        SchoolRepository::find_by_parents(self, parent_ids, limit).await
    }

    async fn find_all(&self, limit: i64) -> AppResult<Vec<School>> {
        SchoolRepository::find_all(self, limit).await
    }
}

#[async_trait]
impl PeriodDirectory for PeriodRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<AcademicPeriod>> {
        PeriodRepository::find_by_id(self, id).await
    }
}
