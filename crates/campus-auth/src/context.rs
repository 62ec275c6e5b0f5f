//! The per-request authorization context.

use std::collections::HashSet;
use std::sync::Arc;

use uuid::Uuid;

use campus_entity::period::AcademicPeriod;
use campus_entity::school::School;
use campus_entity::session::SessionRecord;
use campus_entity::user::{User, UserAccount};

use crate::scope::ResolvedScope;

/// Read-only authorization state attached to an authenticated request.
///
/// Built once per request from the parsed claims, the registry entry, and
/// the resolved scope; never shared across requests.
#[derive(Debug, Clone)]
pub struct AuthorizationContext {
    account: Arc<UserAccount>,
    session: SessionRecord,
    scope: ResolvedScope,
}

impl AuthorizationContext {
    /// Assembles a context. The scope must already have been validated
    /// against the account's entitlements.
    pub fn new(account: Arc<UserAccount>, session: SessionRecord, scope: ResolvedScope) -> Self {
        Self {
            account,
            session,
            scope,
        }
    }

    /// The authenticated user.
    pub fn user(&self) -> &User {
        &self.account.user
    }

    /// The authenticated user's id.
    pub fn user_id(&self) -> Uuid {
        self.account.id()
    }

    /// The full account, assignments and guardian links included.
    pub fn account(&self) -> &UserAccount {
        &self.account
    }

    /// The active role.
    pub fn role(&self) -> campus_entity::user::RoleCode {
        self.scope.role
    }

    /// The active school or organization unit.
    pub fn school(&self) -> &School {
        &self.scope.school
    }

    /// The active school id.
    pub fn school_id(&self) -> Uuid {
        self.scope.school.id
    }

    /// The academic period attached to the session, if any.
    pub fn period(&self) -> Option<&AcademicPeriod> {
        self.scope.period.as_ref()
    }

    /// Whether the active unit is a top-level geography (region view).
    pub fn region_view(&self) -> bool {
        self.scope.region_view
    }

    /// The live session behind this request.
    pub fn session(&self) -> &SessionRecord {
        &self.session
    }

    /// The resolved scope, including every available (role, school) pair.
    pub fn scope(&self) -> &ResolvedScope {
        &self.scope
    }

    /// Every school id the active scope may read or write: a single id
    /// for scoped roles, the full expanded set for elevated ones.
    pub fn school_ids(&self) -> Vec<Uuid> {
        if self.scope.role.is_elevated() {
            self.scope.school_ids_for_active_role()
        } else {
            vec![self.scope.school.id]
        }
    }

    /// The subset of [`school_ids`](Self::school_ids) where the user
    /// holds an administrative-class role; reporting aggregates are
    /// bounded by this set.
    pub fn admin_school_ids(&self) -> Vec<Uuid> {
        let reachable: HashSet<Uuid> = self.school_ids().into_iter().collect();
        let mut ids: Vec<Uuid> = self
            .scope
            .available
            .iter()
            .filter(|p| p.role.is_administrative() && reachable.contains(&p.school_id))
            .map(|p| p.school_id)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}
