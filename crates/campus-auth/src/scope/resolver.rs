//! Computation of the available (role, school) set and active selection.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use moka::future::Cache;
use tracing::warn;
use uuid::Uuid;

use campus_core::config::session::SessionConfig;
use campus_core::error::AppError;
use campus_core::result::AppResult;
use campus_entity::period::AcademicPeriod;
use campus_entity::school::School;
use campus_entity::user::{RoleCode, UserAccount};

use crate::directory::{PeriodDirectory, SchoolDirectory};

use super::geo;

/// One (role, school) combination a user may activate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopePair {
    /// The role held at the school.
    pub role: RoleCode,
    /// The school (or organization unit) the role applies to.
    pub school_id: Uuid,
}

/// The outcome of scope resolution for one request.
#[derive(Debug, Clone)]
pub struct ResolvedScope {
    /// The active role.
    pub role: RoleCode,
    /// The active school or organization unit.
    pub school: School,
    /// The academic period attached to the session, if one was claimed.
    pub period: Option<AcademicPeriod>,
    /// Every (role, school) combination the user may activate, the active
    /// pair included.
    pub available: Vec<ScopePair>,
    /// Whether the active unit is a top-level geography (region view)
    /// rather than an ordinary school (school view).
    pub region_view: bool,
}

impl ResolvedScope {
    /// All school ids carrying the active role.
    pub fn school_ids_for_active_role(&self) -> Vec<Uuid> {
        let mut ids: Vec<Uuid> = self
            .available
            .iter()
            .filter(|p| p.role == self.role)
            .map(|p| p.school_id)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

/// Resolves a claimed (role, school) pair against a user's entitlements.
///
/// Static roles come straight from stored assignments. Elevated roles
/// (organization, admin, operator) are expanded over the organization
/// tree at resolution time; the schools-by-parent reads behind that
/// expansion sit on the request path, so they go through a bounded
/// time-bounded cache keyed by unit id.
pub struct RoleScopeResolver {
    schools: Arc<dyn SchoolDirectory>,
    periods: Arc<dyn PeriodDirectory>,
    children: Cache<Uuid, Arc<Vec<School>>>,
    page_size: i64,
}

impl RoleScopeResolver {
    /// Creates a resolver over the given directories.
    pub fn new(
        schools: Arc<dyn SchoolDirectory>,
        periods: Arc<dyn PeriodDirectory>,
        config: &SessionConfig,
    ) -> Self {
        let children = Cache::builder()
            .max_capacity(config.scope_cache.capacity)
            .time_to_live(StdDuration::from_secs(config.scope_cache.ttl_seconds))
            .build();
        Self {
            schools,
            periods,
            children,
            page_size: config.expansion_page_size as i64,
        }
    }

    /// Computes the available pair set for `account`, validates the
    /// claimed (role, school) against it, and selects the active pair.
    ///
    /// A claimed school id demands an exact match; an unset school id
    /// selects the first pair holding the claimed role. A claimed period
    /// is attached to the result but never affects matching.
    pub async fn resolve(
        &self,
        account: &UserAccount,
        claimed_role: RoleCode,
        claimed_school: Option<Uuid>,
        claimed_period: Option<Uuid>,
    ) -> AppResult<ResolvedScope> {
        if !account.has_roles() {
            return Err(AppError::user_has_no_role(format!(
                "User {} has no role assignments",
                account.id()
            )));
        }

        let mut candidates = self.static_pairs(account).await?;

        if claimed_role == RoleCode::Organization {
            candidates.extend(self.organization_pairs(account).await?);
        }

        if matches!(claimed_role, RoleCode::Admin | RoleCode::Operator)
            && account.assignments_for(claimed_role).next().is_some()
        {
            candidates.extend(self.admin_pairs(claimed_role, claimed_school).await?);
        }

        // Dedup while preserving discovery order.
        let mut seen: HashSet<(RoleCode, Uuid)> = HashSet::new();
        candidates.retain(|(role, school)| seen.insert((*role, school.id)));

        let active = match claimed_school {
            Some(id) => candidates
                .iter()
                .find(|(role, school)| *role == claimed_role && school.id == id),
            None => candidates.iter().find(|(role, _)| *role == claimed_role),
        };

        let (role, school) = match active {
            Some((role, school)) => (*role, school.clone()),
            None => {
                warn!(
                    user_id = %account.id(),
                    role = %claimed_role,
                    school_id = ?claimed_school,
                    "Claimed role/school not in available set"
                );
                return Err(AppError::no_available_role(format!(
                    "Role {claimed_role} is not available{}",
                    match claimed_school {
                        Some(id) => format!(" at school {id}"),
                        None => String::new(),
                    }
                )));
            }
        };

        let period = match claimed_period {
            Some(id) => Some(
                self.periods
                    .find_by_id(id)
                    .await?
                    .ok_or_else(|| AppError::not_found(format!("Academic period {id} not found")))?,
            ),
            None => None,
        };

        let region_view = school.parent_id.is_none();
        let available = candidates
            .iter()
            .map(|(role, school)| ScopePair {
                role: *role,
                school_id: school.id,
            })
            .collect();

        Ok(ResolvedScope {
            role,
            school,
            period,
            available,
            region_view,
        })
    }

    /// Drops the cached child set of one organization unit. Call after
    /// any edit to the organization tree under that unit.
    pub async fn invalidate_unit(&self, unit_id: Uuid) {
        self.children.invalidate(&unit_id).await;
    }

    /// Pairs from stored assignments with non-elevated roles.
    async fn static_pairs(&self, account: &UserAccount) -> AppResult<Vec<(RoleCode, School)>> {
        let statics: Vec<_> = account
            .assignments
            .iter()
            .filter(|a| !a.role.is_elevated())
            .collect();
        if statics.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = statics.iter().map(|a| a.school_id).collect();
        let schools = self.schools.find_by_ids(&ids).await?;
        let by_id: std::collections::HashMap<Uuid, School> =
            schools.into_iter().map(|s| (s.id, s)).collect();

        Ok(statics
            .iter()
            .filter_map(|a| by_id.get(&a.school_id).map(|s| (a.role, s.clone())))
            .collect())
    }

    /// Pairs granted through organization-role assignments: every unit
    /// code is expanded geographically, then the covered units themselves
    /// and all schools under them become organization pairs. The granted
    /// unit is always in the set, so a stored (organization, unit) row
    /// can be claimed back verbatim.
    async fn organization_pairs(
        &self,
        account: &UserAccount,
    ) -> AppResult<Vec<(RoleCode, School)>> {
        let unit_ids: Vec<Uuid> = account
            .assignments_for(RoleCode::Organization)
            .map(|a| a.school_id)
            .collect();
        if unit_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut covered = self.schools.find_by_ids(&unit_ids).await?;

        let mut codes: Vec<String> = covered
            .iter()
            .flat_map(|u| geo::expand_unit_code(&u.code))
            .collect();
        codes.sort();
        codes.dedup();

        let mut seen: HashSet<Uuid> = covered.iter().map(|u| u.id).collect();
        for unit in self.schools.find_by_codes(&codes).await? {
            if seen.insert(unit.id) {
                covered.push(unit);
            }
        }

        // Granted units first, so an unset claimed school defaults to the
        // unit the grant was issued against.
        let mut pairs: Vec<(RoleCode, School)> = covered
            .iter()
            .map(|u| (RoleCode::Organization, u.clone()))
            .collect();
        for unit in &covered {
            for school in self.children_of(unit.id).await?.iter() {
                pairs.push((RoleCode::Organization, school.clone()));
            }
        }
        Ok(pairs)
    }

    /// Pairs for admin/operator claims, narrowed by the claimed unit:
    /// claiming a top-level unit (a district) limits visibility to that
    /// unit and its direct child schools, anything else sees the full
    /// tree.
    async fn admin_pairs(
        &self,
        role: RoleCode,
        claimed_school: Option<Uuid>,
    ) -> AppResult<Vec<(RoleCode, School)>> {
        let claimed = match claimed_school {
            Some(id) => self.schools.find_by_id(id).await?,
            None => None,
        };

        let mut pairs = Vec::new();
        match claimed {
            Some(unit) if unit.parent_id.is_none() => {
                for school in self.children_of(unit.id).await?.iter() {
                    pairs.push((role, school.clone()));
                }
                pairs.push((role, unit));
            }
            _ => {
                for school in self.schools.find_all(self.page_size).await? {
                    pairs.push((role, school));
                }
            }
        }
        Ok(pairs)
    }

    /// Child schools of one unit, via the bounded cache.
    async fn children_of(&self, unit_id: Uuid) -> AppResult<Arc<Vec<School>>> {
        let schools = Arc::clone(&self.schools);
        let page_size = self.page_size;
        self.children
            .try_get_with(unit_id, async move {
                schools
                    .find_by_parents(&[unit_id], page_size)
                    .await
                    .map(Arc::new)
            })
            .await
            .map_err(|e: Arc<AppError>| (*e).clone())
    }
}

impl std::fmt::Debug for RoleScopeResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoleScopeResolver")
            .field("page_size", &self.page_size)
            .finish()
    }
}
