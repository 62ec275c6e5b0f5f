//! In-memory directory and store fixtures shared by unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use uuid::Uuid;

use campus_core::error::AppError;
use campus_core::result::AppResult;
use campus_entity::period::AcademicPeriod;
use campus_entity::school::School;
use campus_entity::session::{DeviceInfo, SessionRecord};
use campus_entity::user::{RoleAssignment, RoleCode, User, UserAccount};

use crate::directory::{PeriodDirectory, SchoolDirectory, UserDirectory};
use crate::registry::SessionStoreBackend;
use crate::token::TokenClaims;

/// Session store over a plain vector, with an optional failure switch.
#[derive(Default)]
pub struct MemorySessionStore {
    rows: Mutex<Vec<SessionRecord>>,
    failing: AtomicBool,
}

impl MemorySessionStore {
    pub fn seed(&self, record: SessionRecord) {
        self.rows.lock().unwrap().push(record);
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn rows(&self) -> Vec<SessionRecord> {
        self.rows.lock().unwrap().clone()
    }

    pub fn row_count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    fn check(&self) -> AppResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(AppError::store_unavailable("Session store is down"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SessionStoreBackend for MemorySessionStore {
    async fn load_active(&self) -> AppResult<Vec<SessionRecord>> {
        self.check()?;
        let mut rows: Vec<SessionRecord> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| !r.is_expired())
            .cloned()
            .collect();
        rows.sort_by_key(|r| r.created_at);
        Ok(rows)
    }

    async fn insert(&self, record: &SessionRecord) -> AppResult<()> {
        self.check()?;
        self.rows.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn delete_by_id(&self, id: Uuid) -> AppResult<bool> {
        self.check()?;
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|r| r.id != id);
        Ok(rows.len() < before)
    }

    async fn delete_by_user(&self, user_id: Uuid) -> AppResult<u64> {
        self.check()?;
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|r| r.user_id != user_id);
        Ok((before - rows.len()) as u64)
    }

    async fn delete_expired(&self) -> AppResult<u64> {
        self.check()?;
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|r| !r.is_expired());
        Ok((before - rows.len()) as u64)
    }
}

/// User directory over a map of pre-built accounts.
#[derive(Default)]
pub struct MemoryUserDirectory {
    accounts: Mutex<HashMap<Uuid, UserAccount>>,
}

impl MemoryUserDirectory {
    pub fn with_accounts(accounts: Vec<UserAccount>) -> Self {
        Self {
            accounts: Mutex::new(accounts.into_iter().map(|a| (a.id(), a)).collect()),
        }
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn find_account_by_username(&self, username: &str) -> AppResult<Option<UserAccount>> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .values()
            .find(|a| a.user.username == username)
            .cloned())
    }

    async fn find_account(&self, id: Uuid) -> AppResult<Option<UserAccount>> {
        Ok(self.accounts.lock().unwrap().get(&id).cloned())
    }

    async fn find_accounts(&self, ids: &[Uuid]) -> AppResult<Vec<UserAccount>> {
        let accounts = self.accounts.lock().unwrap();
        Ok(ids.iter().filter_map(|id| accounts.get(id).cloned()).collect())
    }

    async fn update_last_login(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
        if let Some(a) = self.accounts.lock().unwrap().get_mut(&id) {
            a.user.last_login_at = Some(at);
        }
        Ok(())
    }
}

/// School directory over a fixed organization tree, counting tree queries
/// so tests can assert on cache behavior.
#[derive(Default)]
pub struct MemorySchoolDirectory {
    schools: Vec<School>,
    parent_queries: AtomicUsize,
}

impl MemorySchoolDirectory {
    pub fn with_schools(schools: Vec<School>) -> Self {
        Self {
            schools,
            parent_queries: AtomicUsize::new(0),
        }
    }

    pub fn parent_query_count(&self) -> usize {
        self.parent_queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SchoolDirectory for MemorySchoolDirectory {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<School>> {
        Ok(self.schools.iter().find(|s| s.id == id).cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<School>> {
        Ok(self
            .schools
            .iter()
            .filter(|s| ids.contains(&s.id))
            .cloned()
            .collect())
    }

    async fn find_by_codes(&self, codes: &[String]) -> AppResult<Vec<School>> {
        Ok(self
            .schools
            .iter()
            .filter(|s| codes.contains(&s.code))
            .cloned()
            .collect())
    }

    async fn find_by_parents(&self, parent_ids: &[Uuid], limit: i64) -> AppResult<Vec<School>> {
        self.parent_queries.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .schools
            .iter()
            .filter(|s| s.parent_id.map(|p| parent_ids.contains(&p)).unwrap_or(false))
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn find_all(&self, limit: i64) -> AppResult<Vec<School>> {
        Ok(self.schools.iter().take(limit as usize).cloned().collect())
    }
}

/// Period directory over a fixed map.
#[derive(Default)]
pub struct MemoryPeriodDirectory {
    periods: HashMap<Uuid, AcademicPeriod>,
}

impl MemoryPeriodDirectory {
    pub fn with_periods(periods: Vec<AcademicPeriod>) -> Self {
        Self {
            periods: periods.into_iter().map(|p| (p.id, p)).collect(),
        }
    }
}

#[async_trait]
impl PeriodDirectory for MemoryPeriodDirectory {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<AcademicPeriod>> {
        Ok(self.periods.get(&id).cloned())
    }
}

/// A bare account with no role assignments.
pub fn account(id: Uuid, username: &str) -> UserAccount {
    UserAccount {
        user: User {
            id,
            username: username.to_string(),
            password_hash: "$argon2id$unused".to_string(),
            display_name: Some(username.to_string()),
            phone: None,
            home_classroom_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            last_login_at: None,
        },
        assignments: Vec::new(),
        child_ids: Vec::new(),
    }
}

/// An account holding the given (role, school) grants.
pub fn account_with_roles(id: Uuid, username: &str, grants: &[(RoleCode, Uuid)]) -> UserAccount {
    let mut acct = account(id, username);
    acct.assignments = grants
        .iter()
        .map(|(role, school_id)| RoleAssignment {
            id: Uuid::new_v4(),
            user_id: id,
            role: *role,
            school_id: *school_id,
            created_at: Utc::now(),
        })
        .collect();
    acct
}

/// Claims for an account with no school/period selection, expiring far in
/// the future.
pub fn claims_for(acct: &UserAccount, role: RoleCode) -> TokenClaims {
    TokenClaims {
        user_id: acct.id(),
        role_code: role,
        school_id: None,
        period_id: None,
        exp: (Utc::now() + Duration::days(120)).timestamp(),
    }
}

/// A minimal login device.
pub fn device() -> DeviceInfo {
    DeviceInfo {
        device_token: None,
        ip_address: "127.0.0.1".to_string(),
        user_agent: Some("okhttp/4.12.0 (Linux; Android 14)".to_string()),
    }
}

/// A tree node; `parent` is `None` for top-level units (districts,
/// provinces).
pub fn school(code: &str, name: &str, parent: Option<Uuid>) -> School {
    School {
        id: Uuid::new_v4(),
        parent_id: parent,
        code: code.to_string(),
        name: name.to_string(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// An academic period covering the given calendar year.
pub fn period(name: &str, year: i32) -> AcademicPeriod {
    AcademicPeriod {
        id: Uuid::new_v4(),
        name: name.to_string(),
        starts_on: NaiveDate::from_ymd_opt(year, 9, 1).unwrap(),
        ends_on: NaiveDate::from_ymd_opt(year + 1, 6, 25).unwrap(),
        created_at: Utc::now(),
    }
}
