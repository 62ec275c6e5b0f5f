//! User repository implementation.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use campus_core::error::{AppError, ErrorKind};
use campus_core::result::AppResult;
use campus_entity::user::{RoleAssignment, User, UserAccount, UserLink};

/// Repository for user rows, role assignments, and guardian links.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user", e))
    }

    /// Find a user by login name.
    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find user by username", e)
            })
    }

    /// Load one user account (base row + assignments + child links).
    pub async fn find_account(&self, id: Uuid) -> AppResult<Option<UserAccount>> {
        let user = match self.find_by_id(id).await? {
            Some(u) => u,
            None => return Ok(None),
        };
        let mut accounts = self.assemble_accounts(vec![user]).await?;
        Ok(accounts.pop())
    }

    /// Load one user account by login name.
    pub async fn find_account_by_username(&self, username: &str) -> AppResult<Option<UserAccount>> {
        let user = match self.find_by_username(username).await? {
            Some(u) => u,
            None => return Ok(None),
        };
        let mut accounts = self.assemble_accounts(vec![user]).await?;
        Ok(accounts.pop())
    }

    /// Batch-load user accounts for a set of ids.
    ///
    /// Three queries total regardless of how many ids are requested; this
    /// is the bulk path the session registry uses at startup.
    pub async fn find_accounts(&self, ids: &[Uuid]) -> AppResult<Vec<UserAccount>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let users = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to batch-load users", e)
            })?;

        self.assemble_accounts(users).await
    }

    /// Update the last successful login timestamp.
    pub async fn update_last_login(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
        sqlx::query("UPDATE users SET last_login_at = $2 WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to update last login", e)
            })?;
        Ok(())
    }

    /// Attach assignments and child links to a set of base rows.
    async fn assemble_accounts(&self, users: Vec<User>) -> AppResult<Vec<UserAccount>> {
        let ids: Vec<Uuid> = users.iter().map(|u| u.id).collect();

        let assignments = sqlx::query_as::<_, RoleAssignment>(
            "SELECT * FROM role_assignments WHERE user_id = ANY($1) ORDER BY created_at",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to load role assignments", e)
        })?;

        let links = sqlx::query_as::<_, UserLink>(
            "SELECT parent_id, child_id FROM user_links WHERE parent_id = ANY($1)",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load user links", e))?;

        let mut by_user: HashMap<Uuid, Vec<RoleAssignment>> = HashMap::new();
        for a in assignments {
            by_user.entry(a.user_id).or_default().push(a);
        }

        let mut children: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for l in links {
            children.entry(l.parent_id).or_default().push(l.child_id);
        }

        Ok(users
            .into_iter()
            .map(|user| {
                let assignments = by_user.remove(&user.id).unwrap_or_default();
                let child_ids = children.remove(&user.id).unwrap_or_default();
                UserAccount {
                    user,
                    assignments,
                    child_ids,
                }
            })
            .collect())
    }
}
