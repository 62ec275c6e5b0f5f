//! # campus-auth
//!
//! Session and authorization resolution for the Campus platform: the
//! component that turns a bearer token into a hierarchically-scoped
//! authorization context and keeps the live session registry consistent
//! with the persistent store.
//!
//! ## Modules
//!
//! - `token` — signed claim set encoding and verification
//! - `registry` — in-memory session registry mirroring the session table
//! - `scope` — role/school scope resolution over the organization tree
//! - `context` — the immutable per-request authorization context
//! - `session` — login, role-switch, logout, and eviction flows
//! - `password` — Argon2id password hashing
//! - `directory` — read-side lookup traits over the persistence layer

pub mod context;
pub mod directory;
pub mod password;
pub mod registry;
pub mod scope;
pub mod session;
pub mod token;

#[cfg(test)]
pub(crate) mod testing;

pub use context::AuthorizationContext;
pub use directory::{PeriodDirectory, SchoolDirectory, UserDirectory};
pub use password::PasswordHasher;
pub use registry::{SessionRegistry, SessionStoreBackend};
pub use scope::{ResolvedScope, RoleScopeResolver, ScopePair};
pub use session::SessionManager;
pub use token::{TokenClaims, TokenCodec};
