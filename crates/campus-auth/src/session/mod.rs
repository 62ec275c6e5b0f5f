//! Login, role-switch, logout, and eviction flows.

mod manager;

pub use manager::{LoginOutcome, SessionManager};
