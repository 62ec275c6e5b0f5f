//! User entities: account, role assignments, and the role enumeration.

pub mod assignment;
pub mod model;
pub mod role;

pub use assignment::RoleAssignment;
pub use model::{User, UserAccount, UserLink};
pub use role::RoleCode;
