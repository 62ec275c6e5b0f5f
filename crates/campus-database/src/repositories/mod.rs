//! Concrete repository implementations backed by PostgreSQL.

pub mod period;
pub mod school;
pub mod session;
pub mod user;

pub use period::PeriodRepository;
pub use school::SchoolRepository;
pub use session::SessionRepository;
pub use user::UserRepository;
