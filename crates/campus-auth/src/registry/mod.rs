//! In-memory session registry mirroring the persistent session store.

pub mod store;

mod live;

pub use live::{ActiveSession, SessionRegistry};
pub use store::SessionStoreBackend;
