//! Role and school scope resolution over the organization tree.

pub mod geo;

mod resolver;

pub use resolver::{ResolvedScope, RoleScopeResolver, ScopePair};
