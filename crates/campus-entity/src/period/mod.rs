//! Academic period entities.

pub mod model;

pub use model::AcademicPeriod;
