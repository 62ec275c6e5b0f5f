//! School / organization unit entities.

pub mod model;

pub use model::School;
