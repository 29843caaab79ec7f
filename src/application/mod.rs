//! Application services layer.

pub mod document;
pub mod error;
pub mod front_matter;
pub mod render;
