//! Domain layer types and invariants.

pub mod engine;
pub mod overrides;
