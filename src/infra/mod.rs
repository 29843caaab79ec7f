//! Infrastructure adapters: built-in engines, extension lookup and telemetry.

pub mod engines;
pub mod error;
pub mod extensions;
pub mod telemetry;
