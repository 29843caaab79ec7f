//! Per-document template engine resolution with front matter engine overrides
//! and a shared compiled-template cache.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
mod util;
