//! Compiled-template cache.
//!
//! Maps a [`CacheKey`] (document identifier, engine chain state, body digest)
//! to the [`CompiledTemplate`] an engine produced for it, so re-rendering the
//! same body with the same engine configuration skips compilation. One cache
//! is owned by a [`RenderContext`] and shared by every dispatcher built from
//! it; tests build their own.
//!
//! [`CompiledTemplate`]: crate::application::render::CompiledTemplate
//! [`RenderContext`]: crate::application::render::RenderContext

mod keys;
mod store;

pub use keys::{CacheKey, hash_body};
pub use store::TemplateCache;
