//! Template engine dispatch.
//!
//! A [`TemplateRender`] decides which engine renders a document, applies front
//! matter overrides that chain markdown with another engine, and hands out
//! compiled templates through the shared [`TemplateCache`]. Engines themselves
//! live behind the [`TemplateEngine`] trait; the defaults are registered by
//! [`EngineRegistry::with_builtin_engines`].
//!
//! [`TemplateCache`]: crate::cache::TemplateCache

mod context;
mod dispatcher;
mod engine;
mod manager;
mod resolver;
mod types;

pub use context::{RenderConfig, RenderContext};
pub(crate) use context::{
    DEFAULT_HTML_TEMPLATE_ENGINE, DEFAULT_INCLUDES_DIR, DEFAULT_INPUT_DIR,
    DEFAULT_MARKDOWN_TEMPLATE_ENGINE,
};
pub use dispatcher::TemplateRender;
pub use engine::{CompileRequest, EngineLookup, TemplateEngine};
pub use manager::{EngineFactory, EngineManager, EngineRegistry};
pub use resolver::{BoundEngine, EngineResolver};
pub use types::{CompiledTemplate, EngineChain, EngineError, RenderError};
