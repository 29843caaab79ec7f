use std::{fmt, sync::Arc};

use serde_json::Value;
use thiserror::Error;

use crate::domain::{engine::EngineId, overrides::OverrideConflict};

type RenderFn = dyn Fn(&Value) -> Result<String, EngineError> + Send + Sync;

/// Render function produced by an engine's compile step.
///
/// Cloning is cheap and clones share the same underlying function, so two
/// handles obtained from the cache for the same key compare equal under
/// [`CompiledTemplate::ptr_eq`].
#[derive(Clone)]
pub struct CompiledTemplate {
    render: Arc<RenderFn>,
}

impl CompiledTemplate {
    pub fn new<F>(render: F) -> Self
    where
        F: Fn(&Value) -> Result<String, EngineError> + Send + Sync + 'static,
    {
        Self {
            render: Arc::new(render),
        }
    }

    /// A template whose output does not depend on the data it is given.
    pub fn from_output(output: impl Into<String>) -> Self {
        let output = output.into();
        Self::new(move |_data| Ok(output.clone()))
    }

    pub fn render(&self, data: &Value) -> Result<String, EngineError> {
        (self.render)(data)
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.render, &other.render)
    }
}

impl fmt::Debug for CompiledTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledTemplate")
            .field("render", &Arc::as_ptr(&self.render).cast::<()>())
            .finish()
    }
}

/// Chaining arguments handed to an engine's compile step.
///
/// Each variant carries only what its engine family needs, and owns the part
/// of the cache key that depends on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EngineChain {
    /// Markdown, optionally run through `preprocessor` first. With
    /// `use_markdown` off only the preprocessor output (or the raw body) is
    /// emitted.
    Markdown {
        preprocessor: Option<EngineId>,
        use_markdown: bool,
    },
    /// Plain markup, optionally run through `preprocessor`.
    Html { preprocessor: Option<EngineId> },
    /// Engine compiles the body directly.
    Generic,
}

impl EngineChain {
    /// Chain state that distinguishes compiled output for the same body.
    ///
    /// Flags irrelevant to a family never reach its fragment, so an HTML
    /// template keys identically whatever the markdown settings are.
    pub fn key_fragment(&self) -> String {
        match self {
            Self::Markdown {
                preprocessor,
                use_markdown,
            } => format!("{}|{use_markdown}", preprocessor_label(preprocessor)),
            Self::Html { preprocessor } => preprocessor_label(preprocessor).to_string(),
            Self::Generic => String::new(),
        }
    }
}

fn preprocessor_label(preprocessor: &Option<EngineId>) -> &str {
    preprocessor.as_ref().map_or("false", EngineId::as_str)
}

/// Failures raised by engines while compiling or rendering.
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    #[error("{engine} failed to compile {identifier}: {message}")]
    Compile {
        engine: EngineId,
        identifier: String,
        message: String,
    },
    #[error("{engine} failed to render: {message}")]
    Render { engine: EngineId, message: String },
    #[error("no engine registered for `{engine}`")]
    Unregistered { engine: EngineId },
}

impl EngineError {
    pub fn compile(
        engine: &EngineId,
        identifier: impl Into<String>,
        message: impl fmt::Display,
    ) -> Self {
        Self::Compile {
            engine: engine.clone(),
            identifier: identifier.into(),
            message: message.to_string(),
        }
    }

    pub fn render(engine: &EngineId, message: impl fmt::Display) -> Self {
        Self::Render {
            engine: engine.clone(),
            message: message.to_string(),
        }
    }
}

/// Errors surfaced by template dispatch.
#[derive(Debug, Clone, Error)]
pub enum RenderError {
    #[error("template render requires a template identifier, got {identifier:?}")]
    MissingIdentifier { identifier: String },
    #[error("Unknown engine for {identifier}")]
    UnknownEngine { identifier: String },
    #[error(transparent)]
    OverrideConflict(#[from] OverrideConflict),
    #[error(transparent)]
    Engine(#[from] EngineError),
}
