use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::engine::EngineId;

use super::context::RenderConfig;
use super::manager::EngineManager;
use super::types::{CompiledTemplate, EngineChain, EngineError};

static UNCHAINED: EngineChain = EngineChain::Generic;

/// Everything an engine needs to compile one template body.
#[derive(Clone, Copy)]
pub struct CompileRequest<'a> {
    /// Raw template body.
    pub source: &'a str,
    /// Path or bare engine name the body belongs to.
    pub identifier: &'a str,
    /// Chaining arguments for the engine's family.
    pub chain: &'a EngineChain,
    /// Manager the engine was created by; preprocessor engines come from here.
    pub engines: &'a EngineManager,
}

impl<'a> CompileRequest<'a> {
    /// The same body and identifier, compiled without any chaining.
    pub fn unchained(&self) -> CompileRequest<'a> {
        CompileRequest {
            chain: &UNCHAINED,
            ..*self
        }
    }
}

/// A templating engine able to compile bodies into render functions.
#[async_trait]
pub trait TemplateEngine: Send + Sync {
    fn name(&self) -> &EngineId;

    /// Receive the active configuration before first use.
    fn set_config(&mut self, _config: Arc<RenderConfig>) {}

    /// Drop any engine-internal caches associated with `identifier`.
    fn reset_module_cache(&self, _identifier: &str) {}

    async fn compile(&self, request: CompileRequest<'_>) -> Result<CompiledTemplate, EngineError>;
}

/// Maps a file path or bare engine name to the canonical engine for it.
pub trait EngineLookup: Send + Sync {
    fn engine_key(&self, identifier_or_path: &str) -> Option<EngineId>;
}
