use std::path::Path;

use async_trait::async_trait;

use crate::application::render::{
    CompileRequest, CompiledTemplate, EngineChain, EngineError, TemplateEngine,
};
use crate::domain::engine::EngineId;

/// Plain markup. Emits the body as-is unless a preprocessor engine is chained.
pub struct HtmlEngine {
    name: EngineId,
}

impl HtmlEngine {
    pub fn new(_includes_dir: &Path) -> Self {
        Self {
            name: EngineId::html(),
        }
    }
}

#[async_trait]
impl TemplateEngine for HtmlEngine {
    fn name(&self) -> &EngineId {
        &self.name
    }

    async fn compile(&self, request: CompileRequest<'_>) -> Result<CompiledTemplate, EngineError> {
        match request.chain {
            EngineChain::Html {
                preprocessor: Some(preprocessor),
            } => {
                let engine = request.engines.get_engine(preprocessor)?;
                engine.compile(request.unchained()).await
            }
            _ => Ok(CompiledTemplate::from_output(request.source)),
        }
    }
}
