use std::{path::Path, sync::Arc};

use async_trait::async_trait;
use handlebars::Handlebars;

use crate::application::render::{
    CompileRequest, CompiledTemplate, EngineError, RenderConfig, TemplateEngine,
};
use crate::domain::engine::EngineId;

/// Handlebars engine. HTML escaping is disabled so output composes with the
/// markdown and html engines.
pub struct HandlebarsEngine {
    name: EngineId,
    base: Handlebars<'static>,
}

impl HandlebarsEngine {
    pub fn new(_includes_dir: &Path) -> Self {
        let mut base = Handlebars::new();
        base.register_escape_fn(handlebars::no_escape);
        Self {
            name: EngineId::new("hbs"),
            base,
        }
    }
}

#[async_trait]
impl TemplateEngine for HandlebarsEngine {
    fn name(&self) -> &EngineId {
        &self.name
    }

    fn set_config(&mut self, config: Arc<RenderConfig>) {
        self.base.set_strict_mode(config.strict_variables);
    }

    async fn compile(&self, request: CompileRequest<'_>) -> Result<CompiledTemplate, EngineError> {
        let mut registry = self.base.clone();
        registry
            .register_template_string(request.identifier, request.source)
            .map_err(|err| EngineError::compile(&self.name, request.identifier, err))?;

        let template_name = request.identifier.to_string();
        let engine = self.name.clone();
        Ok(CompiledTemplate::new(move |data| {
            registry
                .render(&template_name, data)
                .map_err(|err| EngineError::render(&engine, err))
        }))
    }
}
