use std::{
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};

use async_trait::async_trait;
use minijinja::{AutoEscape, Environment, UndefinedBehavior, path_loader};
use tracing::debug;

use crate::application::render::{
    CompileRequest, CompiledTemplate, EngineError, RenderConfig, TemplateEngine,
};
use crate::domain::engine::EngineId;
use crate::util::lock::{rw_read, rw_write};

const SOURCE: &str = "infra::engines::jinja";

/// Jinja-family engine backed by minijinja; serves both `njk` and `liquid`.
///
/// `{% include %}` and `{% extends %}` load from the includes directory. Every
/// compile starts from a clone of the base environment, whose templates
/// [`TemplateEngine::reset_module_cache`] drops.
pub struct JinjaEngine {
    name: EngineId,
    includes_dir: PathBuf,
    base: RwLock<Environment<'static>>,
}

impl JinjaEngine {
    pub fn new(name: EngineId, includes_dir: &Path) -> Self {
        Self {
            name,
            includes_dir: includes_dir.to_path_buf(),
            base: RwLock::new(base_environment(includes_dir, false)),
        }
    }
}

fn base_environment(includes_dir: &Path, strict_variables: bool) -> Environment<'static> {
    let mut env = Environment::new();
    env.set_loader(path_loader(includes_dir));
    env.set_auto_escape_callback(|_name| AutoEscape::None);
    env.set_undefined_behavior(if strict_variables {
        UndefinedBehavior::Strict
    } else {
        UndefinedBehavior::Lenient
    });
    env
}

#[async_trait]
impl TemplateEngine for JinjaEngine {
    fn name(&self) -> &EngineId {
        &self.name
    }

    fn set_config(&mut self, config: Arc<RenderConfig>) {
        self.base = RwLock::new(base_environment(&self.includes_dir, config.strict_variables));
    }

    fn reset_module_cache(&self, identifier: &str) {
        rw_write(&self.base, SOURCE, "reset_module_cache").clear_templates();
        debug!(engine = %self.name, identifier, "cleared loaded templates");
    }

    async fn compile(&self, request: CompileRequest<'_>) -> Result<CompiledTemplate, EngineError> {
        let mut env = rw_read(&self.base, SOURCE, "compile").clone();
        env.add_template_owned(request.identifier.to_string(), request.source.to_string())
            .map_err(|err| EngineError::compile(&self.name, request.identifier, err))?;

        let template_name = request.identifier.to_string();
        let engine = self.name.clone();
        Ok(CompiledTemplate::new(move |data| {
            env.get_template(&template_name)
                .and_then(|template| template.render(data))
                .map_err(|err| EngineError::render(&engine, err))
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use serde_json::json;

    use crate::application::render::{EngineChain, EngineManager, EngineRegistry};

    use super::*;

    async fn compile(engine: &JinjaEngine, source: &str) -> Result<CompiledTemplate, EngineError> {
        let manager = EngineManager::new(
            Arc::new(EngineRegistry::new()),
            Arc::new(RenderConfig::default()),
            engine.includes_dir.clone(),
        );
        engine
            .compile(CompileRequest {
                source,
                identifier: "page.njk",
                chain: &EngineChain::Generic,
                engines: &manager,
            })
            .await
    }

    #[tokio::test]
    async fn renders_variables_and_loops() {
        let engine = JinjaEngine::new(EngineId::new("njk"), Path::new("_includes"));
        let template = compile(&engine, "{% for t in tags %}[{{ t }}]{% endfor %} {{ title }}")
            .await
            .expect("compiles");
        let html = template
            .render(&json!({ "tags": ["a", "b"], "title": "<b>x</b>" }))
            .expect("renders");
        assert_eq!(html, "[a][b] <b>x</b>");
    }

    #[tokio::test]
    async fn syntax_errors_fail_compilation() {
        let engine = JinjaEngine::new(EngineId::new("liquid"), Path::new("_includes"));
        let err = compile(&engine, "{% if %}").await.expect_err("invalid syntax");
        assert!(matches!(err, EngineError::Compile { ref engine, .. } if engine == "liquid"));
    }

    #[tokio::test]
    async fn includes_load_from_includes_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("nav.njk"), "<nav>{{ site }}</nav>").expect("write include");

        let engine = JinjaEngine::new(EngineId::new("njk"), dir.path());
        let template = compile(&engine, "{% include \"nav.njk\" %}<main></main>")
            .await
            .expect("compiles");
        let html = template.render(&json!({ "site": "docs" })).expect("renders");
        assert_eq!(html, "<nav>docs</nav><main></main>");
    }

    #[tokio::test]
    async fn strict_variables_reject_undefined_values() {
        let mut engine = JinjaEngine::new(EngineId::new("njk"), Path::new("_includes"));
        engine.set_config(Arc::new(RenderConfig {
            strict_variables: true,
            ..RenderConfig::default()
        }));

        let template = compile(&engine, "{{ missing }}").await.expect("compiles");
        let err = template.render(&json!({})).expect_err("undefined variable");
        assert!(matches!(err, EngineError::Render { .. }));
    }
}
