use std::{path::Path, sync::Arc};

use async_trait::async_trait;
use comrak::{markdown_to_html, options::Options};
use once_cell::sync::Lazy;

use crate::application::render::{
    CompileRequest, CompiledTemplate, EngineChain, EngineError, TemplateEngine,
};
use crate::domain::engine::EngineId;

static DEFAULT_OPTIONS: Lazy<Options<'static>> = Lazy::new(default_options);

fn default_options() -> Options<'static> {
    let mut options = Options::default();

    let ext = &mut options.extension;
    ext.strikethrough = true;
    ext.table = true;
    ext.autolink = true;
    ext.tasklist = true;
    ext.footnotes = true;
    ext.description_lists = true;

    // Preprocessed markdown routinely carries raw HTML from includes.
    options.render.r#unsafe = true;

    options
}

/// Markdown engine backed by comrak.
pub struct MarkdownEngine {
    name: EngineId,
    options: Arc<Options<'static>>,
}

impl MarkdownEngine {
    pub fn new(_includes_dir: &Path) -> Self {
        Self {
            name: EngineId::markdown(),
            options: Arc::new(DEFAULT_OPTIONS.clone()),
        }
    }

    pub fn render_markdown(&self, source: &str) -> String {
        markdown_to_html(source, &self.options)
    }
}

#[async_trait]
impl TemplateEngine for MarkdownEngine {
    fn name(&self) -> &EngineId {
        &self.name
    }

    async fn compile(&self, request: CompileRequest<'_>) -> Result<CompiledTemplate, EngineError> {
        let (preprocessor, use_markdown) = match request.chain {
            EngineChain::Markdown {
                preprocessor,
                use_markdown,
            } => (preprocessor.as_ref(), *use_markdown),
            EngineChain::Html { .. } | EngineChain::Generic => (None, true),
        };

        let Some(preprocessor) = preprocessor else {
            if !use_markdown {
                return Ok(CompiledTemplate::from_output(request.source));
            }
            return Ok(CompiledTemplate::from_output(
                self.render_markdown(request.source),
            ));
        };

        let engine = request.engines.get_engine(preprocessor)?;
        let preprocessed = engine.compile(request.unchained()).await?;
        if !use_markdown {
            return Ok(preprocessed);
        }

        let options = Arc::clone(&self.options);
        Ok(CompiledTemplate::new(move |data| {
            let intermediate = preprocessed.render(data)?;
            Ok(markdown_to_html(&intermediate, &options))
        }))
    }
}
