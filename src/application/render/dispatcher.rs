use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use tracing::debug;

use crate::cache::CacheKey;
use crate::domain::{
    engine::{EngineFamily, EngineId},
    overrides::parse_overrides,
};

use super::context::RenderContext;
use super::engine::CompileRequest;
use super::resolver::BoundEngine;
use super::types::{CompiledTemplate, EngineChain, RenderError};

#[derive(Debug, Clone)]
enum Resolution {
    Unresolved,
    Resolved(BoundEngine),
}

/// Decides how one template is rendered and hands out its compiled form.
///
/// Works with file paths (`posts/hello.md`) and bare engine names (`njk`).
/// The engine is resolved on first use and kept until an override rebinds it.
#[derive(Debug, Clone)]
pub struct TemplateRender {
    identifier: String,
    includes_dir: PathBuf,
    context: RenderContext,
    resolution: Resolution,
    use_markdown: Option<bool>,
    markdown_engine: Option<EngineId>,
    html_engine: Option<EngineId>,
}

impl TemplateRender {
    /// Create a dispatcher for `identifier`.
    ///
    /// `input_dir` anchors the includes directory; when absent the configured
    /// input directory is used.
    pub fn new(
        identifier: impl Into<String>,
        input_dir: Option<&Path>,
        context: &RenderContext,
    ) -> Result<Self, RenderError> {
        let identifier = identifier.into();
        if identifier.trim().is_empty() {
            return Err(RenderError::MissingIdentifier { identifier });
        }

        let config = context.config();
        Ok(Self {
            includes_dir: context.resolver().includes_dir_for(input_dir),
            markdown_engine: config.markdown_template_engine.clone(),
            html_engine: config.html_template_engine.clone(),
            identifier,
            context: context.clone(),
            resolution: Resolution::Unresolved,
            use_markdown: None,
        })
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn includes_dir(&self) -> &Path {
        &self.includes_dir
    }

    /// Canonical engine for this template, resolving it if needed.
    pub fn engine_name(&mut self) -> Result<&EngineId, RenderError> {
        Ok(self.bound()?.id())
    }

    pub fn is_engine(&mut self, engine: &str) -> Result<bool, RenderError> {
        Ok(self.engine_name()? == engine)
    }

    /// Whether markdown conversion runs; unset reads as `false` until the
    /// first resolution picks a default.
    pub fn use_markdown(&self) -> bool {
        self.use_markdown.unwrap_or(false)
    }

    pub fn markdown_engine(&self) -> Option<&EngineId> {
        self.markdown_engine.as_ref()
    }

    pub fn html_engine(&self) -> Option<&EngineId> {
        self.html_engine.as_ref()
    }

    pub fn set_use_markdown(&mut self, use_markdown: bool) {
        self.use_markdown = Some(use_markdown);
    }

    /// Engine that preprocesses markdown; `None` parses markdown only.
    pub fn set_markdown_engine(&mut self, engine: Option<EngineId>) {
        self.markdown_engine = engine;
    }

    /// Engine that preprocesses HTML; `None` passes HTML through.
    pub fn set_html_engine(&mut self, engine: Option<EngineId>) {
        self.html_engine = engine;
    }

    /// Apply a front matter engine override such as `"njk"` or `"md,njk"`.
    ///
    /// The override engine always becomes primary, so HTML preprocessing is
    /// switched off. An empty declaration binds plain HTML. With
    /// `bypass_markdown` a markdown override keeps only the preprocessor pass.
    pub fn apply_override(
        &mut self,
        declaration: &str,
        bypass_markdown: bool,
    ) -> Result<(), RenderError> {
        let chain = parse_overrides(declaration)?;

        self.set_html_engine(None);

        let Some(primary) = chain.primary() else {
            self.init(EngineId::HTML)?;
            debug!(
                identifier = %self.identifier,
                declaration,
                "engine override bound plain html"
            );
            return Ok(());
        };

        self.init(primary.as_str())?;

        let using_markdown = chain.uses_markdown() && !bypass_markdown;
        self.set_use_markdown(using_markdown);

        if using_markdown {
            self.set_markdown_engine(chain.preprocessor().cloned());
        }

        debug!(
            identifier = %self.identifier,
            declaration,
            engine = %primary,
            use_markdown = using_markdown,
            "applied engine override"
        );
        Ok(())
    }

    /// Chaining arguments for the bound engine's family.
    pub fn engine_chain(&mut self) -> Result<EngineChain, RenderError> {
        let family = self.bound()?.family();
        Ok(match family {
            EngineFamily::Markdown => EngineChain::Markdown {
                preprocessor: self.markdown_engine.clone(),
                use_markdown: self.use_markdown(),
            },
            EngineFamily::Html => EngineChain::Html {
                preprocessor: self.html_engine.clone(),
            },
            EngineFamily::Generic => EngineChain::Generic,
        })
    }

    pub fn cache_key(&mut self, body: &str) -> Result<CacheKey, RenderError> {
        let chain = self.engine_chain()?;
        let engine = self.bound()?.id().clone();
        Ok(CacheKey::new(&self.identifier, &engine, &chain, body))
    }

    /// Compiled template for `body`, served from the cache when this engine
    /// configuration has compiled the same body before.
    ///
    /// Compile failures propagate unchanged and are not cached.
    pub async fn compiled_template(&mut self, body: &str) -> Result<CompiledTemplate, RenderError> {
        let chain = self.engine_chain()?;
        let bound = self.bound()?.clone();
        let key = CacheKey::new(&self.identifier, bound.id(), &chain, body);
        let cache = Arc::clone(self.context.cache());
        let request = CompileRequest {
            source: body,
            identifier: &self.identifier,
            chain: &chain,
            engines: bound.manager(),
        };
        let bound = &bound;

        cache
            .get_or_compile(key, || async move {
                bound
                    .engine()
                    .compile(request)
                    .await
                    .map_err(RenderError::from)
            })
            .await
    }

    /// Engine description for diagnostics, e.g. `liquid (and markdown)`.
    pub fn describe_engines(&mut self) -> Result<String, RenderError> {
        let engine = self.bound()?.id().clone();
        if engine.is_markdown() && self.use_markdown() {
            let preprocessor = self
                .markdown_engine
                .as_ref()
                .map_or("false", EngineId::as_str);
            return Ok(format!("{preprocessor} (and markdown)"));
        }
        Ok(engine.to_string())
    }

    fn bound(&mut self) -> Result<&BoundEngine, RenderError> {
        if matches!(self.resolution, Resolution::Unresolved) {
            let identifier = self.identifier.clone();
            self.init(&identifier)?;
        }

        match &self.resolution {
            Resolution::Resolved(bound) => Ok(bound),
            Resolution::Unresolved => Err(RenderError::UnknownEngine {
                identifier: self.identifier.clone(),
            }),
        }
    }

    /// Resolve `identifier` and replace the current binding.
    fn init(&mut self, identifier: &str) -> Result<(), RenderError> {
        let bound = self
            .context
            .resolver()
            .resolve(identifier, &self.includes_dir)?;

        if self.use_markdown.is_none() {
            self.use_markdown = Some(bound.family() == EngineFamily::Markdown);
        }

        self.resolution = Resolution::Resolved(bound);
        Ok(())
    }
}
