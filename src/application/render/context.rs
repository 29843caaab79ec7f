use std::{path::PathBuf, sync::Arc};

use crate::cache::TemplateCache;
use crate::domain::engine::EngineId;
use crate::infra::extensions::{BUILTIN_ENGINES, ExtensionMap};

use super::engine::EngineLookup;
use super::manager::EngineRegistry;
use super::resolver::EngineResolver;

pub(crate) const DEFAULT_MARKDOWN_TEMPLATE_ENGINE: &str = "liquid";
pub(crate) const DEFAULT_HTML_TEMPLATE_ENGINE: &str = "liquid";
pub(crate) const DEFAULT_INPUT_DIR: &str = ".";
pub(crate) const DEFAULT_INCLUDES_DIR: &str = "_includes";

/// Engine-facing configuration shared by every dispatcher of a run.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Engine that preprocesses markdown documents; `None` renders markdown only.
    pub markdown_template_engine: Option<EngineId>,
    /// Engine that preprocesses HTML documents; `None` passes HTML through.
    pub html_template_engine: Option<EngineId>,
    /// Input directory used when a dispatcher is not given one.
    pub input_dir: PathBuf,
    /// Includes directory, relative to the input directory.
    pub includes_dir: PathBuf,
    /// Engines documents may resolve to.
    pub template_formats: Vec<EngineId>,
    /// Fail on undefined variables instead of rendering them empty.
    pub strict_variables: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            markdown_template_engine: Some(EngineId::new(DEFAULT_MARKDOWN_TEMPLATE_ENGINE)),
            html_template_engine: Some(EngineId::new(DEFAULT_HTML_TEMPLATE_ENGINE)),
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            includes_dir: PathBuf::from(DEFAULT_INCLUDES_DIR),
            template_formats: BUILTIN_ENGINES.iter().map(EngineId::new).collect(),
            strict_variables: false,
        }
    }
}

impl From<&crate::config::RenderSettings> for RenderConfig {
    fn from(settings: &crate::config::RenderSettings) -> Self {
        Self {
            markdown_template_engine: settings.markdown_template_engine.clone(),
            html_template_engine: settings.html_template_engine.clone(),
            input_dir: settings.input_dir.clone(),
            includes_dir: settings.includes_dir.clone(),
            template_formats: settings.template_formats.clone(),
            strict_variables: settings.strict_variables,
        }
    }
}

/// Collaborators shared by all dispatchers of one run: configuration, engine
/// resolution and the compiled-template cache.
///
/// Cloning shares the same cache; build a new context for an isolated one.
#[derive(Debug, Clone)]
pub struct RenderContext {
    config: Arc<RenderConfig>,
    resolver: EngineResolver,
    cache: Arc<TemplateCache>,
}

impl RenderContext {
    /// Context with the built-in engines, an extension map restricted to the
    /// configured template formats, and an empty cache.
    pub fn new(config: RenderConfig) -> Self {
        let lookup = Arc::new(ExtensionMap::new(&config.template_formats));
        Self::from_parts(
            Arc::new(config),
            lookup,
            Arc::new(EngineRegistry::with_builtin_engines()),
            Arc::new(TemplateCache::new()),
        )
    }

    pub fn from_parts(
        config: Arc<RenderConfig>,
        lookup: Arc<dyn EngineLookup>,
        registry: Arc<EngineRegistry>,
        cache: Arc<TemplateCache>,
    ) -> Self {
        let resolver = EngineResolver::new(lookup, registry, Arc::clone(&config));
        Self {
            config,
            resolver,
            cache,
        }
    }

    pub fn config(&self) -> &Arc<RenderConfig> {
        &self.config
    }

    pub fn resolver(&self) -> &EngineResolver {
        &self.resolver
    }

    pub fn cache(&self) -> &Arc<TemplateCache> {
        &self.cache
    }
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::new(RenderConfig::default())
    }
}
