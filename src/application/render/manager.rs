use std::{
    collections::HashMap,
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
};

use dashmap::DashMap;
use tracing::debug;

use crate::domain::engine::EngineId;

use super::context::RenderConfig;
use super::engine::TemplateEngine;
use super::types::EngineError;

/// Builds an engine instance for a given includes directory.
pub type EngineFactory = Arc<dyn Fn(&Path) -> Box<dyn TemplateEngine> + Send + Sync>;

/// Engine factories keyed by engine name.
#[derive(Clone, Default)]
pub struct EngineRegistry {
    factories: HashMap<EngineId, EngineFactory>,
}

impl EngineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding `md`, `html`, `njk`, `liquid` and `hbs`.
    pub fn with_builtin_engines() -> Self {
        let mut registry = Self::new();
        crate::infra::engines::register_builtin_engines(&mut registry);
        registry
    }

    /// Register (or replace) the factory for `engine`.
    pub fn register<F>(&mut self, engine: impl Into<EngineId>, factory: F)
    where
        F: Fn(&Path) -> Box<dyn TemplateEngine> + Send + Sync + 'static,
    {
        self.factories.insert(engine.into(), Arc::new(factory));
    }

    pub fn contains(&self, engine: &EngineId) -> bool {
        self.factories.contains_key(engine)
    }

    pub fn engines(&self) -> impl Iterator<Item = &EngineId> {
        self.factories.keys()
    }

    fn factory(&self, engine: &EngineId) -> Option<&EngineFactory> {
        self.factories.get(engine)
    }
}

impl fmt::Debug for EngineRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut engines: Vec<_> = self.factories.keys().map(EngineId::as_str).collect();
        engines.sort_unstable();
        f.debug_struct("EngineRegistry")
            .field("engines", &engines)
            .finish()
    }
}

/// Instantiates engines on demand and reuses them for the manager's lifetime.
///
/// Every engine handed out has already received the manager's configuration.
pub struct EngineManager {
    registry: Arc<EngineRegistry>,
    config: Arc<RenderConfig>,
    includes_dir: PathBuf,
    engines: DashMap<EngineId, Arc<dyn TemplateEngine>>,
}

impl EngineManager {
    pub fn new(registry: Arc<EngineRegistry>, config: Arc<RenderConfig>, includes_dir: PathBuf) -> Self {
        Self {
            registry,
            config,
            includes_dir,
            engines: DashMap::new(),
        }
    }

    pub fn get_engine(&self, engine: &EngineId) -> Result<Arc<dyn TemplateEngine>, EngineError> {
        if let Some(existing) = self.engines.get(engine) {
            return Ok(Arc::clone(existing.value()));
        }

        let factory = self
            .registry
            .factory(engine)
            .ok_or_else(|| EngineError::Unregistered {
                engine: engine.clone(),
            })?;

        let mut instance = factory(self.includes_dir.as_path());
        instance.set_config(Arc::clone(&self.config));
        let instance: Arc<dyn TemplateEngine> = Arc::from(instance);

        debug!(
            engine = %engine,
            includes_dir = %self.includes_dir.display(),
            "instantiated template engine"
        );

        let entry = self.engines.entry(engine.clone()).or_insert(instance);
        Ok(Arc::clone(entry.value()))
    }
}

impl fmt::Debug for EngineManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineManager")
            .field("registry", &self.registry)
            .field("includes_dir", &self.includes_dir)
            .field("instantiated", &self.engines.len())
            .finish()
    }
}
