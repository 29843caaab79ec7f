use std::{
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
};

use tracing::debug;

use crate::domain::engine::{EngineFamily, EngineId};

use super::context::RenderConfig;
use super::engine::{EngineLookup, TemplateEngine};
use super::manager::{EngineManager, EngineRegistry};
use super::types::RenderError;

/// Result of resolving an identifier: the canonical engine plus the instance
/// and manager bound to it.
#[derive(Clone)]
pub struct BoundEngine {
    id: EngineId,
    family: EngineFamily,
    engine: Arc<dyn TemplateEngine>,
    manager: Arc<EngineManager>,
}

impl BoundEngine {
    pub fn id(&self) -> &EngineId {
        &self.id
    }

    pub fn family(&self) -> EngineFamily {
        self.family
    }

    pub fn engine(&self) -> &Arc<dyn TemplateEngine> {
        &self.engine
    }

    pub fn manager(&self) -> &EngineManager {
        &self.manager
    }
}

impl fmt::Debug for BoundEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundEngine")
            .field("id", &self.id)
            .field("family", &self.family)
            .field("manager", &self.manager)
            .finish()
    }
}

/// Turns paths and bare engine names into bound engines.
#[derive(Clone)]
pub struct EngineResolver {
    lookup: Arc<dyn EngineLookup>,
    registry: Arc<EngineRegistry>,
    config: Arc<RenderConfig>,
}

impl EngineResolver {
    pub fn new(
        lookup: Arc<dyn EngineLookup>,
        registry: Arc<EngineRegistry>,
        config: Arc<RenderConfig>,
    ) -> Self {
        Self {
            lookup,
            registry,
            config,
        }
    }

    /// Includes directory for documents under `input_dir`, falling back to the
    /// configured input directory.
    pub fn includes_dir_for(&self, input_dir: Option<&Path>) -> PathBuf {
        input_dir
            .unwrap_or(self.config.input_dir.as_path())
            .join(&self.config.includes_dir)
    }

    /// Bind the engine for `identifier_or_path`.
    ///
    /// Each call builds a fresh engine manager so that engines observe the
    /// current configuration, and asks the bound engine to drop any internal
    /// caches kept for `identifier_or_path`.
    pub fn resolve(
        &self,
        identifier_or_path: &str,
        includes_dir: &Path,
    ) -> Result<BoundEngine, RenderError> {
        let id = self
            .lookup
            .engine_key(identifier_or_path)
            .ok_or_else(|| RenderError::UnknownEngine {
                identifier: identifier_or_path.to_string(),
            })?;

        let manager = Arc::new(EngineManager::new(
            Arc::clone(&self.registry),
            Arc::clone(&self.config),
            includes_dir.to_path_buf(),
        ));
        let engine = manager.get_engine(&id)?;
        engine.reset_module_cache(identifier_or_path);

        debug!(
            engine = %id,
            identifier = identifier_or_path,
            includes_dir = %includes_dir.display(),
            "resolved template engine"
        );

        Ok(BoundEngine {
            family: id.family(),
            id,
            engine,
            manager,
        })
    }
}

impl fmt::Debug for EngineResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineResolver")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish()
    }
}
