//! File extension to engine lookup.

use crate::application::render::EngineLookup;
use crate::domain::engine::EngineId;

/// Engines shipped with the crate, which double as their file extensions.
pub const BUILTIN_ENGINES: &[&str] = &["md", "html", "njk", "liquid", "hbs"];

/// Resolves bare engine names and file paths to engines by extension.
///
/// Only the configured template formats resolve, except `html`, which stays
/// available because an empty engine override binds it.
#[derive(Debug, Clone)]
pub struct ExtensionMap {
    extensions: Vec<(String, EngineId)>,
}

impl ExtensionMap {
    /// Map restricted to `formats`; unknown formats are ignored.
    pub fn new(formats: &[EngineId]) -> Self {
        let extensions = BUILTIN_ENGINES
            .iter()
            .filter(|engine| **engine == EngineId::HTML || formats.iter().any(|f| f == **engine))
            .map(|engine| ((*engine).to_string(), EngineId::new(engine)))
            .collect();
        Self { extensions }
    }

    /// Map for every built-in engine.
    pub fn builtin() -> Self {
        let formats: Vec<EngineId> = BUILTIN_ENGINES.iter().map(EngineId::new).collect();
        Self::new(&formats)
    }

    /// Add an extra extension, e.g. `markdown` for `md`.
    pub fn with_extension(mut self, extension: &str, engine: EngineId) -> Self {
        self.extensions
            .push((extension.trim().to_lowercase(), engine));
        self
    }
}

impl Default for ExtensionMap {
    fn default() -> Self {
        Self::builtin()
    }
}

impl EngineLookup for ExtensionMap {
    fn engine_key(&self, identifier_or_path: &str) -> Option<EngineId> {
        let needle = identifier_or_path.trim().to_lowercase();
        self.extensions
            .iter()
            .find(|(extension, _)| {
                needle == *extension
                    || needle
                        .strip_suffix(extension.as_str())
                        .is_some_and(|stem| stem.ends_with('.'))
            })
            .map(|(_, engine)| engine.clone())
    }
}
