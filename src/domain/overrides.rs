//! Front matter engine overrides.
//!
//! Authors may name the engines a document should use instead of the one
//! inferred from its extension, e.g. `template_engine_override = "njk,md"`. The
//! declaration is parsed into an [`OverrideChain`]: markdown (if requested)
//! always comes first, followed by at most one other engine. `html` never
//! appears in a chain because plain markup is the implicit default.

use std::collections::HashSet;

use thiserror::Error;

use super::engine::EngineId;

/// An override declaration named more than one non-markup engine.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error(
    "Don't mix multiple templating engines in your front matter overrides (exceptions for HTML and Markdown). You used: {declaration}"
)]
pub struct OverrideConflict {
    pub declaration: String,
}

/// Ordered, de-duplicated engines parsed from an override declaration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OverrideChain(Vec<EngineId>);

impl OverrideChain {
    /// Engine the document binds to.
    pub fn primary(&self) -> Option<&EngineId> {
        self.0.first()
    }

    /// Engine that preprocesses the body before the primary engine sees it.
    pub fn preprocessor(&self) -> Option<&EngineId> {
        self.0.get(1)
    }

    pub fn uses_markdown(&self) -> bool {
        self.primary().is_some_and(EngineId::is_markdown)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EngineId> {
        self.0.iter()
    }
}

/// Parse a comma-separated override declaration.
///
/// Empty tokens and `html` are dropped, `md` is hoisted to the front, and
/// repeated tokens collapse. Naming two distinct engines other than `md` and
/// `html` fails with [`OverrideConflict`] carrying the original declaration.
pub fn parse_overrides(declaration: &str) -> Result<OverrideChain, OverrideConflict> {
    let mut engines = Vec::new();
    let mut seen = HashSet::new();
    let mut using_markdown = false;
    let mut distinct_engines = 0usize;

    for token in declaration.split(',') {
        let name = token.trim().to_lowercase();

        if name.is_empty() || name == EngineId::HTML {
            continue;
        }

        if name == EngineId::MARKDOWN {
            using_markdown = true;
            continue;
        }

        if seen.insert(name.clone()) {
            engines.push(EngineId::new(name));
            distinct_engines += 1;
        }
    }

    if distinct_engines > 1 {
        return Err(OverrideConflict {
            declaration: declaration.to_string(),
        });
    }

    if using_markdown {
        engines.insert(0, EngineId::markdown());
    }

    Ok(OverrideChain(engines))
}
