//! Engine identifiers and the engine families the render pipeline branches on.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Normalised (trimmed, lowercase) name of a templating engine.
///
/// `"md"` names the markdown engine and `"html"` is the plain-markup sentinel:
/// a document bound to it is passed through unless an HTML preprocessor engine
/// is configured.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct EngineId(String);

impl EngineId {
    pub const MARKDOWN: &'static str = "md";
    pub const HTML: &'static str = "html";

    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_lowercase())
    }

    pub fn markdown() -> Self {
        Self(Self::MARKDOWN.to_string())
    }

    pub fn html() -> Self {
        Self(Self::HTML.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_markdown(&self) -> bool {
        self.0 == Self::MARKDOWN
    }

    pub fn is_html(&self) -> bool {
        self.0 == Self::HTML
    }

    pub fn family(&self) -> EngineFamily {
        EngineFamily::of(self)
    }
}

impl fmt::Display for EngineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EngineId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EngineId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for EngineId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<EngineId> for String {
    fn from(value: EngineId) -> Self {
        value.0
    }
}

impl PartialEq<str> for EngineId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for EngineId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// How a bound engine participates in chaining.
///
/// Decided once when an engine is resolved; compile and cache-key derivation
/// match on the family instead of comparing engine names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineFamily {
    /// Markdown, optionally preceded by a preprocessor engine.
    Markdown,
    /// Plain markup, optionally preceded by a preprocessor engine.
    Html,
    /// Any other engine; compiles the body directly.
    Generic,
}

impl EngineFamily {
    pub fn of(id: &EngineId) -> Self {
        if id.is_markdown() {
            Self::Markdown
        } else if id.is_html() {
            Self::Html
        } else {
            Self::Generic
        }
    }
}
