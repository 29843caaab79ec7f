//! TOML front matter delimited by `+++` lines.

use serde_json::{Map, Value};
use thiserror::Error;

const DELIMITER: &str = "+++";

/// Front matter key holding an engine override declaration.
pub const ENGINE_OVERRIDE_KEY: &str = "template_engine_override";

#[derive(Debug, Error)]
pub enum FrontMatterError {
    #[error("front matter opened with `+++` is never closed")]
    Unterminated,
    #[error("failed to parse front matter: {0}")]
    Parse(String),
    #[error("`{ENGINE_OVERRIDE_KEY}` must be a string")]
    InvalidOverride,
}

/// A document split into its front matter and body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    /// Engine override declared in the front matter, if any.
    pub engine_override: Option<String>,
    /// Remaining front matter keys, available to templates as data.
    pub data: Map<String, Value>,
    pub body: String,
}

/// Split `source` into front matter and body.
///
/// A document without an opening `+++` line is all body.
pub fn parse_document(source: &str) -> Result<Document, FrontMatterError> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);

    let mut lines = source.split_inclusive('\n');
    let Some(first) = lines.next() else {
        return Ok(Document::default());
    };
    if first.trim_end() != DELIMITER {
        return Ok(Document {
            body: source.to_string(),
            ..Document::default()
        });
    }

    let mut offset = first.len();
    let mut front = String::new();
    let mut closed = false;
    for line in lines {
        offset += line.len();
        if line.trim_end() == DELIMITER {
            closed = true;
            break;
        }
        front.push_str(line);
    }
    if !closed {
        return Err(FrontMatterError::Unterminated);
    }

    let table: toml::Table =
        toml::from_str(&front).map_err(|err| FrontMatterError::Parse(err.to_string()))?;
    let mut data = match serde_json::to_value(table) {
        Ok(Value::Object(map)) => map,
        Ok(_) => Map::new(),
        Err(err) => return Err(FrontMatterError::Parse(err.to_string())),
    };

    let engine_override = match data.remove(ENGINE_OVERRIDE_KEY) {
        None => None,
        Some(Value::String(declaration)) => Some(declaration),
        Some(_) => return Err(FrontMatterError::InvalidOverride),
    };

    Ok(Document {
        engine_override,
        data,
        body: source[offset..].to_string(),
    })
}
