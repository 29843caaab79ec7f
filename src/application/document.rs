//! Rendering whole documents: front matter, engine override, data, output.

use serde_json::{Map, Value};
use tracing::{debug, info};

use super::error::AppError;
use super::front_matter::{Document, parse_document};
use super::render::{RenderContext, TemplateRender};

/// Per-invocation options layered over what the document declares.
#[derive(Debug, Clone, Default)]
pub struct DocumentOptions {
    /// Override declaration taking precedence over the front matter one.
    pub engine_override: Option<String>,
    pub bypass_markdown: bool,
    /// Data merged over the front matter data.
    pub data: Map<String, Value>,
}

/// Parse `--data` style JSON; only objects are accepted.
pub fn parse_render_data(raw: &str) -> Result<Map<String, Value>, AppError> {
    match serde_json::from_str(raw)? {
        Value::Object(map) => Ok(map),
        Value::Null => Err(AppError::DataShape("null")),
        Value::Bool(_) => Err(AppError::DataShape("a boolean")),
        Value::Number(_) => Err(AppError::DataShape("a number")),
        Value::String(_) => Err(AppError::DataShape("a string")),
        Value::Array(_) => Err(AppError::DataShape("an array")),
    }
}

/// Render `source`, identified by `identifier`, to its final output.
pub async fn render_document(
    context: &RenderContext,
    identifier: &str,
    source: &str,
    options: &DocumentOptions,
) -> Result<String, AppError> {
    let document = parse_document(source)?;
    let mut render = prepare(context, identifier, &document, options)?;

    let compiled = render.compiled_template(&document.body).await?;

    let mut data = document.data;
    data.extend(options.data.clone());
    let output = compiled.render(&Value::Object(data))?;

    let engines = render.describe_engines()?;
    info!(
        identifier,
        engines = %engines,
        bytes = output.len(),
        "rendered document"
    );
    Ok(output)
}

/// Describe the engines that would render `source`, e.g. `njk (and markdown)`.
pub fn describe_document(
    context: &RenderContext,
    identifier: &str,
    source: &str,
    options: &DocumentOptions,
) -> Result<String, AppError> {
    let document = parse_document(source)?;
    let mut render = prepare(context, identifier, &document, options)?;
    Ok(render.describe_engines()?)
}

fn prepare(
    context: &RenderContext,
    identifier: &str,
    document: &Document,
    options: &DocumentOptions,
) -> Result<TemplateRender, AppError> {
    let mut render = TemplateRender::new(identifier, None, context)?;

    let declaration = options
        .engine_override
        .as_deref()
        .or(document.engine_override.as_deref());
    if let Some(declaration) = declaration {
        debug!(identifier, declaration, "applying document engine override");
        render.apply_override(declaration, options.bypass_markdown)?;
    }

    Ok(render)
}
