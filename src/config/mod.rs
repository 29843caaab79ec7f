//! Configuration layer: typed settings with layered precedence (file → env → CLI).

mod cli;
#[cfg(test)]
mod tests;

use std::{path::PathBuf, str::FromStr};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

use crate::application::render::{
    DEFAULT_HTML_TEMPLATE_ENGINE, DEFAULT_INCLUDES_DIR, DEFAULT_INPUT_DIR,
    DEFAULT_MARKDOWN_TEMPLATE_ENGINE,
};
use crate::domain::engine::EngineId;
use crate::infra::extensions::BUILTIN_ENGINES;

pub use cli::{CliArgs, Command, EnginesArgs, RenderArgs, RenderOverrides};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "rendition";
const ENV_PREFIX: &str = "RENDITION";

/// Values that switch a preprocessor engine off.
const DISABLED_ENGINE_VALUES: &[&str] = &["", "false", "none"];

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub render: RenderSettings,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct RenderSettings {
    pub markdown_template_engine: Option<EngineId>,
    pub html_template_engine: Option<EngineId>,
    pub input_dir: PathBuf,
    pub includes_dir: PathBuf,
    pub template_formats: Vec<EngineId>,
    pub strict_variables: bool,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("render.template_formats")
            .try_parsing(true),
    );

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_render_overrides(&cli.overrides);

    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    logging: RawLoggingSettings,
    render: RawRenderSettings,
}

impl RawSettings {
    fn apply_render_overrides(&mut self, overrides: &RenderOverrides) {
        if let Some(engine) = overrides.markdown_template_engine.as_ref() {
            self.render.markdown_template_engine = Some(engine.clone());
        }
        if let Some(engine) = overrides.html_template_engine.as_ref() {
            self.render.html_template_engine = Some(engine.clone());
        }
        if let Some(dir) = overrides.input_dir.as_ref() {
            self.render.input_dir = Some(dir.clone());
        }
        if let Some(dir) = overrides.includes_dir.as_ref() {
            self.render.includes_dir = Some(dir.clone());
        }
        if let Some(formats) = overrides.template_formats.as_ref() {
            self.render.template_formats = Some(formats.clone());
        }
        if let Some(strict) = overrides.strict_variables {
            self.render.strict_variables = Some(strict);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        Ok(Self {
            logging: build_logging_settings(raw.logging)?,
            render: build_render_settings(raw.render)?,
        })
    }
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_render_settings(render: RawRenderSettings) -> Result<RenderSettings, LoadError> {
    let template_formats = match render.template_formats {
        Some(formats) => parse_template_formats(&formats)?,
        None => BUILTIN_ENGINES.iter().map(EngineId::new).collect(),
    };

    let markdown_template_engine = preprocessor_engine(
        render.markdown_template_engine,
        DEFAULT_MARKDOWN_TEMPLATE_ENGINE,
        "render.markdown_template_engine",
    )?;
    let html_template_engine = preprocessor_engine(
        render.html_template_engine,
        DEFAULT_HTML_TEMPLATE_ENGINE,
        "render.html_template_engine",
    )?;

    let input_dir = render
        .input_dir
        .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT_DIR));
    if input_dir.as_os_str().is_empty() {
        return Err(LoadError::invalid(
            "render.input_dir",
            "path must not be empty",
        ));
    }

    let includes_dir = render
        .includes_dir
        .unwrap_or_else(|| PathBuf::from(DEFAULT_INCLUDES_DIR));
    if includes_dir.is_absolute() {
        return Err(LoadError::invalid(
            "render.includes_dir",
            "path must be relative to the input directory",
        ));
    }

    Ok(RenderSettings {
        markdown_template_engine,
        html_template_engine,
        input_dir,
        includes_dir,
        template_formats,
        strict_variables: render.strict_variables.unwrap_or(false),
    })
}

fn parse_template_formats(formats: &[String]) -> Result<Vec<EngineId>, LoadError> {
    let mut parsed: Vec<EngineId> = Vec::with_capacity(formats.len());
    for format in formats {
        let engine = EngineId::new(format);
        if engine.as_str().is_empty() {
            continue;
        }
        if !is_builtin(&engine) {
            return Err(LoadError::invalid(
                "render.template_formats",
                format!("unknown template format `{engine}`"),
            ));
        }
        if !parsed.contains(&engine) {
            parsed.push(engine);
        }
    }
    Ok(parsed)
}

fn preprocessor_engine(
    value: Option<String>,
    default: &str,
    key: &'static str,
) -> Result<Option<EngineId>, LoadError> {
    let raw = value.unwrap_or_else(|| default.to_string());
    let engine = EngineId::new(&raw);
    if DISABLED_ENGINE_VALUES.contains(&engine.as_str()) {
        return Ok(None);
    }
    if !is_builtin(&engine) {
        return Err(LoadError::invalid(key, format!("unknown engine `{engine}`")));
    }
    Ok(Some(engine))
}

fn is_builtin(engine: &EngineId) -> bool {
    BUILTIN_ENGINES.contains(&engine.as_str())
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawRenderSettings {
    markdown_template_engine: Option<String>,
    html_template_engine: Option<String>,
    input_dir: Option<PathBuf>,
    includes_dir: Option<PathBuf>,
    template_formats: Option<Vec<String>>,
    strict_variables: Option<bool>,
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}
