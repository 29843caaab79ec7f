use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};

/// Command-line arguments for the rendition binary.
#[derive(Debug, Parser)]
#[command(
    name = "rendition",
    version,
    about = "Render documents through chained template engines"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "RENDITION_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: RenderOverrides,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Render a document to stdout.
    Render(RenderArgs),
    /// Print which engines would render a document.
    Engines(EnginesArgs),
}

#[derive(Debug, Args, Clone)]
pub struct RenderArgs {
    /// Document to render; its extension selects the engine.
    #[arg(value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub file: PathBuf,

    /// Engine override declaration, e.g. `njk` or `md,njk`. Takes precedence
    /// over `template_engine_override` in the document front matter.
    #[arg(long = "engine-override", value_name = "DECL")]
    pub engine_override: Option<String>,

    /// Skip markdown conversion when a markdown override is applied.
    #[arg(long = "bypass-markdown", action = clap::ArgAction::SetTrue)]
    pub bypass_markdown: bool,

    /// JSON object merged over the front matter data.
    #[arg(long = "data", value_name = "JSON")]
    pub data: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct EnginesArgs {
    /// Document to inspect.
    #[arg(value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub file: PathBuf,

    /// Engine override declaration to apply before describing.
    #[arg(long = "engine-override", value_name = "DECL")]
    pub engine_override: Option<String>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct RenderOverrides {
    /// Engine that preprocesses markdown (`false` disables preprocessing).
    #[arg(long = "markdown-template-engine", value_name = "ENGINE", global = true)]
    pub markdown_template_engine: Option<String>,

    /// Engine that preprocesses HTML (`false` disables preprocessing).
    #[arg(long = "html-template-engine", value_name = "ENGINE", global = true)]
    pub html_template_engine: Option<String>,

    /// Override the input directory.
    #[arg(
        long = "input-dir",
        value_name = "PATH",
        value_hint = ValueHint::DirPath,
        global = true
    )]
    pub input_dir: Option<PathBuf>,

    /// Override the includes directory, relative to the input directory.
    #[arg(long = "includes-dir", value_name = "PATH", global = true)]
    pub includes_dir: Option<PathBuf>,

    /// Comma-separated list of template formats documents may use.
    #[arg(
        long = "template-formats",
        value_name = "LIST",
        value_delimiter = ',',
        global = true
    )]
    pub template_formats: Option<Vec<String>>,

    /// Fail on undefined template variables.
    #[arg(
        long = "strict-variables",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new(),
        global = true
    )]
    pub strict_variables: Option<bool>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new(),
        global = true
    )]
    pub log_json: Option<bool>,
}
