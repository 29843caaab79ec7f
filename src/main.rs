use std::{path::Path, process};

use rendition::{
    application::{
        document::{DocumentOptions, describe_document, parse_render_data, render_document},
        error::{AppError, error_chain},
        render::{RenderConfig, RenderContext},
    },
    config::{self, Command, EnginesArgs, RenderArgs},
    infra::{error::InfraError, telemetry},
};
use tracing::{Dispatch, Level, dispatcher, error};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    let chain = error_chain(error).join(": ");
    if dispatcher::has_been_set() {
        error!(source = error.source_label(), error = %chain, "application error");
        return;
    }

    let subscriber = tracing_fmt()
        .with_writer(std::io::stderr)
        .with_max_level(Level::ERROR)
        .finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(source = error.source_label(), error = %chain, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;

    telemetry::init(&settings.logging)?;
    let context = RenderContext::new(RenderConfig::from(&settings.render));

    match cli_args.command {
        Command::Render(args) => run_render(&context, args).await,
        Command::Engines(args) => run_engines(&context, args).await,
    }
}

async fn run_render(context: &RenderContext, args: RenderArgs) -> Result<(), AppError> {
    let source = read_document(&args.file).await?;
    let data = match args.data.as_deref() {
        Some(raw) => parse_render_data(raw)?,
        None => Default::default(),
    };
    let options = DocumentOptions {
        engine_override: args.engine_override,
        bypass_markdown: args.bypass_markdown,
        data,
    };

    let identifier = args.file.to_string_lossy();
    let output = render_document(context, &identifier, &source, &options).await?;
    print!("{output}");
    Ok(())
}

async fn run_engines(context: &RenderContext, args: EnginesArgs) -> Result<(), AppError> {
    let source = read_document(&args.file).await?;
    let options = DocumentOptions {
        engine_override: args.engine_override,
        ..DocumentOptions::default()
    };

    let identifier = args.file.to_string_lossy();
    let description = describe_document(context, &identifier, &source, &options)?;
    println!("{description}");
    Ok(())
}

async fn read_document(path: &Path) -> Result<String, AppError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|err| InfraError::read(path.display().to_string(), err).into())
}
