use std::error::Error as StdError;

use thiserror::Error;

use crate::{
    application::{
        front_matter::FrontMatterError,
        render::{EngineError, RenderError},
    },
    config::LoadError,
    infra::error::InfraError,
};

/// Messages of `error` followed by those of each of its sources.
pub fn error_chain(error: &dyn StdError) -> Vec<String> {
    let mut messages = vec![error.to_string()];
    let mut current = error.source();
    while let Some(inner) = current {
        messages.push(inner.to_string());
        current = inner.source();
    }
    messages
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] LoadError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    FrontMatter(#[from] FrontMatterError),
    #[error("invalid render data: {0}")]
    Data(#[from] serde_json::Error),
    #[error("render data must be a JSON object, got {0}")]
    DataShape(&'static str),
}

impl AppError {
    /// Short label for the failing layer, used as a structured log field.
    pub fn source_label(&self) -> &'static str {
        match self {
            AppError::Config(_) => "config",
            AppError::Infra(_) => "infra",
            AppError::Render(_) | AppError::Engine(_) => "render",
            AppError::FrontMatter(_) => "front_matter",
            AppError::Data(_) | AppError::DataShape(_) => "data",
        }
    }
}
