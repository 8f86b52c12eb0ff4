//! Error types for the review engine

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReviewError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Missing required field '{field}' for template '{template}'")]
    MissingField { template: String, field: String },
}
