//! Error type shared by every stage of a document build.
//!
//! All variants are build-fatal: the first error aborts the filter and no
//! rewritten document is produced.

use crate::extension::language::Language;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, FilterError>;

/// Errors raised while processing a document.
#[derive(Debug, Error)]
pub enum FilterError {
    /// The tool executable for a language could not be found.
    #[error("Error running '{program}' for {language} code blocks: command not found.\n{hint}")]
    ToolNotFound {
        language: Language,
        program: String,
        hint: String,
    },

    /// The tool could not be started or exited unsuccessfully.
    #[error("Error running '{program}' for {language} code blocks: {message}\n{hint}")]
    ToolExecution {
        language: Language,
        program: String,
        message: String,
        hint: String,
    },

    /// The tool output held no usable payload.
    #[error("{reason} in {language} shinylive response:\n{output}")]
    MalformedToolOutput {
        language: Language,
        reason: String,
        output: String,
    },

    /// A JSON payload was found but could not be decoded.
    #[error("Error decoding JSON response from `{language}` {{shinylive}}:\n{text}\n{message}")]
    JsonDecode {
        language: Language,
        text: String,
        message: String,
    },

    #[error("The shinylive extension must be used in a Quarto project directory (with a _quarto.yml file).")]
    NotInProjectContext,

    /// Two languages in one document support different assets bundles.
    #[error(
        "The shinylive R and Python packages must support the same Shinylive Assets version to be used in the same Quarto document.\n\n{details}\n\nPlease try updating your R and Python shinylive packages to their latest versions.\n{upgrade_hints}"
    )]
    AssetsVersionMismatch {
        details: String,
        upgrade_hints: String,
    },

    #[error(
        "The shinylive {language} package must be at least version v{minimum} to be used in a Quarto document (found v{found}).\n{hint}"
    )]
    ToolTooOld {
        language: Language,
        found: String,
        minimum: String,
        hint: String,
    },

    /// Turning a code block into an app request failed.
    #[error("Error converting {language} code block to JSON: {message}")]
    Conversion { language: Language, message: String },

    #[error("Unknown language: {0}")]
    UnknownLanguage(String),

    #[error("Invalid pandoc document: {0}")]
    InvalidDocument(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl FilterError {
    /// Whether the error comes from setup rather than from a document build.
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, Self::Config(_) | Self::UnknownLanguage(_))
    }
}
