//! Error types for the md2cook library.
//!
//! Two distinct error types reflect the two layers of the crate:
//!
//! * [`Md2CookError`] — returned by the top-level `convert*` functions.
//!   Covers usage errors (bad path, wrong extension, missing credential),
//!   I/O failures, and wrapped service failures.
//!
//! * [`GenerateError`] — produced at the service boundary by a
//!   [`crate::generator::TextGenerator`] implementation. Kept separate so
//!   alternative providers only need to speak HTTP-level failures and never
//!   learn about filesystem concerns.
//!
//! During a directory batch, a per-file [`Md2CookError`] is logged and
//! recorded in the [`crate::output::FileOutcome`] for that file rather than
//! propagated, so one bad file never aborts the batch.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the md2cook library.
#[derive(Debug, Error)]
pub enum Md2CookError {
    // ── Usage errors ──────────────────────────────────────────────────────
    /// No API key could be resolved from any of the supported sources.
    #[error(
        "OpenAI API key not provided. Either:\n\
         1. Use the --api-key option\n\
         2. Set the OPENAI_API_KEY environment variable\n\
         3. Create a .env file with OPENAI_API_KEY=your-key"
    )]
    ApiKeyMissing,

    /// Input file or directory was not found at the given path.
    #[error("Input not found: '{path}'\nCheck the path exists and is readable.")]
    InputNotFound { path: PathBuf },

    /// The input file exists but does not carry the `.md` extension.
    #[error("Input file must be a markdown file (.md): '{path}'")]
    NotMarkdown { path: PathBuf },

    /// A spec override path was given but the file could not be read.
    #[error("Cooklang spec file not found: '{path}'")]
    SpecNotFound { path: PathBuf },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not read the input markdown file.
    #[error("Failed to read input file '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not create or write the output `.cook` file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Service errors ────────────────────────────────────────────────────
    /// The generation service call failed. Not retried.
    #[error("Conversion failed: {0}")]
    GenerationFailed(#[from] GenerateError),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Errors produced at the text-generation service boundary.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// The HTTP request could not be sent or the response body not read.
    #[error("request to generation service failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status code.
    #[error("generation service returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    /// The completion contained no choices, or the first choice had no text.
    #[error("generation service returned an empty completion")]
    EmptyCompletion,
}
