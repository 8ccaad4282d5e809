//! Error types for the generation engine.
//!
//! Uses [`thiserror`] for ergonomic error derivation. Provides [`GenError`]
//! that wraps engine-internal failures and converts them to the public
//! [`FillError`] taxonomy.

use acrofill_core::FillError;
use thiserror::Error;

/// Error type for appearance-generation engine operations.
///
/// Wraps lopdf/document access failures and content-stream syntax errors
/// and provides conversion to [`FillError`] for the public surface.
#[derive(Debug, Error)]
pub enum GenError {
    /// Malformed content-stream bytes.
    #[error("content stream syntax error: {0}")]
    Syntax(String),

    /// Document object model access failure (missing key, wrong type,
    /// dangling reference).
    #[error("document structure error: {0}")]
    Structure(String),

    /// A core library error.
    #[error(transparent)]
    Core(#[from] FillError),
}

impl From<GenError> for FillError {
    fn from(err: GenError) -> Self {
        match err {
            GenError::Syntax(msg) => FillError::Syntax(msg),
            GenError::Structure(msg) => FillError::Structure(msg),
            GenError::Core(e) => e,
        }
    }
}

impl From<lopdf::Error> for GenError {
    fn from(err: lopdf::Error) -> Self {
        GenError::Structure(err.to_string())
    }
}
