//! Error handling for the treemaker application.
//! Defines custom error types and results used throughout the application.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::lexer::LexError;

/// Custom error types for treemaker operations.
///
/// Lexer diagnostics and parser structural violations are plain data and do not
/// live here; this enum covers the conditions that stop processing of a file.
#[derive(Error, Debug)]
pub enum Error {
    /// Represents errors that occur during file system operations
    #[error("IO error: {0}.")]
    IoError(#[from] io::Error),

    /// The lexer reported at least one diagnostic, so the template is not parsed
    #[error("Lexing failed for '{file}' with {} error(s).", errors.len())]
    LexError { file: String, errors: Vec<LexError> },

    /// Token dump mode found lexer errors
    #[error("Tokenization reported errors in {0} file(s).")]
    TokenizeFailed(usize),

    /// The template produced no nodes at all
    #[error("Template '{file}' is empty, nothing to create.")]
    EmptyTemplate { file: String },

    /// A tree without a root was handed to the builder
    #[error("Tree is empty, nothing to create.")]
    EmptyTree,

    /// Growing the level stack or the node arena failed
    #[error("Allocation failed while {0}.")]
    Allocation(String),

    /// Represents errors that occur during configuration parsing or processing
    #[error("Configuration error: {0}.")]
    ConfigError(String),

    /// Creating a directory or file on disk failed
    #[error("Cannot create '{}': {source}.", path.display())]
    BuildError { path: PathBuf, source: io::Error },
}

/// Convenience type alias for Results with [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Default error handler that prints the error and exits the program.
///
/// Lexer diagnostics are printed one per line, in the
/// `file:line:col: error: message (KIND)` shape, before the summary.
pub fn default_error_handler(err: Error) {
    if let Error::LexError { file, errors } = &err {
        for error in errors {
            eprintln!("{}", error.report(file));
        }
    }
    eprintln!("{}", err);
    std::process::exit(1);
}
