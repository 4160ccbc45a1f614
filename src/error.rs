//! Contains the primary `CsonhError` type for the library.
use thiserror::Error;

/// The error type for all parsing operations.
///
/// Parsing stops at the first failure, so one parse attempt produces at
/// most one error. Both variants carry a human-readable message and the
/// location (1-based line and column) where the error was detected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CsonhError {
    /// Produced while scanning source text into tokens.
    #[error("Lexer error at {line}:{column}: {message}")]
    Lexer {
        /// A description of what went wrong.
        message: String,
        /// The line number (1-indexed) where the error was detected.
        line: usize,
        /// The column number (1-indexed) where the error was detected.
        column: usize,
    },
    /// Produced while assembling tokens into a value tree.
    #[error("Parse error at {line}:{column}: {message}")]
    Parse {
        /// A description of what went wrong.
        message: String,
        /// The line number (1-indexed) where the error was detected.
        line: usize,
        /// The column number (1-indexed) where the error was detected.
        column: usize,
    },
}

impl CsonhError {
    pub(crate) fn lexer(message: impl Into<String>, line: usize, column: usize) -> Self {
        CsonhError::Lexer {
            message: message.into(),
            line,
            column,
        }
    }

    pub(crate) fn parse(message: impl Into<String>, line: usize, column: usize) -> Self {
        CsonhError::Parse {
            message: message.into(),
            line,
            column,
        }
    }

    /// The human-readable description of the failure.
    pub fn message(&self) -> &str {
        match self {
            CsonhError::Lexer { message, .. } | CsonhError::Parse { message, .. } => message,
        }
    }

    /// The 1-based line the error points at.
    pub fn line(&self) -> usize {
        match self {
            CsonhError::Lexer { line, .. } | CsonhError::Parse { line, .. } => *line,
        }
    }

    /// The 1-based column the error points at.
    pub fn column(&self) -> usize {
        match self {
            CsonhError::Lexer { column, .. } | CsonhError::Parse { column, .. } => *column,
        }
    }
}
