//! Error handling for the MiniC compiler
//!
//! Every failure in the pipeline is fatal: the first error aborts the
//! compilation and is surfaced to the caller with the offending
//! construct and its position.

use crate::source_loc::SourceLocation;
use thiserror::Error;

/// Main compiler error type that encompasses all phases of compilation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompilerError {
    /// A child was attached to a slot its parent does not declare.
    #[error("Structural error at {location}: cannot attach to {node} slot {slot}: {message}")]
    Structural {
        node: String,
        slot: usize,
        location: SourceLocation,
        message: String,
    },

    /// The external parse tree does not have the shape the AST builder expects.
    #[error("Malformed input at {location}: {construct}: {message}")]
    MalformedInput {
        construct: String,
        location: SourceLocation,
        message: String,
    },

    /// An emission scope was left more often than it was entered.
    #[error("Nesting imbalance in {scope}: leave_scope called at nesting level 0")]
    NestingImbalance { scope: String },

    #[error("Code generation error at {location}: {message}")]
    Codegen {
        location: SourceLocation,
        message: String,
    },

    #[error("IO error: {message}")]
    Io { message: String },

    #[error("Internal compiler error: {message}")]
    Internal { message: String },
}

impl CompilerError {
    /// Create a structural error for `node` (kind and serial) and `slot`
    pub fn structural(node: String, slot: usize, location: SourceLocation, message: impl Into<String>) -> Self {
        CompilerError::Structural {
            node,
            slot,
            location,
            message: message.into(),
        }
    }

    /// Create a malformed-input error naming the offending construct
    pub fn malformed(construct: &str, location: SourceLocation, message: impl Into<String>) -> Self {
        CompilerError::MalformedInput {
            construct: construct.to_string(),
            location,
            message: message.into(),
        }
    }

    /// Create a codegen error
    pub fn codegen_error(message: impl Into<String>, location: SourceLocation) -> Self {
        CompilerError::Codegen {
            location,
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        CompilerError::Internal {
            message: message.into(),
        }
    }

    /// Source position of the failing construct, when the error has one
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            CompilerError::Structural { location, .. }
            | CompilerError::MalformedInput { location, .. }
            | CompilerError::Codegen { location, .. } => Some(location),
            CompilerError::NestingImbalance { .. }
            | CompilerError::Io { .. }
            | CompilerError::Internal { .. } => None,
        }
    }
}

/// Convert from std::io::Error
impl From<std::io::Error> for CompilerError {
    fn from(err: std::io::Error) -> Self {
        CompilerError::Io {
            message: err.to_string(),
        }
    }
}
