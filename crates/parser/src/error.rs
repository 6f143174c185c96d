//! Parser error types.

use miette::{Diagnostic, SourceSpan};
use plugbay_core::PlugbayError;
use thiserror::Error;

/// Error type for parsing failures.
#[derive(Debug, Error, Diagnostic)]
#[error("Invalid {expected}: {message}")]
#[diagnostic(code(plugbay::parser::error))]
pub struct ParseError {
    /// What the input was supposed to be.
    pub expected: String,

    pub message: String,

    #[source_code]
    pub src: String,

    #[label("here")]
    pub span: Option<SourceSpan>,
}

impl ParseError {
    pub fn new(expected: &str, message: impl Into<String>, src: &str, offset: usize) -> Self {
        let end = (offset + 1).min(src.len().max(offset));
        Self {
            expected: expected.to_string(),
            message: message.into(),
            src: src.to_string(),
            span: Some(SourceSpan::from(offset..end)),
        }
    }

    pub fn eof(expected: &str, src: &str) -> Self {
        Self {
            expected: expected.to_string(),
            message: "unexpected end of input".to_string(),
            src: src.to_string(),
            span: Some(SourceSpan::from(src.len().saturating_sub(1)..src.len())),
        }
    }

    /// Byte offset of the failure, if known.
    pub fn offset(&self) -> Option<usize> {
        self.span.map(|span| span.offset())
    }
}

impl From<ParseError> for PlugbayError {
    fn from(err: ParseError) -> Self {
        PlugbayError::Parse {
            offset: err.offset(),
            message: err.to_string(),
        }
    }
}
