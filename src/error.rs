use std::path::PathBuf;

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

use crate::parser::token::Position;

/// Malformed token content.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    #[error("misplaced operator ('{0}').")]
    MisplacedOperator(String),

    #[error("invalid element ('{0}').")]
    InvalidElement(String),
}

/// Grammar violations and semantic errors found while building the scene.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("expected {expected} (got '{found}').")]
    Expected { expected: String, found: String },

    #[error("expected 'size' keyword (got '{0}').")]
    MissingSize(String),

    #[error("invalid keyword format ('{0}').")]
    InvalidKeyword(String),

    #[error("unknown keyword ('{0}').")]
    UnknownKeyword(String),

    #[error("shape '{name}' already defined at {first}.")]
    DuplicateShape { name: String, first: Position },

    #[error("color '{name}' already defined at {first}.")]
    DuplicateColor { name: String, first: Position },

    #[error("shape '{0}' doesn't exist.")]
    UndefinedShape(String),

    #[error("color '{0}' doesn't exist.")]
    UndefinedColor(String),

    #[error("point '{point}' doesn't exist on shape '{shape}'.")]
    UnknownNamedPoint { shape: String, point: String },

    #[error("'{0}' is not a valid coordinate.")]
    InvalidCoordinate(String),

    #[error("{what} must be {requirement} (got {value}).")]
    OutOfRange {
        what: &'static str,
        requirement: &'static str,
        value: f64,
    },

    #[error("division by 0 not allowed.")]
    DivisionByZero,
}

#[derive(Debug, Error, Diagnostic)]
pub enum PaintError {
    #[error("{file}:{line}:{column}: error: {kind}")]
    #[diagnostic(code(painter::lex))]
    Lex {
        file: String,
        line: usize,
        column: usize,
        kind: LexError,
        #[label("malformed token")]
        span: SourceSpan,
    },

    #[error("{file}:{line}:{column}: error: {kind}")]
    #[diagnostic(code(painter::parse))]
    Parse {
        file: String,
        line: usize,
        column: usize,
        kind: ParseError,
        #[label("here")]
        span: SourceSpan,
        #[help]
        help: Option<String>,
    },

    #[error("{0}")]
    #[diagnostic(code(painter::input))]
    Input(String),

    #[error("unable to open file '{}'.", .path.display())]
    #[diagnostic(code(painter::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to write file '{}'.", .path.display())]
    #[diagnostic(code(painter::io))]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PaintError {
    pub fn lex(file: &str, at: Position, kind: LexError) -> Self {
        PaintError::Lex {
            file: file.to_owned(),
            line: at.line,
            column: at.column,
            kind,
            span: at.span(),
        }
    }

    pub fn parse(file: &str, at: Position, kind: ParseError) -> Self {
        PaintError::Parse {
            file: file.to_owned(),
            line: at.line,
            column: at.column,
            kind,
            span: at.span(),
            help: None,
        }
    }

    pub fn with_help(mut self, advice: impl Into<String>) -> Self {
        if let PaintError::Parse { help, .. } = &mut self {
            *help = Some(advice.into());
        }
        self
    }

    /// Line and column of the offending token, if the error has one.
    pub fn position(&self) -> Option<(usize, usize)> {
        match self {
            PaintError::Lex { line, column, .. } | PaintError::Parse { line, column, .. } => {
                Some((*line, *column))
            }
            _ => None,
        }
    }

    #[cfg(test)]
    pub fn parse_kind(&self) -> Option<&ParseError> {
        match self {
            PaintError::Parse { kind, .. } => Some(kind),
            _ => None,
        }
    }

    #[cfg(test)]
    pub fn lex_kind(&self) -> Option<&LexError> {
        match self {
            PaintError::Lex { kind, .. } => Some(kind),
            _ => None,
        }
    }
}
