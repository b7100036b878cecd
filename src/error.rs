use std::fmt;
use std::io;
use std::sync::Arc;

use thiserror::Error;

use crate::expected::Expected;
use crate::position::SourcePos;
use crate::token::Token;

/// Crate-level error, independent of the token type.
#[derive(Error, Debug)]
pub enum Error {
    /// A parse failure, rendered with [`ParseError::render`].
    #[error("{message}")]
    Parse {
        message: String,
        location: usize,
        position: SourcePos,
    },
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Config error: {0}")]
    Config(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type InternalResult<T> = Result<T, Error>;

impl Error {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config(message.into())
    }
}

impl<I: Token> From<ParseError<I>> for Error {
    fn from(error: ParseError<I>) -> Self {
        match error.io_error {
            Some(io_error) => match Arc::try_unwrap(io_error) {
                Ok(inner) => Error::Io(inner),
                Err(shared) => Error::Io(io::Error::new(shared.kind(), shared.to_string())),
            },
            None => Error::Parse {
                message: error.render(),
                location: error.location,
                position: error.position,
            },
        }
    }
}

/// A failed parse attempt, returned by value from `Parser::try_parse`.
///
/// Cheap to build and to drop: the expensive parts of a diagnostic (source
/// position, deduplicated expected set) are only computed when a
/// [`ParseError`] is built at the top of the parse.
#[derive(Debug, Clone, PartialEq)]
pub struct Failure<I> {
    pub unexpected: Option<I>,
    pub eof: bool,
    pub location: usize,
    pub message: Option<Arc<str>>,
}

impl<I> Failure<I> {
    pub fn new(unexpected: Option<I>, eof: bool, location: usize, message: Option<Arc<str>>) -> Self {
        Self {
            unexpected,
            eof,
            location,
            message,
        }
    }

    /// A failure carrying only a message, with no unexpected token.
    pub fn message(location: usize, message: impl Into<Arc<str>>) -> Self {
        Self::new(None, false, location, Some(message.into()))
    }

    pub fn with_message(mut self, message: impl Into<Arc<str>>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// The public, immutable description of a failed parse.
#[derive(Debug, Clone)]
pub struct ParseError<I> {
    unexpected: Option<I>,
    eof: bool,
    expected: Vec<Expected<I>>,
    location: usize,
    position: SourcePos,
    message: Option<String>,
    io_error: Option<Arc<io::Error>>,
}

impl<I: Token> ParseError<I> {
    pub fn new(
        unexpected: Option<I>,
        eof: bool,
        expected: Vec<Expected<I>>,
        location: usize,
        position: SourcePos,
        message: Option<String>,
    ) -> Self {
        let mut deduplicated: Vec<Expected<I>> = Vec::with_capacity(expected.len());
        for item in expected {
            if !deduplicated.contains(&item) {
                deduplicated.push(item);
            }
        }
        Self {
            unexpected,
            eof,
            expected: deduplicated,
            location,
            position,
            message,
            io_error: None,
        }
    }

    pub(crate) fn with_io_error(mut self, error: io::Error) -> Self {
        if self.message.is_none() {
            self.message = Some(format!("I/O error: {}", error));
        }
        self.io_error = Some(Arc::new(error));
        self
    }

    pub fn unexpected(&self) -> Option<&I> {
        self.unexpected.as_ref()
    }

    pub fn is_eof(&self) -> bool {
        self.eof
    }

    pub fn expected(&self) -> &[Expected<I>] {
        &self.expected
    }

    /// Offset of the failure in tokens from the start of the input.
    pub fn location(&self) -> usize {
        self.location
    }

    pub fn position(&self) -> SourcePos {
        self.position
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn io_error(&self) -> Option<&io::Error> {
        self.io_error.as_deref()
    }

    /// Renders the multi-line diagnostic:
    ///
    /// ```text
    /// Parse error.
    ///     unexpected n
    ///     expected entity keyword
    ///     at line 1, col 1
    /// ```
    pub fn render(&self) -> String {
        let mut out = String::from("Parse error.");
        if let Some(message) = &self.message {
            out.push_str("\n    ");
            out.push_str(message);
        }
        if self.eof {
            out.push_str("\n    unexpected EOF");
        } else if let Some(token) = &self.unexpected {
            out.push_str("\n    unexpected ");
            out.push_str(&token.render());
        }
        if !self.expected.is_empty() {
            let expected = self
                .expected
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            out.push_str("\n    expected ");
            out.push_str(&expected);
        }
        out.push_str("\n    at ");
        out.push_str(&self.position.to_string());
        out
    }
}

impl<I: PartialEq> PartialEq for ParseError<I> {
    fn eq(&self, other: &Self) -> bool {
        self.unexpected == other.unexpected
            && self.eof == other.eof
            && self.expected == other.expected
            && self.location == other.location
            && self.position == other.position
            && self.message == other.message
            && self.io_error.as_ref().map(|e| e.kind()) == other.io_error.as_ref().map(|e| e.kind())
    }
}

impl<I: Token> fmt::Display for ParseError<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl<I: Token> std::error::Error for ParseError<I> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.io_error
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}
