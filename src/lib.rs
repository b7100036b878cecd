//! # sinew
//!
//! Parser combinators over chunked token streams.
//!
//! Input arrives as a [`TokenStream`](stream::TokenStream) that is read a chunk
//! at a time, so grammars can backtrack over sources that cannot seek (pipes,
//! sockets, lazily produced token iterators). A grammar is built from the
//! primitives and combinators in [`parser::prelude`]; the permutation and
//! expression builders sit on top of that algebra.
//!
//! ```
//! use sinew::parser::prelude::*;
//!
//! let assignment = letter()
//!     .at_least_once_string()
//!     .before(equal('=').between(skip_whitespaces(), skip_whitespaces()))
//!     .and(dec_num());
//! assert_eq!(assignment.parse("x = 42"), Ok(("x".to_string(), 42)));
//!
//! let error = assignment.parse("x = y").unwrap_err();
//! assert_eq!(error.to_string(), "Parse error.\n    unexpected y\n    expected number\n    at line 1, col 5");
//! ```

pub mod config;
pub mod error;
pub mod expected;
pub mod expression;
pub mod parser;
pub mod permutation;
pub mod position;
pub mod state;
pub mod stream;
pub mod token;

// Re-exports
pub use config::{ParseConfig, DEFAULT_CONFIG};
pub use error::{Error, Failure, InternalResult, ParseError};
pub use expected::Expected;
pub use expression::{expression, expression_with, Fixity, Operator};
pub use parser::{BoxedParser, Parser, ParserExt};
pub use permutation::{Permutation, PermutationParser};
pub use position::{SourcePos, SourcePosDelta};
pub use state::{Bookmark, ParseState};
pub use token::Token;
