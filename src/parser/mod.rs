//! Parsers and combinators.
//!
//! A grammar is a value: primitive parsers from [`prelude`] are composed with
//! the [`ParserExt`] methods (or their free-function forms) into a single
//! parser, which is then run with [`Parser::parse`] and friends. Composition is
//! monomorphized; [`BoxedParser`] erases the type where a grammar needs to
//! name it, store it, or pick among parsers at run time.
//!
//! ```
//! use sinew::parser::prelude::*;
//!
//! let list = dec_num()
//!     .separated(equal(',').between(skip_whitespaces(), skip_whitespaces()))
//!     .between(equal('['), equal(']'));
//! assert_eq!(list.parse("[1, 2 ,3]"), Ok(vec![1, 2, 3]));
//! ```

mod alternation;
mod combinators;
mod core;
mod ext;
mod primitives;
mod recursive;
mod repeat;
mod separated;
mod text;
mod until;

pub mod prelude;

pub use self::alternation::{OneOf, Or};
pub use self::combinators::*;
pub use self::core::{BoxedParser, Parser};
pub use self::ext::{Many, ManyString, ParserExt, SkipMany};
pub use self::primitives::*;
pub use self::recursive::{recursive, Recursive, RecursiveRef};
pub use self::repeat::{Chain, Chainer, Repeat, SkipChainer, StringChainer, VecChainer};
pub use self::separated::{Separated, SeparatorMode};
pub use self::until::{Collect, ManyThen, Skip, SkipThen, SkipUntil, Until, UntilItems};

pub(crate) use self::alternation::Alternatives;
pub(crate) use self::repeat::no_progress;
