use std::sync::Arc;

use tracing::debug;

use crate::config::{ParseConfig, DEFAULT_CONFIG};
use crate::error::{Error, Failure, ParseError};
use crate::expected::Expected;
use crate::state::ParseState;
use crate::stream::{IntoTokenStream, TokenStream};
use crate::token::Token;

/// A parser producing `O` from a stream of `I` tokens.
///
/// `try_parse` either returns the parsed value or a [`Failure`]. It appends
/// to `expected` only when it fails, and a failure that leaves the cursor
/// where it started is said to have consumed no input.
pub trait Parser<I: Token, O> {
    fn try_parse(
        &self,
        state: &mut ParseState<'_, I>,
        expected: &mut Vec<Expected<I>>,
    ) -> Result<O, Failure<I>>;

    /// Parses an in-memory input with the default configuration.
    fn parse<'a, S>(&self, input: S) -> Result<O, ParseError<I>>
    where
        Self: Sized,
        S: IntoTokenStream<'a, I>,
    {
        self.parse_stream_with(input.into_token_stream(), &DEFAULT_CONFIG)
    }

    fn parse_with<'a, S>(&self, input: S, config: &ParseConfig) -> Result<O, ParseError<I>>
    where
        Self: Sized,
        S: IntoTokenStream<'a, I>,
    {
        self.parse_stream_with(input.into_token_stream(), config)
    }

    /// Parses a prefix of `input`, returning the value and how many tokens
    /// it consumed.
    fn parse_prefix<'a, S>(&self, input: S) -> Result<(O, usize), ParseError<I>>
    where
        Self: Sized,
        S: IntoTokenStream<'a, I>,
    {
        self.parse_prefix_with(input, &DEFAULT_CONFIG)
    }

    fn parse_prefix_with<'a, S>(&self, input: S, config: &ParseConfig) -> Result<(O, usize), ParseError<I>>
    where
        Self: Sized,
        S: IntoTokenStream<'a, I>,
    {
        let mut state = ParseState::new(input.into_token_stream(), config);
        let value = run(self, &mut state)?;
        Ok((value, state.location()))
    }

    fn parse_stream<'s, S>(&self, stream: S) -> Result<O, ParseError<I>>
    where
        Self: Sized,
        S: TokenStream<I> + 's,
    {
        self.parse_stream_with(stream, &DEFAULT_CONFIG)
    }

    fn parse_stream_with<'s, S>(&self, stream: S, config: &ParseConfig) -> Result<O, ParseError<I>>
    where
        Self: Sized,
        S: TokenStream<I> + 's,
    {
        let mut state = ParseState::new(stream, config);
        run(self, &mut state)
    }

    /// Like [`parse`](Self::parse), with the failure rendered into the
    /// token-independent crate [`Error`].
    fn parse_or_err<'a, S>(&self, input: S) -> Result<O, Error>
    where
        Self: Sized,
        S: IntoTokenStream<'a, I>,
    {
        self.parse(input).map_err(Error::from)
    }
}

fn run<I, O, P>(parser: &P, state: &mut ParseState<'_, I>) -> Result<O, ParseError<I>>
where
    I: Token,
    P: Parser<I, O> + ?Sized,
{
    let mut expected = state.rent_expected();
    let result = parser.try_parse(state, &mut expected);
    let outcome = match (result, state.take_stream_error()) {
        (Ok(value), None) => Ok(value),
        (Ok(_), Some(io_error)) => {
            let failure = state.unexpected_here(None);
            Err(state.build_error(&failure, &[]).with_io_error(io_error))
        }
        (Err(failure), io_error) => {
            let error = state.build_error(&failure, &expected);
            debug!(
                target: "sinew::parser",
                location = error.location(),
                "parse failed at {}",
                error.position()
            );
            Err(match io_error {
                Some(io_error) => error.with_io_error(io_error),
                None => error,
            })
        }
    };
    state.return_expected(expected);
    outcome
}

impl<I, O, F> Parser<I, O> for F
where
    I: Token,
    F: Fn(&mut ParseState<'_, I>, &mut Vec<Expected<I>>) -> Result<O, Failure<I>>,
{
    fn try_parse(
        &self,
        state: &mut ParseState<'_, I>,
        expected: &mut Vec<Expected<I>>,
    ) -> Result<O, Failure<I>> {
        self(state, expected)
    }
}

/// A type-erased, cheaply clonable parser.
pub struct BoxedParser<'a, I: Token, O> {
    inner: Arc<dyn Parser<I, O> + Send + Sync + 'a>,
    /// Set when this parser is itself a `one_of`, so enclosing `one_of`s
    /// can splice its branches in directly.
    pub(crate) branches: Option<Arc<[BoxedParser<'a, I, O>]>>,
}

impl<'a, I: Token, O> BoxedParser<'a, I, O> {
    pub fn new<P>(parser: P) -> Self
    where
        P: Parser<I, O> + Send + Sync + 'a,
    {
        Self {
            inner: Arc::new(parser),
            branches: None,
        }
    }

    pub(crate) fn with_branches<P>(parser: P, branches: Arc<[BoxedParser<'a, I, O>]>) -> Self
    where
        P: Parser<I, O> + Send + Sync + 'a,
    {
        Self {
            inner: Arc::new(parser),
            branches: Some(branches),
        }
    }
}

impl<I: Token, O> Clone for BoxedParser<'_, I, O> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            branches: self.branches.clone(),
        }
    }
}

impl<I: Token, O> Parser<I, O> for BoxedParser<'_, I, O> {
    fn try_parse(
        &self,
        state: &mut ParseState<'_, I>,
        expected: &mut Vec<Expected<I>>,
    ) -> Result<O, Failure<I>> {
        self.inner.try_parse(state, expected)
    }
}
