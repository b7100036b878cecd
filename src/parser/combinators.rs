use std::marker::PhantomData;
use std::sync::Arc;

use tracing::debug;

use super::alternation::Alternatives;
use super::core::Parser;
use crate::error::{Failure, ParseError};
use crate::expected::Expected;
use crate::state::ParseState;
use crate::token::Token;

/// Label reported when `assert` or `filter_map` rejects a parsed value.
pub const ASSERTION_FAILED: &str = "assertion failed";

#[derive(Clone)]
pub struct Map<P, F, A> {
    parser: P,
    f: F,
    _phantom: PhantomData<fn(A)>,
}

impl<P, F, A> Map<P, F, A> {
    pub fn new(parser: P, f: F) -> Self {
        Self {
            parser,
            f,
            _phantom: PhantomData,
        }
    }
}

impl<I, A, B, P, F> Parser<I, B> for Map<P, F, A>
where
    I: Token,
    P: Parser<I, A>,
    F: Fn(A) -> B,
{
    fn try_parse(
        &self,
        state: &mut ParseState<'_, I>,
        expected: &mut Vec<Expected<I>>,
    ) -> Result<B, Failure<I>> {
        self.parser.try_parse(state, expected).map(&self.f)
    }
}

// Bind: the parsed value chooses the parser that runs next
#[derive(Clone)]
pub struct Bind<P, F, A> {
    parser: P,
    f: F,
    _phantom: PhantomData<fn(A)>,
}

impl<P, F, A> Bind<P, F, A> {
    pub fn new(parser: P, f: F) -> Self {
        Self {
            parser,
            f,
            _phantom: PhantomData,
        }
    }
}

impl<I, A, B, P, F, Q> Parser<I, B> for Bind<P, F, A>
where
    I: Token,
    P: Parser<I, A>,
    F: Fn(A) -> Q,
    Q: Parser<I, B>,
{
    fn try_parse(
        &self,
        state: &mut ParseState<'_, I>,
        expected: &mut Vec<Expected<I>>,
    ) -> Result<B, Failure<I>> {
        let value = self.parser.try_parse(state, expected)?;
        (self.f)(value).try_parse(state, expected)
    }
}

// Then: runs both, keeps the second value
#[derive(Clone)]
pub struct Then<P1, P2, A> {
    first: P1,
    second: P2,
    _phantom: PhantomData<fn(A)>,
}

impl<P1, P2, A> Then<P1, P2, A> {
    pub fn new(first: P1, second: P2) -> Self {
        Self {
            first,
            second,
            _phantom: PhantomData,
        }
    }
}

impl<I, A, B, P1, P2> Parser<I, B> for Then<P1, P2, A>
where
    I: Token,
    P1: Parser<I, A>,
    P2: Parser<I, B>,
{
    fn try_parse(
        &self,
        state: &mut ParseState<'_, I>,
        expected: &mut Vec<Expected<I>>,
    ) -> Result<B, Failure<I>> {
        self.first.try_parse(state, expected)?;
        self.second.try_parse(state, expected)
    }
}

// Before: runs both, keeps the first value
#[derive(Clone)]
pub struct Before<P1, P2, B> {
    first: P1,
    second: P2,
    _phantom: PhantomData<fn(B)>,
}

impl<P1, P2, B> Before<P1, P2, B> {
    pub fn new(first: P1, second: P2) -> Self {
        Self {
            first,
            second,
            _phantom: PhantomData,
        }
    }
}

impl<I, A, B, P1, P2> Parser<I, A> for Before<P1, P2, B>
where
    I: Token,
    P1: Parser<I, A>,
    P2: Parser<I, B>,
{
    fn try_parse(
        &self,
        state: &mut ParseState<'_, I>,
        expected: &mut Vec<Expected<I>>,
    ) -> Result<A, Failure<I>> {
        let value = self.first.try_parse(state, expected)?;
        self.second.try_parse(state, expected)?;
        Ok(value)
    }
}

// ThenWith: runs both, combines the values with `f`
#[derive(Clone)]
pub struct ThenWith<P1, P2, F, A, B> {
    first: P1,
    second: P2,
    f: F,
    _phantom: PhantomData<fn(A, B)>,
}

impl<P1, P2, F, A, B> ThenWith<P1, P2, F, A, B> {
    pub fn new(first: P1, second: P2, f: F) -> Self {
        Self {
            first,
            second,
            f,
            _phantom: PhantomData,
        }
    }
}

impl<I, A, B, R, P1, P2, F> Parser<I, R> for ThenWith<P1, P2, F, A, B>
where
    I: Token,
    P1: Parser<I, A>,
    P2: Parser<I, B>,
    F: Fn(A, B) -> R,
{
    fn try_parse(
        &self,
        state: &mut ParseState<'_, I>,
        expected: &mut Vec<Expected<I>>,
    ) -> Result<R, Failure<I>> {
        let a = self.first.try_parse(state, expected)?;
        let b = self.second.try_parse(state, expected)?;
        Ok((self.f)(a, b))
    }
}

#[derive(Clone)]
pub struct Delimited<L, P, R, LO, RO> {
    left: L,
    parser: P,
    right: R,
    _phantom: PhantomData<fn(LO, RO)>,
}

impl<L, P, R, LO, RO> Delimited<L, P, R, LO, RO> {
    pub fn new(left: L, parser: P, right: R) -> Self {
        Self {
            left,
            parser,
            right,
            _phantom: PhantomData,
        }
    }
}

impl<I, O, LO, RO, L, P, R> Parser<I, O> for Delimited<L, P, R, LO, RO>
where
    I: Token,
    L: Parser<I, LO>,
    P: Parser<I, O>,
    R: Parser<I, RO>,
{
    fn try_parse(
        &self,
        state: &mut ParseState<'_, I>,
        expected: &mut Vec<Expected<I>>,
    ) -> Result<O, Failure<I>> {
        self.left.try_parse(state, expected)?;
        let value = self.parser.try_parse(state, expected)?;
        self.right.try_parse(state, expected)?;
        Ok(value)
    }
}

#[derive(Clone)]
pub struct Sequence<P> {
    parsers: Vec<P>,
}

impl<P> Sequence<P> {
    pub fn new(parsers: Vec<P>) -> Self {
        Self { parsers }
    }
}

impl<I, O, P> Parser<I, Vec<O>> for Sequence<P>
where
    I: Token,
    P: Parser<I, O>,
{
    fn try_parse(
        &self,
        state: &mut ParseState<'_, I>,
        expected: &mut Vec<Expected<I>>,
    ) -> Result<Vec<O>, Failure<I>> {
        let mut results = Vec::with_capacity(self.parsers.len());
        for parser in &self.parsers {
            results.push(parser.try_parse(state, expected)?);
        }
        Ok(results)
    }
}

macro_rules! tuple_parser {
    ($name:ident, $(($p:ident, $o:ident, $field:ident)),+) => {
        #[derive(Clone)]
        pub struct $name<$($p),+> {
            $($field: $p),+
        }

        impl<$($p),+> $name<$($p),+> {
            #[allow(clippy::too_many_arguments)]
            pub fn new($($field: $p),+) -> Self {
                Self { $($field),+ }
            }
        }

        impl<I: Token, $($p, $o),+> Parser<I, ($($o,)+)> for $name<$($p),+>
        where
            $($p: Parser<I, $o>),+
        {
            fn try_parse(
                &self,
                state: &mut ParseState<'_, I>,
                expected: &mut Vec<Expected<I>>,
            ) -> Result<($($o,)+), Failure<I>> {
                Ok(($(self.$field.try_parse(state, expected)?,)+))
            }
        }
    };
}

tuple_parser!(Tuple2, (P1, O1, parser1), (P2, O2, parser2));
tuple_parser!(Tuple3, (P1, O1, parser1), (P2, O2, parser2), (P3, O3, parser3));
tuple_parser!(
    Tuple4,
    (P1, O1, parser1),
    (P2, O2, parser2),
    (P3, O3, parser3),
    (P4, O4, parser4)
);
tuple_parser!(
    Tuple5,
    (P1, O1, parser1),
    (P2, O2, parser2),
    (P3, O3, parser3),
    (P4, O4, parser4),
    (P5, O5, parser5)
);

// To: replaces the parsed value
#[derive(Clone)]
pub struct To<P, O, A> {
    parser: P,
    value: O,
    _phantom: PhantomData<fn(A)>,
}

impl<P, O, A> To<P, O, A> {
    pub fn new(parser: P, value: O) -> Self {
        Self {
            parser,
            value,
            _phantom: PhantomData,
        }
    }
}

impl<I, O, A, P> Parser<I, O> for To<P, O, A>
where
    I: Token,
    O: Clone,
    P: Parser<I, A>,
{
    fn try_parse(
        &self,
        state: &mut ParseState<'_, I>,
        expected: &mut Vec<Expected<I>>,
    ) -> Result<O, Failure<I>> {
        self.parser.try_parse(state, expected)?;
        Ok(self.value.clone())
    }
}

#[derive(Clone)]
pub struct AsUnit<P, O> {
    parser: P,
    _phantom: PhantomData<fn(O)>,
}

impl<P, O> AsUnit<P, O> {
    pub fn new(parser: P) -> Self {
        Self {
            parser,
            _phantom: PhantomData,
        }
    }
}

impl<I, O, P> Parser<I, ()> for AsUnit<P, O>
where
    I: Token,
    P: Parser<I, O>,
{
    fn try_parse(
        &self,
        state: &mut ParseState<'_, I>,
        expected: &mut Vec<Expected<I>>,
    ) -> Result<(), Failure<I>> {
        self.parser.try_parse(state, expected).map(|_| ())
    }
}

/// Backtracks on failure so the inner parser appears to consume nothing.
#[derive(Clone)]
pub struct Attempt<P> {
    parser: P,
}

impl<P> Attempt<P> {
    pub fn new(parser: P) -> Self {
        Self { parser }
    }
}

impl<I, O, P> Parser<I, O> for Attempt<P>
where
    I: Token,
    P: Parser<I, O>,
{
    fn try_parse(
        &self,
        state: &mut ParseState<'_, I>,
        expected: &mut Vec<Expected<I>>,
    ) -> Result<O, Failure<I>> {
        let bookmark = state.bookmark();
        match self.parser.try_parse(state, expected) {
            Ok(value) => {
                state.discard_bookmark(bookmark);
                Ok(value)
            }
            Err(failure) => {
                state.rewind(bookmark);
                Err(failure)
            }
        }
    }
}

#[derive(Clone)]
pub struct Optional<P> {
    parser: P,
}

impl<P> Optional<P> {
    pub fn new(parser: P) -> Self {
        Self { parser }
    }
}

impl<I, O, P> Parser<I, Option<O>> for Optional<P>
where
    I: Token,
    P: Parser<I, O>,
{
    fn try_parse(
        &self,
        state: &mut ParseState<'_, I>,
        expected: &mut Vec<Expected<I>>,
    ) -> Result<Option<O>, Failure<I>> {
        let mut alternatives = Alternatives::new(state);
        let decided = match alternatives.attempt(&self.parser, state) {
            Some(outcome) => outcome.map(Some),
            None => Ok(None),
        };
        alternatives.finish(state, expected, Some(decided))
    }
}

/// Runs the inner parser, then puts the cursor back where it started.
#[derive(Clone)]
pub struct Lookahead<P> {
    parser: P,
}

impl<P> Lookahead<P> {
    pub fn new(parser: P) -> Self {
        Self { parser }
    }
}

impl<I, O, P> Parser<I, O> for Lookahead<P>
where
    I: Token,
    P: Parser<I, O>,
{
    fn try_parse(
        &self,
        state: &mut ParseState<'_, I>,
        expected: &mut Vec<Expected<I>>,
    ) -> Result<O, Failure<I>> {
        let bookmark = state.bookmark();
        match self.parser.try_parse(state, expected) {
            Ok(value) => {
                state.rewind(bookmark);
                Ok(value)
            }
            Err(failure) => {
                state.discard_bookmark(bookmark);
                Err(failure)
            }
        }
    }
}

/// Succeeds, consuming nothing, exactly when the inner parser fails.
#[derive(Clone)]
pub struct Not<P, O> {
    parser: P,
    _phantom: PhantomData<fn(O)>,
}

impl<P, O> Not<P, O> {
    pub fn new(parser: P) -> Self {
        Self {
            parser,
            _phantom: PhantomData,
        }
    }
}

impl<I, O, P> Parser<I, ()> for Not<P, O>
where
    I: Token,
    P: Parser<I, O>,
{
    fn try_parse(
        &self,
        state: &mut ParseState<'_, I>,
        _expected: &mut Vec<Expected<I>>,
    ) -> Result<(), Failure<I>> {
        let bookmark = state.bookmark();
        let mut scratch = state.rent_expected();
        let result = self.parser.try_parse(state, &mut scratch);
        state.return_expected(scratch);
        state.rewind(bookmark);
        match result {
            Ok(_) => Err(state.unexpected_here(None)),
            Err(_) => Ok(()),
        }
    }
}

/// Replaces the expected set of a failing parser with a single label.
#[derive(Clone)]
pub struct Labelled<P> {
    parser: P,
    label: Arc<str>,
}

impl<P> Labelled<P> {
    pub fn new(parser: P, label: &str) -> Self {
        Self {
            parser,
            label: label.into(),
        }
    }
}

impl<I, O, P> Parser<I, O> for Labelled<P>
where
    I: Token,
    P: Parser<I, O>,
{
    fn try_parse(
        &self,
        state: &mut ParseState<'_, I>,
        expected: &mut Vec<Expected<I>>,
    ) -> Result<O, Failure<I>> {
        let mut scratch = state.rent_expected();
        let result = self.parser.try_parse(state, &mut scratch);
        state.return_expected(scratch);
        if result.is_err() {
            expected.push(Expected::Label(Arc::clone(&self.label)));
        }
        result
    }
}

fn assertion_failure<I: Token>(
    state: &mut ParseState<'_, I>,
    expected: &mut Vec<Expected<I>>,
    message: &str,
) -> Failure<I> {
    expected.push(Expected::label(ASSERTION_FAILED));
    state.unexpected_here(Some(message))
}

// Assert: post-filters a successful value
#[derive(Clone)]
pub struct Assert<P, F> {
    parser: P,
    predicate: F,
    message: Arc<str>,
}

impl<P, F> Assert<P, F> {
    pub fn new(parser: P, predicate: F, message: &str) -> Self {
        Self {
            parser,
            predicate,
            message: message.into(),
        }
    }
}

impl<I, O, P, F> Parser<I, O> for Assert<P, F>
where
    I: Token,
    P: Parser<I, O>,
    F: Fn(&O) -> bool,
{
    fn try_parse(
        &self,
        state: &mut ParseState<'_, I>,
        expected: &mut Vec<Expected<I>>,
    ) -> Result<O, Failure<I>> {
        let value = self.parser.try_parse(state, expected)?;
        if (self.predicate)(&value) {
            Ok(value)
        } else {
            Err(assertion_failure(state, expected, &self.message))
        }
    }
}

// FilterMap: maps a successful value, failing on `None`
#[derive(Clone)]
pub struct FilterMap<P, F, A> {
    parser: P,
    f: F,
    message: Arc<str>,
    _phantom: PhantomData<fn(A)>,
}

impl<P, F, A> FilterMap<P, F, A> {
    pub fn new(parser: P, f: F, message: &str) -> Self {
        Self {
            parser,
            f,
            message: message.into(),
            _phantom: PhantomData,
        }
    }
}

impl<I, A, B, P, F> Parser<I, B> for FilterMap<P, F, A>
where
    I: Token,
    P: Parser<I, A>,
    F: Fn(A) -> Option<B>,
{
    fn try_parse(
        &self,
        state: &mut ParseState<'_, I>,
        expected: &mut Vec<Expected<I>>,
    ) -> Result<B, Failure<I>> {
        let value = self.parser.try_parse(state, expected)?;
        match (self.f)(value) {
            Some(mapped) => Ok(mapped),
            None => Err(assertion_failure(state, expected, &self.message)),
        }
    }
}

/// On failure, hands the built error to `handler` and runs the parser it
/// returns from the current position.
#[derive(Clone)]
pub struct RecoverWith<P, F> {
    parser: P,
    handler: F,
}

impl<P, F> RecoverWith<P, F> {
    pub fn new(parser: P, handler: F) -> Self {
        Self { parser, handler }
    }
}

impl<I, O, P, F, Q> Parser<I, O> for RecoverWith<P, F>
where
    I: Token,
    P: Parser<I, O>,
    F: Fn(ParseError<I>) -> Q,
    Q: Parser<I, O>,
{
    fn try_parse(
        &self,
        state: &mut ParseState<'_, I>,
        expected: &mut Vec<Expected<I>>,
    ) -> Result<O, Failure<I>> {
        let mut scratch = state.rent_expected();
        let result = self.parser.try_parse(state, &mut scratch);
        let outcome = match result {
            Ok(value) => Ok(value),
            Err(failure) => {
                let error = state.build_error(&failure, &scratch);
                debug!(
                    target: "sinew::parser",
                    location = error.location(),
                    "recovering from parse error"
                );
                (self.handler)(error).try_parse(state, expected)
            }
        };
        state.return_expected(scratch);
        outcome
    }
}

#[derive(Clone)]
pub struct Lazy<F> {
    f: F,
}

impl<F> Lazy<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<I, O, F, P> Parser<I, O> for Lazy<F>
where
    I: Token,
    F: Fn() -> P,
    P: Parser<I, O>,
{
    fn try_parse(
        &self,
        state: &mut ParseState<'_, I>,
        expected: &mut Vec<Expected<I>>,
    ) -> Result<O, Failure<I>> {
        (self.f)().try_parse(state, expected)
    }
}
