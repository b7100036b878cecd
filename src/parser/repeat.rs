//! Repetition: one engine parameterised by a [`Chainer`].

use std::marker::PhantomData;

use tracing::error;

use super::core::Parser;
use crate::error::Failure;
use crate::expected::Expected;
use crate::state::ParseState;
use crate::token::Token;

/// Accumulates the values of a repetition.
///
/// `many` collects into a `Vec`, `many_string` into a `String` and the
/// `skip_*` family into nothing; user chainers can fold into anything else
/// through [`chain_with`](crate::parser::ParserExt::chain_with).
pub trait Chainer<T> {
    type Output;

    fn apply(&mut self, value: T);

    fn result(self) -> Self::Output;

    /// Called instead of [`result`](Self::result) when the repetition fails.
    fn on_error(self)
    where
        Self: Sized,
    {
    }
}

#[derive(Debug)]
pub struct VecChainer<T> {
    items: Vec<T>,
}

impl<T> VecChainer<T> {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> Default for VecChainer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Chainer<T> for VecChainer<T> {
    type Output = Vec<T>;

    fn apply(&mut self, value: T) {
        self.items.push(value);
    }

    fn result(self) -> Vec<T> {
        self.items
    }
}

#[derive(Debug, Default)]
pub struct StringChainer {
    text: String,
}

impl StringChainer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Chainer<char> for StringChainer {
    type Output = String;

    fn apply(&mut self, value: char) {
        self.text.push(value);
    }

    fn result(self) -> String {
        self.text
    }
}

impl Chainer<String> for StringChainer {
    type Output = String;

    fn apply(&mut self, value: String) {
        self.text.push_str(&value);
    }

    fn result(self) -> String {
        self.text
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SkipChainer;

impl<T> Chainer<T> for SkipChainer {
    type Output = ();

    fn apply(&mut self, _value: T) {}

    fn result(self) {}
}

/// Aborts on a repetition whose body succeeded without consuming input.
///
/// Such a grammar would loop forever; it is a bug in the grammar rather than
/// in the input, so it is not reported as a parse error.
pub(crate) fn no_progress(combinator: &str, location: usize) -> ! {
    error!(
        target: "sinew::parser",
        combinator,
        location,
        "grammar contract violation: repeated parser consumed no input"
    );
    panic!(
        "{} applied to a parser that succeeded without consuming input at location {}",
        combinator, location
    )
}

/// Runs `step` until it fails without consuming input.
///
/// Each success goes to `sink`. A failure after consuming input is returned
/// with its expected entries; a success that consumed nothing panics.
pub(crate) fn repeat_while<'s, I, O>(
    state: &mut ParseState<'s, I>,
    expected: &mut Vec<Expected<I>>,
    combinator: &str,
    mut step: impl FnMut(&mut ParseState<'s, I>, &mut Vec<Expected<I>>) -> Result<O, Failure<I>>,
    mut sink: impl FnMut(O),
) -> Result<(), Failure<I>>
where
    I: Token,
{
    loop {
        let start = state.location();
        let mut scratch = state.rent_expected();
        let result = step(state, &mut scratch);
        let consumed = state.location() != start;
        match result {
            Ok(value) => {
                state.return_expected(scratch);
                if !consumed {
                    no_progress(combinator, start);
                }
                sink(value);
            }
            Err(failure) if consumed => {
                expected.append(&mut scratch);
                state.return_expected(scratch);
                return Err(failure);
            }
            Err(_) => {
                state.return_expected(scratch);
                return Ok(());
            }
        }
    }
}

/// Applies a parser repeatedly, feeding each value to a fresh chainer.
#[derive(Clone)]
pub struct Chain<P, F, T> {
    parser: P,
    factory: F,
    at_least_once: bool,
    _phantom: PhantomData<fn(T)>,
}

impl<P, F, T> Chain<P, F, T> {
    pub fn new(parser: P, factory: F, at_least_once: bool) -> Self {
        Self {
            parser,
            factory,
            at_least_once,
            _phantom: PhantomData,
        }
    }
}

impl<I, T, P, F, C> Parser<I, C::Output> for Chain<P, F, T>
where
    I: Token,
    P: Parser<I, T>,
    F: Fn() -> C,
    C: Chainer<T>,
{
    fn try_parse(
        &self,
        state: &mut ParseState<'_, I>,
        expected: &mut Vec<Expected<I>>,
    ) -> Result<C::Output, Failure<I>> {
        let mut chainer = (self.factory)();
        if self.at_least_once {
            match self.parser.try_parse(state, expected) {
                Ok(value) => chainer.apply(value),
                Err(failure) => {
                    chainer.on_error();
                    return Err(failure);
                }
            }
        }
        let name = if self.at_least_once { "at_least_once" } else { "many" };
        let outcome = repeat_while(
            state,
            expected,
            name,
            |state, expected| self.parser.try_parse(state, expected),
            |value| chainer.apply(value),
        );
        match outcome {
            Ok(()) => Ok(chainer.result()),
            Err(failure) => {
                chainer.on_error();
                Err(failure)
            }
        }
    }
}

/// Applies a parser exactly `count` times.
#[derive(Clone)]
pub struct Repeat<P> {
    parser: P,
    count: usize,
}

impl<P> Repeat<P> {
    pub fn new(parser: P, count: usize) -> Self {
        Self { parser, count }
    }
}

impl<I, O, P> Parser<I, Vec<O>> for Repeat<P>
where
    I: Token,
    P: Parser<I, O>,
{
    fn try_parse(
        &self,
        state: &mut ParseState<'_, I>,
        expected: &mut Vec<Expected<I>>,
    ) -> Result<Vec<O>, Failure<I>> {
        let mut results = Vec::with_capacity(self.count);
        for _ in 0..self.count {
            results.push(self.parser.try_parse(state, expected)?);
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::prelude::*;
    use crate::parser::ParserExt;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_many() {
        let parser = digit().many();
        assert_eq!(parser.parse("123a"), Ok(vec!['1', '2', '3']));
        assert_eq!(parser.parse("a"), Ok(vec![]));
        assert_eq!(parser.parse(""), Ok(vec![]));
    }

    #[test]
    fn test_at_least_once() {
        let parser = digit().at_least_once();
        assert_eq!(parser.parse("42"), Ok(vec!['4', '2']));
        let error = parser.parse("x").unwrap_err();
        assert_eq!(error.expected(), &[Expected::label("digit")]);
    }

    #[test]
    fn test_many_propagates_consuming_failure() {
        let parser = string("ab").many();
        let error = parser.parse("ababac").unwrap_err();
        assert_eq!(error.location(), 5);
        assert_eq!(error.unexpected(), Some(&'c'));
    }

    #[test]
    fn test_skip_and_string_variants() {
        assert_eq!(whitespace().skip_many().then(letter()).parse("   x"), Ok('x'));
        assert!(whitespace().skip_at_least_once().parse("x").is_err());
        assert_eq!(letter().many_string().parse("abc1"), Ok("abc".to_string()));
        assert_eq!(letter().at_least_once_string().parse("z"), Ok("z".to_string()));
        assert!(letter().at_least_once_string().parse("1").is_err());
    }

    struct Summer(i64);

    impl Chainer<i64> for Summer {
        type Output = i64;

        fn apply(&mut self, value: i64) {
            self.0 += value;
        }

        fn result(self) -> i64 {
            self.0
        }
    }

    #[test]
    fn test_chain_with_custom_chainer() {
        let parser = dec_num().before(equal(',').optional()).chain_with(|| Summer(0));
        assert_eq!(parser.parse("1,2,3"), Ok(6));
    }

    #[test]
    fn test_repeat_exact() {
        assert_eq!(ParserExt::<char, char>::repeat(any(), 2).parse("abc"), Ok(vec!['a', 'b']));
        assert!(ParserExt::<char, char>::repeat(any(), 4).parse("abc").unwrap_err().is_eof());
        assert_eq!(letter().repeat(0).parse(""), Ok(vec![]));
    }

    #[test]
    #[should_panic(expected = "without consuming input")]
    fn test_zero_consumption_panics() {
        let _ = ParserExt::<char, i32>::many(ret(1)).parse("");
    }
}
