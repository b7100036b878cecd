use std::marker::PhantomData;
use std::sync::Arc;

use super::core::Parser;
use crate::error::Failure;
use crate::expected::Expected;
use crate::position::SourcePos;
use crate::state::ParseState;
use crate::token::Token;

// Equal: succeeds on a token equal to `token`
#[derive(Clone)]
pub struct Equal<I> {
    token: I,
}

impl<I> Equal<I> {
    pub fn new(token: I) -> Self {
        Self { token }
    }
}

impl<I: Token> Parser<I, I> for Equal<I> {
    fn try_parse(
        &self,
        state: &mut ParseState<'_, I>,
        expected: &mut Vec<Expected<I>>,
    ) -> Result<I, Failure<I>> {
        match state.current() {
            Some(token) if *token == self.token => {
                state.advance(1);
                Ok(self.token.clone())
            }
            _ => {
                expected.push(Expected::single(self.token.clone()));
                Err(state.unexpected_here(None))
            }
        }
    }
}

// Satisfy: succeeds on a token the predicate accepts
#[derive(Clone)]
pub struct Satisfy<F> {
    predicate: F,
}

impl<F> Satisfy<F> {
    pub fn new(predicate: F) -> Self {
        Self { predicate }
    }
}

impl<I, F> Parser<I, I> for Satisfy<F>
where
    I: Token,
    F: Fn(&I) -> bool,
{
    fn try_parse(
        &self,
        state: &mut ParseState<'_, I>,
        _expected: &mut Vec<Expected<I>>,
    ) -> Result<I, Failure<I>> {
        match state.current() {
            Some(token) if (self.predicate)(token) => {
                let token = token.clone();
                state.advance(1);
                Ok(token)
            }
            _ => Err(state.unexpected_here(None)),
        }
    }
}

// SatisfyMap: succeeds when `f` maps the token to a value
#[derive(Clone)]
pub struct SatisfyMap<F, O> {
    f: F,
    _phantom: PhantomData<fn() -> O>,
}

impl<F, O> SatisfyMap<F, O> {
    pub fn new(f: F) -> Self {
        Self {
            f,
            _phantom: PhantomData,
        }
    }
}

impl<I, O, F> Parser<I, O> for SatisfyMap<F, O>
where
    I: Token,
    F: Fn(&I) -> Option<O>,
{
    fn try_parse(
        &self,
        state: &mut ParseState<'_, I>,
        _expected: &mut Vec<Expected<I>>,
    ) -> Result<O, Failure<I>> {
        match state.current().and_then(|token| (self.f)(token)) {
            Some(value) => {
                state.advance(1);
                Ok(value)
            }
            None => Err(state.unexpected_here(None)),
        }
    }
}

// Any: any single token
#[derive(Clone, Default)]
pub struct Any;

impl<I: Token> Parser<I, I> for Any {
    fn try_parse(
        &self,
        state: &mut ParseState<'_, I>,
        expected: &mut Vec<Expected<I>>,
    ) -> Result<I, Failure<I>> {
        match state.current().cloned() {
            Some(token) => {
                state.advance(1);
                Ok(token)
            }
            None => {
                expected.push(Expected::label("any token"));
                Err(state.unexpected_here(None))
            }
        }
    }
}

// End: succeeds only at the end of the input
#[derive(Clone, Default)]
pub struct End;

impl<I: Token> Parser<I, ()> for End {
    fn try_parse(
        &self,
        state: &mut ParseState<'_, I>,
        expected: &mut Vec<Expected<I>>,
    ) -> Result<(), Failure<I>> {
        if state.has_current() {
            expected.push(Expected::Eof);
            Err(state.unexpected_here(None))
        } else {
            Ok(())
        }
    }
}

/// Matches `expected` token by token, consuming the matched prefix.
///
/// On a mismatch the cursor stays on the mismatching token and the whole
/// literal is reported as expected.
fn match_sequence<I, E>(
    state: &mut ParseState<'_, I>,
    tokens: &[I],
    eq: E,
) -> Result<(), Failure<I>>
where
    I: Token,
    E: Fn(&I, &I) -> bool,
{
    let window = state.look_ahead(tokens.len());
    let matched = window
        .iter()
        .zip(tokens)
        .take_while(|&(found, wanted)| eq(found, wanted))
        .count();
    state.advance(matched);
    if matched == tokens.len() {
        Ok(())
    } else {
        Err(state.unexpected_here(None))
    }
}

// Literal: a fixed sequence of tokens
#[derive(Clone)]
pub struct Literal<I> {
    tokens: Arc<[I]>,
}

impl<I> Literal<I> {
    pub fn new(tokens: impl Into<Arc<[I]>>) -> Self {
        Self {
            tokens: tokens.into(),
        }
    }
}

impl<I: Token> Parser<I, Vec<I>> for Literal<I> {
    fn try_parse(
        &self,
        state: &mut ParseState<'_, I>,
        expected: &mut Vec<Expected<I>>,
    ) -> Result<Vec<I>, Failure<I>> {
        match match_sequence(state, &self.tokens, |a, b| a == b) {
            Ok(()) => Ok(self.tokens.to_vec()),
            Err(failure) => {
                expected.push(Expected::Tokens(Arc::clone(&self.tokens)));
                Err(failure)
            }
        }
    }
}

// Str: a fixed string, optionally compared without case
#[derive(Clone)]
pub struct Str {
    text: String,
    chars: Arc<[char]>,
    ignore_case: bool,
}

impl Str {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            chars: text.chars().collect::<Vec<_>>().into(),
            ignore_case: false,
        }
    }

    pub fn ignore_case(text: &str) -> Self {
        Self {
            ignore_case: true,
            ..Self::new(text)
        }
    }
}

impl Parser<char, String> for Str {
    fn try_parse(
        &self,
        state: &mut ParseState<'_, char>,
        expected: &mut Vec<Expected<char>>,
    ) -> Result<String, Failure<char>> {
        let result = if self.ignore_case {
            // keep the input's own spelling of the match
            let found: String = state.look_ahead(self.chars.len()).iter().collect();
            match_sequence(state, &self.chars, char::eq_ignore_case).map(|_| found)
        } else {
            match_sequence(state, &self.chars, |a, b| a == b).map(|_| self.text.clone())
        };
        result.map_err(|failure| {
            expected.push(Expected::Tokens(Arc::clone(&self.chars)));
            failure
        })
    }
}

// CiChar: a single character compared without case
#[derive(Clone)]
pub struct CiChar {
    c: char,
}

impl CiChar {
    pub fn new(c: char) -> Self {
        Self { c }
    }
}

impl Parser<char, char> for CiChar {
    fn try_parse(
        &self,
        state: &mut ParseState<'_, char>,
        expected: &mut Vec<Expected<char>>,
    ) -> Result<char, Failure<char>> {
        match state.current().copied() {
            Some(found) if found.eq_ignore_case(&self.c) => {
                state.advance(1);
                Ok(found)
            }
            _ => {
                expected.push(Expected::single(self.c));
                Err(state.unexpected_here(None))
            }
        }
    }
}

// Ret: succeeds with a clone of `value` without consuming
#[derive(Clone)]
pub struct Ret<O> {
    value: O,
}

impl<O> Ret<O> {
    pub fn new(value: O) -> Self {
        Self { value }
    }
}

impl<I: Token, O: Clone> Parser<I, O> for Ret<O> {
    fn try_parse(
        &self,
        _state: &mut ParseState<'_, I>,
        _expected: &mut Vec<Expected<I>>,
    ) -> Result<O, Failure<I>> {
        Ok(self.value.clone())
    }
}

// Fail: always fails with `message`
pub struct Fail<O> {
    message: Arc<str>,
    _phantom: PhantomData<fn() -> O>,
}

impl<O> Fail<O> {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.into(),
            _phantom: PhantomData,
        }
    }
}

impl<O> Clone for Fail<O> {
    fn clone(&self) -> Self {
        Self {
            message: Arc::clone(&self.message),
            _phantom: PhantomData,
        }
    }
}

impl<I: Token, O> Parser<I, O> for Fail<O> {
    fn try_parse(
        &self,
        state: &mut ParseState<'_, I>,
        _expected: &mut Vec<Expected<I>>,
    ) -> Result<O, Failure<I>> {
        Err(Failure::message(state.location(), Arc::clone(&self.message)))
    }
}

#[derive(Clone, Default)]
pub struct CurrentPos;

impl<I: Token> Parser<I, SourcePos> for CurrentPos {
    fn try_parse(
        &self,
        state: &mut ParseState<'_, I>,
        _expected: &mut Vec<Expected<I>>,
    ) -> Result<SourcePos, Failure<I>> {
        Ok(state.source_pos())
    }
}

#[derive(Clone, Default)]
pub struct CurrentLocation;

impl<I: Token> Parser<I, usize> for CurrentLocation {
    fn try_parse(
        &self,
        state: &mut ParseState<'_, I>,
        _expected: &mut Vec<Expected<I>>,
    ) -> Result<usize, Failure<I>> {
        Ok(state.location())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::prelude::*;
    use crate::parser::ParserExt;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_equal() {
        let input = vec![1, 2, 3];

        // 成功するケース
        assert_eq!(equal(1).parse(&input), Ok(1));

        // 失敗するケース
        let error = equal(2).parse(&input).unwrap_err();
        assert_eq!(error.unexpected(), Some(&1));
        assert_eq!(error.expected(), &[Expected::single(2)]);
        assert_eq!(error.location(), 0);
    }

    #[test]
    fn test_satisfy_and_satisfy_map() {
        let even = satisfy(|x: &i32| x % 2 == 0);
        assert_eq!(even.parse(&[4, 5]), Ok(4));
        assert!(even.parse(&[5]).is_err());

        let doubled = satisfy_map(|x: &i32| if *x > 0 { Some(x * 2) } else { None });
        assert_eq!(doubled.parse(&[21]), Ok(42));
        assert!(doubled.parse(&[-1]).unwrap_err().expected().is_empty());
    }

    #[test]
    fn test_any_and_end() {
        assert_eq!(any().parse("z"), Ok('z'));
        let error = any().parse("").unwrap_err();
        assert!(error.is_eof());
        assert_eq!(error.expected(), &[Expected::label("any token")]);

        assert_eq!(end().parse(""), Ok(()));
        let error = end().parse("x").unwrap_err();
        assert_eq!(error.expected(), &[Expected::<char>::Eof]);
        assert_eq!(
            error.to_string(),
            "Parse error.\n    unexpected x\n    expected end of input\n    at line 1, col 1"
        );
    }

    #[test]
    fn test_string_matching() {
        assert_eq!(string("foo").parse_prefix("foo"), Ok(("foo".to_string(), 3)));
        assert_eq!(string("foo").parse_prefix("food"), Ok(("foo".to_string(), 3)));

        let error = string("foo").parse("bar").unwrap_err();
        assert_eq!(error.unexpected(), Some(&'b'));
        assert_eq!(error.location(), 0);

        // the mismatch is reported at its own location
        let error = string("foo").parse("fox").unwrap_err();
        assert_eq!(error.unexpected(), Some(&'x'));
        assert_eq!(error.location(), 2);
        assert_eq!(error.expected().first().map(ToString::to_string), Some("\"foo\"".to_string()));

        let error = string("foo").parse("fo").unwrap_err();
        assert!(error.is_eof());
    }

    #[test]
    fn test_literal_over_tokens() {
        let parser = literal(vec![1u8, 2, 3]);
        assert_eq!(parser.parse(&[1u8, 2, 3, 4]), Ok(vec![1, 2, 3]));
        let error = parser.parse(&[1u8, 9]).unwrap_err();
        assert_eq!(error.location(), 1);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(ci_string("select").parse("SeLeCt *"), Ok("SeLeCt".to_string()));
        assert!(ci_string("select").parse("selec").is_err());
        assert_eq!(ci_char('q').parse("Q"), Ok('Q'));
    }

    #[test]
    fn test_ret_fail_and_positions() {
        assert_eq!(ret(7).parse("abc"), Ok(7));

        let error = fail::<()>("nope").parse("abc").unwrap_err();
        assert_eq!(error.message(), Some("nope"));
        assert_eq!(error.unexpected(), None);

        let parser = string("ab\nc").then(current_pos()).and(current_location());
        assert_eq!(parser.parse("ab\ncd"), Ok((SourcePos::new(2, 2), 4)));
    }
}
