//! Everything needed to write a grammar: the parser traits, the primitive
//! parsers, the free-function form of the combinators and the text helpers.

use std::sync::Arc;

pub use super::alternation::OneOf;
pub use super::core::{BoxedParser, Parser};
pub use super::ext::ParserExt;
pub use super::recursive::{recursive, Recursive, RecursiveRef};
pub use super::text::{
    any_char_except, dec_num, digit, end_of_line, letter, letter_or_digit, skip_whitespaces,
    whitespace, whitespaces,
};
pub use super::until::{
    at_least_once_then, at_least_once_until, many_then, skip_at_least_once_then,
    skip_at_least_once_until, skip_many_then, skip_until, until,
};
pub use crate::expression::{expression, expression_with, Operator};
pub use crate::permutation::PermutationParser;

use super::combinators::{
    AsUnit, Attempt, Delimited, Lazy, Lookahead, Map, Not, Optional, Sequence, Then, Tuple2,
    Tuple3, Tuple4, Tuple5,
};
use super::ext::Many;
use super::primitives::{
    Any, CiChar, CurrentLocation, CurrentPos, End, Equal, Fail, Literal, Ret, Satisfy, SatisfyMap,
    Str,
};
use super::repeat::{Chain, VecChainer};
use crate::token::Token;

pub fn equal<I: Token>(token: I) -> Equal<I> {
    Equal::new(token)
}

pub fn satisfy<I, F>(predicate: F) -> Satisfy<F>
where
    F: Fn(&I) -> bool,
{
    Satisfy::new(predicate)
}

pub fn satisfy_map<I, O, F>(f: F) -> SatisfyMap<F, O>
where
    F: Fn(&I) -> Option<O>,
{
    SatisfyMap::new(f)
}

/// Any single token; fails only at the end of input.
pub fn any() -> Any {
    Any
}

pub fn end() -> End {
    End
}

pub fn literal<I: Token>(tokens: impl Into<Arc<[I]>>) -> Literal<I> {
    Literal::new(tokens)
}

pub fn string(text: &str) -> Str {
    Str::new(text)
}

/// Matches `text` ignoring case, yielding the input's spelling.
pub fn ci_string(text: &str) -> Str {
    Str::ignore_case(text)
}

pub fn ci_char(c: char) -> CiChar {
    CiChar::new(c)
}

pub fn ret<O: Clone>(value: O) -> Ret<O> {
    Ret::new(value)
}

pub fn fail<O>(message: &str) -> Fail<O> {
    Fail::new(message)
}

pub fn current_pos() -> CurrentPos {
    CurrentPos
}

pub fn current_location() -> CurrentLocation {
    CurrentLocation
}

pub fn map<A, B, P, F>(parser: P, f: F) -> Map<P, F, A>
where
    F: Fn(A) -> B,
{
    Map::new(parser, f)
}

pub fn as_unit<P, O>(parser: P) -> AsUnit<P, O> {
    AsUnit::new(parser)
}

/// Runs `first` then `second`, keeping the value of `second`.
pub fn preceded<P1, P2, A>(first: P1, second: P2) -> Then<P1, P2, A> {
    Then::new(first, second)
}

pub fn delimited<L, P, R, LO, RO>(left: L, parser: P, right: R) -> Delimited<L, P, R, LO, RO> {
    Delimited::new(left, parser, right)
}

pub fn sequence<P>(parsers: Vec<P>) -> Sequence<P> {
    Sequence::new(parsers)
}

pub fn tuple2<P1, P2>(parser1: P1, parser2: P2) -> Tuple2<P1, P2> {
    Tuple2::new(parser1, parser2)
}

pub fn tuple3<P1, P2, P3>(parser1: P1, parser2: P2, parser3: P3) -> Tuple3<P1, P2, P3> {
    Tuple3::new(parser1, parser2, parser3)
}

pub fn tuple4<P1, P2, P3, P4>(
    parser1: P1,
    parser2: P2,
    parser3: P3,
    parser4: P4,
) -> Tuple4<P1, P2, P3, P4> {
    Tuple4::new(parser1, parser2, parser3, parser4)
}

pub fn tuple5<P1, P2, P3, P4, P5>(
    parser1: P1,
    parser2: P2,
    parser3: P3,
    parser4: P4,
    parser5: P5,
) -> Tuple5<P1, P2, P3, P4, P5> {
    Tuple5::new(parser1, parser2, parser3, parser4, parser5)
}

/// Tries `branches` in order; see [`OneOf`].
pub fn one_of<'a, I, O, T>(branches: T) -> OneOf<'a, I, O>
where
    I: Token,
    T: IntoIterator<Item = BoxedParser<'a, I, O>>,
{
    OneOf::new(branches)
}

pub fn choice<'a, I, O, T>(branches: T) -> OneOf<'a, I, O>
where
    I: Token,
    T: IntoIterator<Item = BoxedParser<'a, I, O>>,
{
    OneOf::new(branches)
}

pub fn attempt<P>(parser: P) -> Attempt<P> {
    Attempt::new(parser)
}

pub fn optional<P>(parser: P) -> Optional<P> {
    Optional::new(parser)
}

pub fn many<P, O>(parser: P) -> Many<P, O> {
    Chain::new(parser, VecChainer::<O>::new as fn() -> VecChainer<O>, false)
}

pub fn lookahead<P>(parser: P) -> Lookahead<P> {
    Lookahead::new(parser)
}

pub fn not<P, O>(parser: P) -> Not<P, O> {
    Not::new(parser)
}

/// Defers building a parser until it runs.
pub fn lazy<F>(f: F) -> Lazy<F> {
    Lazy::new(f)
}
