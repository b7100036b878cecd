use super::alternation::Or;
use super::combinators::{
    AsUnit, Assert, Attempt, Before, Bind, Delimited, FilterMap, Labelled, Lookahead, Map, Not,
    Optional, RecoverWith, Then, ThenWith, To, Tuple2,
};
use super::core::{BoxedParser, Parser};
use super::repeat::{Chain, Chainer, Repeat, SkipChainer, StringChainer, VecChainer};
use super::separated::{SeparatorMode, Separated};
use super::until::{self, ManyThen, SkipThen, SkipUntil, UntilItems};
use crate::error::ParseError;
use crate::token::Token;

pub type Many<P, O> = Chain<P, fn() -> VecChainer<O>, O>;
pub type ManyString<P, O> = Chain<P, fn() -> StringChainer, O>;
pub type SkipMany<P, O> = Chain<P, fn() -> SkipChainer, O>;

fn vec_chainer<O>() -> VecChainer<O> {
    VecChainer::new()
}

/// Chainable combinator methods, available on every [`Parser`].
pub trait ParserExt<I: Token, O>: Parser<I, O> + Sized {
    fn map<B, F>(self, f: F) -> Map<Self, F, O>
    where
        F: Fn(O) -> B,
    {
        Map::new(self, f)
    }

    /// Feeds the parsed value to `f` and runs the parser it returns.
    fn bind<B, Q, F>(self, f: F) -> Bind<Self, F, O>
    where
        F: Fn(O) -> Q,
        Q: Parser<I, B>,
    {
        Bind::new(self, f)
    }

    fn then<B, P>(self, next: P) -> Then<Self, P, O>
    where
        P: Parser<I, B>,
    {
        Then::new(self, next)
    }

    fn before<B, P>(self, next: P) -> Before<Self, P, B>
    where
        P: Parser<I, B>,
    {
        Before::new(self, next)
    }

    fn and<B, P>(self, next: P) -> Tuple2<Self, P>
    where
        P: Parser<I, B>,
    {
        Tuple2::new(self, next)
    }

    fn then_with<B, R, P, F>(self, next: P, f: F) -> ThenWith<Self, P, F, O, B>
    where
        P: Parser<I, B>,
        F: Fn(O, B) -> R,
    {
        ThenWith::new(self, next, f)
    }

    fn between<LO, RO, L, R>(self, left: L, right: R) -> Delimited<L, Self, R, LO, RO>
    where
        L: Parser<I, LO>,
        R: Parser<I, RO>,
    {
        Delimited::new(left, self, right)
    }

    fn to<V: Clone>(self, value: V) -> To<Self, V, O> {
        To::new(self, value)
    }

    fn as_unit(self) -> AsUnit<Self, O> {
        AsUnit::new(self)
    }

    fn or<P>(self, other: P) -> Or<Self, P>
    where
        P: Parser<I, O>,
    {
        Or::new(self, other)
    }

    fn attempt(self) -> Attempt<Self> {
        Attempt::new(self)
    }

    fn optional(self) -> Optional<Self> {
        Optional::new(self)
    }

    fn many(self) -> Many<Self, O> {
        Chain::new(self, vec_chainer::<O> as fn() -> VecChainer<O>, false)
    }

    fn at_least_once(self) -> Many<Self, O> {
        Chain::new(self, vec_chainer::<O> as fn() -> VecChainer<O>, true)
    }

    fn skip_many(self) -> SkipMany<Self, O> {
        Chain::new(self, SkipChainer::default as fn() -> SkipChainer, false)
    }

    fn skip_at_least_once(self) -> SkipMany<Self, O> {
        Chain::new(self, SkipChainer::default as fn() -> SkipChainer, true)
    }

    fn many_string(self) -> ManyString<Self, O>
    where
        StringChainer: Chainer<O>,
    {
        Chain::new(self, StringChainer::new as fn() -> StringChainer, false)
    }

    fn at_least_once_string(self) -> ManyString<Self, O>
    where
        StringChainer: Chainer<O>,
    {
        Chain::new(self, StringChainer::new as fn() -> StringChainer, true)
    }

    /// Zero or more repetitions folded into a fresh chainer from `factory`.
    fn chain_with<C, F>(self, factory: F) -> Chain<Self, F, O>
    where
        F: Fn() -> C,
        C: Chainer<O>,
    {
        Chain::new(self, factory, false)
    }

    fn repeat(self, count: usize) -> Repeat<Self> {
        Repeat::new(self, count)
    }

    fn separated<SO, S>(self, separator: S) -> Separated<Self, S, SO>
    where
        S: Parser<I, SO>,
    {
        Separated::new(self, separator, SeparatorMode::Between, false)
    }

    fn separated_at_least_once<SO, S>(self, separator: S) -> Separated<Self, S, SO>
    where
        S: Parser<I, SO>,
    {
        Separated::new(self, separator, SeparatorMode::Between, true)
    }

    fn separated_and_terminated<SO, S>(self, separator: S) -> Separated<Self, S, SO>
    where
        S: Parser<I, SO>,
    {
        Separated::new(self, separator, SeparatorMode::Terminated, false)
    }

    fn separated_and_terminated_at_least_once<SO, S>(self, separator: S) -> Separated<Self, S, SO>
    where
        S: Parser<I, SO>,
    {
        Separated::new(self, separator, SeparatorMode::Terminated, true)
    }

    fn separated_and_optionally_terminated<SO, S>(self, separator: S) -> Separated<Self, S, SO>
    where
        S: Parser<I, SO>,
    {
        Separated::new(self, separator, SeparatorMode::OptionallyTerminated, false)
    }

    fn separated_and_optionally_terminated_at_least_once<SO, S>(
        self,
        separator: S,
    ) -> Separated<Self, S, SO>
    where
        S: Parser<I, SO>,
    {
        Separated::new(self, separator, SeparatorMode::OptionallyTerminated, true)
    }

    fn until<TO, T>(self, terminator: T) -> UntilItems<Self, T, O, TO>
    where
        T: Parser<I, TO>,
    {
        until::until(self, terminator)
    }

    fn many_then<TO, T>(self, terminator: T) -> ManyThen<Self, T, O>
    where
        T: Parser<I, TO>,
    {
        until::many_then(self, terminator)
    }

    fn at_least_once_until<TO, T>(self, terminator: T) -> UntilItems<Self, T, O, TO>
    where
        T: Parser<I, TO>,
    {
        until::at_least_once_until(self, terminator)
    }

    fn at_least_once_then<TO, T>(self, terminator: T) -> ManyThen<Self, T, O>
    where
        T: Parser<I, TO>,
    {
        until::at_least_once_then(self, terminator)
    }

    fn skip_until<TO, T>(self, terminator: T) -> SkipUntil<Self, T, O, TO>
    where
        T: Parser<I, TO>,
    {
        until::skip_until(self, terminator)
    }

    fn skip_many_then<TO, T>(self, terminator: T) -> SkipThen<Self, T, O, TO>
    where
        T: Parser<I, TO>,
    {
        until::skip_many_then(self, terminator)
    }

    fn skip_at_least_once_until<TO, T>(self, terminator: T) -> SkipUntil<Self, T, O, TO>
    where
        T: Parser<I, TO>,
    {
        until::skip_at_least_once_until(self, terminator)
    }

    fn skip_at_least_once_then<TO, T>(self, terminator: T) -> SkipThen<Self, T, O, TO>
    where
        T: Parser<I, TO>,
    {
        until::skip_at_least_once_then(self, terminator)
    }

    fn lookahead(self) -> Lookahead<Self> {
        Lookahead::new(self)
    }

    fn not(self) -> Not<Self, O> {
        Not::new(self)
    }

    /// Fails with `message` when the parsed value does not satisfy
    /// `predicate`.
    fn assert<F>(self, predicate: F, message: &str) -> Assert<Self, F>
    where
        F: Fn(&O) -> bool,
    {
        Assert::new(self, predicate, message)
    }

    fn filter_map<B, F>(self, f: F, message: &str) -> FilterMap<Self, F, O>
    where
        F: Fn(O) -> Option<B>,
    {
        FilterMap::new(self, f, message)
    }

    fn labelled(self, label: &str) -> Labelled<Self> {
        Labelled::new(self, label)
    }

    fn recover_with<Q, F>(self, handler: F) -> RecoverWith<Self, F>
    where
        F: Fn(ParseError<I>) -> Q,
        Q: Parser<I, O>,
    {
        RecoverWith::new(self, handler)
    }

    fn boxed<'a>(self) -> BoxedParser<'a, I, O>
    where
        Self: Send + Sync + 'a,
    {
        BoxedParser::new(self)
    }
}

impl<I: Token, O, P: Parser<I, O>> ParserExt<I, O> for P {}
