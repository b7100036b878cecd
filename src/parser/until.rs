//! Repetition ended by a terminator.
//!
//! Each round tries the terminator first and the item second, with the
//! alternation rules of `or`: a terminator that fails after consuming input
//! ends the parse with its failure, and when both fail without consuming the
//! failure carries the union of their expected sets.

use std::marker::PhantomData;

use super::alternation::Alternatives;
use super::combinators::Map;
use super::core::Parser;
use super::repeat::{no_progress, Chainer, SkipChainer, VecChainer};
use crate::error::Failure;
use crate::expected::Expected;
use crate::state::ParseState;
use crate::token::Token;

/// Repeats `item` until `terminator` succeeds, yielding the chained items
/// and the terminator's value.
#[derive(Clone)]
pub struct Until<P, T, F, PO> {
    item: P,
    terminator: T,
    factory: F,
    at_least_once: bool,
    _phantom: PhantomData<fn(PO)>,
}

impl<P, T, F, PO> Until<P, T, F, PO> {
    pub fn new(item: P, terminator: T, factory: F, at_least_once: bool) -> Self {
        Self {
            item,
            terminator,
            factory,
            at_least_once,
            _phantom: PhantomData,
        }
    }
}

impl<I, PO, TO, P, T, F, C> Parser<I, (C::Output, TO)> for Until<P, T, F, PO>
where
    I: Token,
    P: Parser<I, PO>,
    T: Parser<I, TO>,
    F: Fn() -> C,
    C: Chainer<PO>,
{
    fn try_parse(
        &self,
        state: &mut ParseState<'_, I>,
        expected: &mut Vec<Expected<I>>,
    ) -> Result<(C::Output, TO), Failure<I>> {
        let mut chainer = (self.factory)();
        if self.at_least_once {
            match self.item.try_parse(state, expected) {
                Ok(value) => chainer.apply(value),
                Err(failure) => {
                    chainer.on_error();
                    return Err(failure);
                }
            }
        }
        loop {
            let start = state.location();
            let mut alternatives = Alternatives::new(state);
            if let Some(outcome) = alternatives.attempt(&self.terminator, state) {
                return match alternatives.finish(state, expected, Some(outcome)) {
                    Ok(end) => Ok((chainer.result(), end)),
                    Err(failure) => {
                        chainer.on_error();
                        Err(failure)
                    }
                };
            }
            let decided = alternatives.attempt(&self.item, state);
            match alternatives.finish(state, expected, decided) {
                Ok(value) => {
                    if state.location() == start {
                        no_progress("until", start);
                    }
                    chainer.apply(value);
                }
                Err(failure) => {
                    chainer.on_error();
                    return Err(failure);
                }
            }
        }
    }
}

pub type Collect<O> = fn() -> VecChainer<O>;
pub type Skip = fn() -> SkipChainer;

/// `until` and `at_least_once_until`: the items, terminator dropped.
pub type UntilItems<P, T, O, TO> =
    Map<Until<P, T, Collect<O>, O>, fn((Vec<O>, TO)) -> Vec<O>, (Vec<O>, TO)>;
/// `many_then` and `at_least_once_then`: the items and the terminator.
pub type ManyThen<P, T, O> = Until<P, T, Collect<O>, O>;
pub type SkipUntil<P, T, O, TO> = Map<Until<P, T, Skip, O>, fn(((), TO)), ((), TO)>;
pub type SkipThen<P, T, O, TO> = Map<Until<P, T, Skip, O>, fn(((), TO)) -> TO, ((), TO)>;

fn collect<O>() -> VecChainer<O> {
    VecChainer::new()
}

fn skip() -> SkipChainer {
    SkipChainer
}

fn keep_items<A, B>((items, _): (A, B)) -> A {
    items
}

fn keep_end<A, B>((_, end): (A, B)) -> B {
    end
}

fn drop_end<B>(_: ((), B)) {}

fn engine<P, T, O>(item: P, terminator: T, at_least_once: bool) -> ManyThen<P, T, O> {
    Until::new(item, terminator, collect::<O> as Collect<O>, at_least_once)
}

fn skip_engine<P, T, O>(item: P, terminator: T, at_least_once: bool) -> Until<P, T, Skip, O> {
    Until::new(item, terminator, skip as Skip, at_least_once)
}

pub fn until<P, T, O, TO>(item: P, terminator: T) -> UntilItems<P, T, O, TO> {
    Map::new(engine(item, terminator, false), keep_items as fn((Vec<O>, TO)) -> Vec<O>)
}

pub fn many_then<P, T, O>(item: P, terminator: T) -> ManyThen<P, T, O> {
    engine(item, terminator, false)
}

pub fn at_least_once_until<P, T, O, TO>(item: P, terminator: T) -> UntilItems<P, T, O, TO> {
    Map::new(engine(item, terminator, true), keep_items as fn((Vec<O>, TO)) -> Vec<O>)
}

pub fn at_least_once_then<P, T, O>(item: P, terminator: T) -> ManyThen<P, T, O> {
    engine(item, terminator, true)
}

pub fn skip_until<P, T, O, TO>(item: P, terminator: T) -> SkipUntil<P, T, O, TO> {
    Map::new(skip_engine(item, terminator, false), drop_end as fn(((), TO)))
}

pub fn skip_many_then<P, T, O, TO>(item: P, terminator: T) -> SkipThen<P, T, O, TO> {
    Map::new(skip_engine(item, terminator, false), keep_end as fn(((), TO)) -> TO)
}

pub fn skip_at_least_once_until<P, T, O, TO>(item: P, terminator: T) -> SkipUntil<P, T, O, TO> {
    Map::new(skip_engine(item, terminator, true), drop_end as fn(((), TO)))
}

pub fn skip_at_least_once_then<P, T, O, TO>(item: P, terminator: T) -> SkipThen<P, T, O, TO> {
    Map::new(skip_engine(item, terminator, true), keep_end as fn(((), TO)) -> TO)
}
