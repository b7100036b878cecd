use std::marker::PhantomData;
use std::sync::Arc;

use super::core::{BoxedParser, Parser};
use crate::error::Failure;
use crate::expected::{merge_expected, Expected};
use crate::state::ParseState;
use crate::token::Token;

/// Bookkeeping for trying several parsers from one start location.
///
/// A parser that fails after consuming input decides the whole alternation.
/// Parsers failing without consuming add their expected entries to a running
/// union; the failure kept for reporting is the first one, replaced only by
/// a later failure at a strictly greater location.
pub(crate) struct Alternatives<I> {
    start: usize,
    failure: Option<Failure<I>>,
    expected: Vec<Expected<I>>,
}

impl<I: Token> Alternatives<I> {
    pub(crate) fn new(state: &mut ParseState<'_, I>) -> Self {
        Self {
            start: state.location(),
            failure: None,
            expected: state.rent_expected(),
        }
    }

    /// Runs one alternative. `None` means it failed without consuming input
    /// and the next alternative may be tried.
    pub(crate) fn attempt<O, P>(
        &mut self,
        parser: &P,
        state: &mut ParseState<'_, I>,
    ) -> Option<Result<O, Failure<I>>>
    where
        P: Parser<I, O> + ?Sized,
    {
        let mut scratch = state.rent_expected();
        let outcome = match parser.try_parse(state, &mut scratch) {
            Ok(value) => Some(Ok(value)),
            Err(failure) if state.location() != self.start => {
                self.expected.clear();
                self.expected.append(&mut scratch);
                Some(Err(failure))
            }
            Err(failure) => {
                merge_expected(&mut self.expected, &scratch);
                self.record(failure);
                None
            }
        };
        state.return_expected(scratch);
        outcome
    }

    fn record(&mut self, failure: Failure<I>) {
        match &self.failure {
            Some(kept) if failure.location <= kept.location => {}
            _ => self.failure = Some(failure),
        }
    }

    /// Settles the alternation. `decided` is the outcome of the alternative
    /// that ended it, or `None` when every alternative was exhausted.
    pub(crate) fn finish<O>(
        mut self,
        state: &mut ParseState<'_, I>,
        expected: &mut Vec<Expected<I>>,
        decided: Option<Result<O, Failure<I>>>,
    ) -> Result<O, Failure<I>> {
        let result = match decided {
            Some(Ok(value)) => Ok(value),
            Some(Err(failure)) => {
                expected.append(&mut self.expected);
                Err(failure)
            }
            None => {
                expected.append(&mut self.expected);
                match self.failure.take() {
                    Some(failure) => Err(failure),
                    None => Err(state.unexpected_here(None)),
                }
            }
        };
        state.return_expected(self.expected);
        result
    }
}

#[derive(Clone)]
pub struct Or<P1, P2> {
    first: P1,
    second: P2,
}

impl<P1, P2> Or<P1, P2> {
    pub fn new(first: P1, second: P2) -> Self {
        Self { first, second }
    }
}

impl<I, O, P1, P2> Parser<I, O> for Or<P1, P2>
where
    I: Token,
    P1: Parser<I, O>,
    P2: Parser<I, O>,
{
    fn try_parse(
        &self,
        state: &mut ParseState<'_, I>,
        expected: &mut Vec<Expected<I>>,
    ) -> Result<O, Failure<I>> {
        let mut alternatives = Alternatives::new(state);
        let decided = match alternatives.attempt(&self.first, state) {
            Some(outcome) => Some(outcome),
            None => alternatives.attempt(&self.second, state),
        };
        alternatives.finish(state, expected, decided)
    }
}

/// Tries each branch in order with the semantics of [`Or`].
pub struct OneOf<'a, I: Token, O> {
    branches: Arc<[BoxedParser<'a, I, O>]>,
    _phantom: PhantomData<fn(&I) -> O>,
}

impl<'a, I: Token, O> OneOf<'a, I, O> {
    /// Branches that are themselves `one_of` parsers are spliced in place.
    pub fn new<T>(branches: T) -> Self
    where
        T: IntoIterator<Item = BoxedParser<'a, I, O>>,
    {
        let mut flat = Vec::new();
        for branch in branches {
            match &branch.branches {
                Some(nested) => flat.extend(nested.iter().cloned()),
                None => flat.push(branch),
            }
        }
        Self {
            branches: flat.into(),
            _phantom: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.branches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    /// Erases the type while remembering the branches for later flattening.
    pub fn into_boxed(self) -> BoxedParser<'a, I, O>
    where
        I: 'a,
        O: 'a,
    {
        let branches = Arc::clone(&self.branches);
        BoxedParser::with_branches(self, branches)
    }
}

impl<I: Token, O> Clone for OneOf<'_, I, O> {
    fn clone(&self) -> Self {
        Self {
            branches: Arc::clone(&self.branches),
            _phantom: PhantomData,
        }
    }
}

impl<I: Token, O> Parser<I, O> for OneOf<'_, I, O> {
    fn try_parse(
        &self,
        state: &mut ParseState<'_, I>,
        expected: &mut Vec<Expected<I>>,
    ) -> Result<O, Failure<I>> {
        let mut alternatives = Alternatives::new(state);
        let mut decided = None;
        for branch in self.branches.iter() {
            decided = alternatives.attempt(branch, state);
            if decided.is_some() {
                break;
            }
        }
        alternatives.finish(state, expected, decided)
    }
}
