//! Order-insensitive parsing of a fixed set of parsers.
//!
//! Each round tries the entries not matched yet, in the order they were
//! added, with the semantics of `one_of`: an entry failing without consuming
//! input passes the turn to the next one, an entry failing after consuming
//! input ends the parse. When no remaining entry applies, optional entries
//! take their defaults; a required entry left over is a failure.

use std::any::Any;
use std::sync::Arc;

use tracing::trace;

use crate::error::Failure;
use crate::expected::Expected;
use crate::parser::{no_progress, Alternatives, BoxedParser, Parser, ParserExt};
use crate::state::ParseState;
use crate::token::Token;

type Value = Box<dyn Any>;
type DefaultFn<'a> = Arc<dyn Fn() -> Value + Send + Sync + 'a>;
type Assemble<'a, T> = Arc<dyn Fn(&mut Vec<Value>) -> T + Send + Sync + 'a>;

fn erase<O: 'static>(value: O) -> Value {
    Box::new(value)
}

struct Entry<'a, I: Token> {
    parser: BoxedParser<'a, I, Value>,
    default: Option<DefaultFn<'a>>,
}

/// Builder for a [`Permutation`].
///
/// ```
/// use sinew::parser::prelude::*;
///
/// let flags = PermutationParser::new()
///     .add(equal('a'))
///     .add_optional(equal('b'), '-')
///     .add(equal('c'))
///     .build();
/// assert_eq!(flags.parse("cba"), Ok(((((), 'a'), 'b'), 'c')));
/// assert_eq!(flags.parse("ca"), Ok(((((), 'a'), '-'), 'c')));
/// ```
pub struct PermutationParser<'a, I: Token, T> {
    entries: Vec<Entry<'a, I>>,
    assemble: Assemble<'a, T>,
}

impl<'a, I: Token + 'a> PermutationParser<'a, I, ()> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            assemble: Arc::new(|_: &mut Vec<Value>| ()),
        }
    }
}

impl<'a, I: Token + 'a> Default for PermutationParser<'a, I, ()> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, I: Token + 'a, T: 'a> PermutationParser<'a, I, T> {
    fn push<O, P>(self, parser: P, default: Option<DefaultFn<'a>>) -> PermutationParser<'a, I, (T, O)>
    where
        O: 'static,
        P: Parser<I, O> + Send + Sync + 'a,
    {
        let Self {
            mut entries,
            assemble: previous,
        } = self;
        entries.push(Entry {
            parser: parser.map(erase::<O> as fn(O) -> Value).boxed(),
            default,
        });
        let assemble: Assemble<'a, (T, O)> = Arc::new(move |values: &mut Vec<Value>| {
            // the last entry's value sits at the end of the list
            let value = match values.pop().map(|value| value.downcast::<O>()) {
                Some(Ok(value)) => *value,
                _ => unreachable!("permutation values out of step with their entries"),
            };
            (previous(values), value)
        });
        PermutationParser { entries, assemble }
    }

    /// Adds a required entry.
    pub fn add<O, P>(self, parser: P) -> PermutationParser<'a, I, (T, O)>
    where
        O: 'static,
        P: Parser<I, O> + Send + Sync + 'a,
    {
        self.push(parser, None)
    }

    /// Adds an entry that yields a clone of `default` when absent.
    pub fn add_optional<O, P>(self, parser: P, default: O) -> PermutationParser<'a, I, (T, O)>
    where
        O: Clone + Send + Sync + 'static,
        P: Parser<I, O> + Send + Sync + 'a,
    {
        let default: DefaultFn<'a> = Arc::new(move || erase(default.clone()));
        self.push(parser, Some(default))
    }

    /// Adds an entry that yields `factory()` when absent.
    pub fn add_optional_with<O, P, F>(self, parser: P, factory: F) -> PermutationParser<'a, I, (T, O)>
    where
        O: 'static,
        P: Parser<I, O> + Send + Sync + 'a,
        F: Fn() -> O + Send + Sync + 'a,
    {
        let default: DefaultFn<'a> = Arc::new(move || erase(factory()));
        self.push(parser, Some(default))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn build(self) -> Permutation<'a, I, T> {
        Permutation {
            entries: self.entries.into(),
            assemble: self.assemble,
        }
    }
}

/// The parser built by [`PermutationParser::build`].
///
/// Yields a left-nested tuple in the order the entries were added, whatever
/// order they appeared in the input.
pub struct Permutation<'a, I: Token, T> {
    entries: Arc<[Entry<'a, I>]>,
    assemble: Assemble<'a, T>,
}

impl<I: Token, T> Clone for Permutation<'_, I, T> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            assemble: Arc::clone(&self.assemble),
        }
    }
}

impl<I: Token, T> Permutation<'_, I, T> {
    /// Runs one round. `Ok(false)` means no remaining entry applied.
    fn step(
        &self,
        slots: &mut [Option<Value>],
        state: &mut ParseState<'_, I>,
        expected: &mut Vec<Expected<I>>,
    ) -> Result<bool, Failure<I>> {
        let start = state.location();
        let mut alternatives = Alternatives::new(state);
        for (index, entry) in self.entries.iter().enumerate() {
            if slots[index].is_some() {
                continue;
            }
            let Some(outcome) = alternatives.attempt(&entry.parser, state) else {
                continue;
            };
            let value = alternatives.finish(state, expected, Some(outcome))?;
            if state.location() == start {
                no_progress("permutation", start);
            }
            trace!(target: "sinew::parser", entry = index, location = start, "permutation entry matched");
            slots[index] = Some(value);
            return Ok(true);
        }

        let required_left = self
            .entries
            .iter()
            .zip(slots.iter())
            .any(|(entry, slot)| slot.is_none() && entry.default.is_none());
        if required_left {
            alternatives.finish(state, expected, None)
        } else {
            alternatives.finish(state, expected, Some(Ok(false)))
        }
    }
}

impl<I: Token, T> Parser<I, T> for Permutation<'_, I, T> {
    fn try_parse(
        &self,
        state: &mut ParseState<'_, I>,
        expected: &mut Vec<Expected<I>>,
    ) -> Result<T, Failure<I>> {
        let mut slots: Vec<Option<Value>> = self.entries.iter().map(|_| None).collect();
        while slots.iter().any(Option::is_none) {
            if !self.step(&mut slots, state, expected)? {
                break;
            }
        }

        let mut values = Vec::with_capacity(slots.len());
        for (entry, slot) in self.entries.iter().zip(slots) {
            match (slot, &entry.default) {
                (Some(value), _) => values.push(value),
                (None, Some(default)) => values.push(default()),
                (None, None) => unreachable!("required permutation entry left unmatched"),
            }
        }
        Ok((self.assemble)(&mut values))
    }
}
