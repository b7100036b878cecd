//! Self-referential grammars.
//!
//! `recursive` hands the grammar a weak handle to itself, so the finished
//! parser does not keep itself alive through a reference cycle.

use std::sync::{Arc, OnceLock, Weak};

use super::core::{BoxedParser, Parser};
use crate::error::Failure;
use crate::expected::Expected;
use crate::state::ParseState;
use crate::token::Token;

type Slot<'a, I, O> = OnceLock<BoxedParser<'a, I, O>>;

/// Owning handle to a parser built by [`recursive`].
pub struct Recursive<'a, I: Token, O> {
    slot: Arc<Slot<'a, I, O>>,
}

impl<I: Token, O> Clone for Recursive<'_, I, O> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

/// The handle a recursive grammar uses to refer to itself.
pub struct RecursiveRef<'a, I: Token, O> {
    slot: Weak<Slot<'a, I, O>>,
}

impl<I: Token, O> Clone for RecursiveRef<'_, I, O> {
    fn clone(&self) -> Self {
        Self {
            slot: Weak::clone(&self.slot),
        }
    }
}

/// Builds a parser that may refer to itself through the handle passed to
/// `build`.
///
/// # Panics
///
/// The handle panics if it is run while `build` is still executing, or after
/// every [`Recursive`] returned for it has been dropped.
pub fn recursive<'a, I, O, F, P>(build: F) -> Recursive<'a, I, O>
where
    I: Token,
    F: FnOnce(RecursiveRef<'a, I, O>) -> P,
    P: Parser<I, O> + Send + Sync + 'a,
{
    let slot: Arc<Slot<'a, I, O>> = Arc::new(OnceLock::new());
    let parser = build(RecursiveRef {
        slot: Arc::downgrade(&slot),
    });
    // the slot was created empty above, so this always stores
    let _ = slot.set(BoxedParser::new(parser));
    Recursive { slot }
}

fn defined<'s, 'a, I: Token, O>(slot: &'s Slot<'a, I, O>) -> &'s BoxedParser<'a, I, O> {
    match slot.get() {
        Some(parser) => parser,
        None => panic!("recursive parser was run before its definition completed"),
    }
}

impl<I: Token, O> Parser<I, O> for Recursive<'_, I, O> {
    fn try_parse(
        &self,
        state: &mut ParseState<'_, I>,
        expected: &mut Vec<Expected<I>>,
    ) -> Result<O, Failure<I>> {
        defined(&self.slot).try_parse(state, expected)
    }
}

impl<I: Token, O> Parser<I, O> for RecursiveRef<'_, I, O> {
    fn try_parse(
        &self,
        state: &mut ParseState<'_, I>,
        expected: &mut Vec<Expected<I>>,
    ) -> Result<O, Failure<I>> {
        let Some(slot) = self.slot.upgrade() else {
            panic!("recursive parser was run after its definition was dropped");
        };
        defined(&slot).try_parse(state, expected)
    }
}
