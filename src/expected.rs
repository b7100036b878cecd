//! # Expected-Set Model
//!
//! Every failing parser reports what it would have accepted at the failure
//! point. Combinators thread a caller-owned `Vec<Expected<I>>` through the
//! call tree and only append to it on failure; speculative children write into
//! scratch lists rented from an [`ExpectedPool`] so their entries can be
//! merged or thrown away without allocating on every attempt.

use std::fmt;
use std::sync::Arc;

use crate::token::Token;

/// Something a parser expected to find.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expected<I> {
    /// A human-readable label such as `"digit"`.
    Label(Arc<str>),
    /// A literal token sequence.
    Tokens(Arc<[I]>),
    /// The end of the input.
    Eof,
}

impl<I> Expected<I> {
    pub fn label(label: impl Into<Arc<str>>) -> Self {
        Expected::Label(label.into())
    }

    pub fn tokens(tokens: impl Into<Arc<[I]>>) -> Self {
        Expected::Tokens(tokens.into())
    }

    pub fn is_label(&self) -> bool {
        matches!(self, Expected::Label(_))
    }
}

impl<I: Token> Expected<I> {
    pub fn single(token: I) -> Self {
        Expected::Tokens(Arc::from(vec![token]))
    }
}

impl<I: Token> fmt::Display for Expected<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Label(label) => f.write_str(label),
            Expected::Tokens(tokens) => f.write_str(&I::render_sequence(tokens)),
            Expected::Eof => f.write_str("end of input"),
        }
    }
}

/// Appends the entries of `from` that `into` does not already contain.
pub fn merge_expected<I: PartialEq + Clone>(into: &mut Vec<Expected<I>>, from: &[Expected<I>]) {
    for item in from {
        if !into.contains(item) {
            into.push(item.clone());
        }
    }
}

/// Recycles scratch expected lists for the lifetime of one parse.
#[derive(Debug)]
pub struct ExpectedPool<I> {
    free: Vec<Vec<Expected<I>>>,
    capacity: usize,
}

impl<I> ExpectedPool<I> {
    pub fn new(capacity: usize) -> Self {
        Self {
            free: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Takes an empty list from the pool, allocating if the pool is dry.
    pub fn rent(&mut self) -> Vec<Expected<I>> {
        self.free.pop().unwrap_or_default()
    }

    /// Clears `list` and keeps it for reuse. Lists beyond the pool's
    /// capacity are dropped.
    pub fn give_back(&mut self, mut list: Vec<Expected<I>>) {
        if self.free.len() < self.capacity {
            list.clear();
            self.free.push(list);
        }
    }

    pub fn available(&self) -> usize {
        self.free.len()
    }
}
