use std::collections::VecDeque;
use std::io;

use tracing::trace;

use super::TokenStream;

/// Wraps a stream so that returned tokens are replayed before anything else.
///
/// Every call to [`return_tokens`](TokenStream::return_tokens) places its
/// span in front of the tokens already held, so several returns made in
/// reverse reading order come back in their original order. This lets one
/// parse stop part-way through a chunk and a later parse continue from the
/// exact token where it stopped.
#[derive(Debug)]
pub struct ResumableStream<I, S> {
    inner: S,
    held: VecDeque<I>,
}

impl<I, S: TokenStream<I>> ResumableStream<I, S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            held: VecDeque::new(),
        }
    }

    /// Number of returned tokens waiting to be re-read.
    pub fn held(&self) -> usize {
        self.held.len()
    }

    pub fn into_inner(self) -> (S, Vec<I>) {
        (self.inner, self.held.into())
    }
}

impl<I: Clone, S: TokenStream<I>> TokenStream<I> for ResumableStream<I, S> {
    fn read(&mut self, out: &mut Vec<I>, max: usize) -> io::Result<usize> {
        if !self.held.is_empty() {
            let count = max.min(self.held.len());
            out.extend(self.held.drain(..count));
            return Ok(count);
        }
        self.inner.read(out, max)
    }

    fn return_tokens(&mut self, tokens: &[I]) {
        trace!(
            target: "sinew::stream",
            returned = tokens.len(),
            held = self.held.len(),
            "holding returned tokens"
        );
        self.held.reserve(tokens.len());
        for token in tokens.iter().rev() {
            self.held.push_front(token.clone());
        }
    }

    fn chunk_size_hint(&self) -> usize {
        self.inner.chunk_size_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::IterStream;
    use proptest::prelude::*;

    #[test]
    fn test_returned_tokens_are_replayed_first() {
        let mut stream = ResumableStream::new(IterStream::new("abcdef".chars()));
        let mut out = Vec::new();
        stream.read(&mut out, 4).unwrap();
        assert_eq!(out, vec!['a', 'b', 'c', 'd']);

        stream.return_tokens(&['c', 'd']);
        stream.return_tokens(&['b']);
        assert_eq!(stream.held(), 3);

        out.clear();
        assert_eq!(stream.read(&mut out, 2).unwrap(), 2);
        assert_eq!(out, vec!['b', 'c']);

        out.clear();
        while stream.read(&mut out, 10).unwrap() > 0 {}
        assert_eq!(out, vec!['d', 'e', 'f']);
    }

    proptest! {
        // A consumer that reads chunks and hands back an arbitrary suffix of
        // what it just read must see every token exactly once, in order.
        #[test]
        fn prop_no_token_lost_or_duplicated(
            input in proptest::collection::vec(any::<u8>(), 0..200),
            steps in proptest::collection::vec((1usize..16, 0usize..16), 1..64),
        ) {
            let mut stream = ResumableStream::new(IterStream::new(input.clone()));
            let mut consumed = Vec::new();
            for (chunk, give_back) in steps {
                let mut buf = Vec::new();
                stream.read(&mut buf, chunk).unwrap();
                let keep = buf.len() - give_back.min(buf.len());
                consumed.extend_from_slice(&buf[..keep]);
                stream.return_tokens(&buf[keep..]);
            }
            let mut rest = Vec::new();
            while stream.read(&mut rest, 32).unwrap() > 0 {}
            consumed.extend(rest);
            prop_assert_eq!(consumed, input);
        }
    }
}
