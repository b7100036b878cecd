//! # Token Streams
//!
//! A [`TokenStream`] hands out tokens in chunks. The parse state pulls a
//! chunk whenever a parser looks past the buffered window, so the stream
//! itself never needs to seek.
//!
//! ## Stream Types
//!
//! * [`SliceStream`]: any `&[I]` (arrays, vectors, sub-slices)
//! * [`StrStream`]: the `char`s of a `&str`
//! * [`IterStream`]: any `Iterator`
//! * [`ByteReaderStream`]: bytes of an `io::Read`
//! * [`CharReaderStream`]: UTF-8 decoded `char`s of an `io::Read`
//! * [`ResumableStream`]: wraps any of the above so returned tokens are
//!   replayed on the next read
//!
//! When a parse finishes, the tokens it buffered but did not consume are
//! handed back through [`TokenStream::return_tokens`]. Slice-backed streams
//! simply move their cursor back; a [`ResumableStream`] holds them for the
//! next reader; other streams drop them.

use std::io;

mod iter;
mod reader;
mod resumable;
mod slice;

pub use iter::IterStream;
pub use reader::{ByteReaderStream, CharReaderStream};
pub use resumable::ResumableStream;
pub use slice::{SliceStream, StrStream};

/// Chunk size for in-memory, random-access sources.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;
/// Chunk size for sources that produce tokens lazily.
pub const ITERATOR_CHUNK_SIZE: usize = 256;
/// Chunk size for interactive readers.
pub const READER_CHUNK_SIZE: usize = 64;

/// A pull-based source of tokens.
pub trait TokenStream<I> {
    /// Appends at most `max` tokens to `out` and returns how many were
    /// appended. `Ok(0)` means the stream is exhausted.
    fn read(&mut self, out: &mut Vec<I>, max: usize) -> io::Result<usize>;

    /// Pushes tokens previously obtained from [`read`](Self::read) back to
    /// the front of the stream. Streams that cannot replay tokens drop them.
    fn return_tokens(&mut self, _tokens: &[I]) {}

    /// Preferred number of tokens per [`read`](Self::read).
    fn chunk_size_hint(&self) -> usize {
        DEFAULT_CHUNK_SIZE
    }
}

impl<I, S: TokenStream<I> + ?Sized> TokenStream<I> for &mut S {
    fn read(&mut self, out: &mut Vec<I>, max: usize) -> io::Result<usize> {
        (**self).read(out, max)
    }

    fn return_tokens(&mut self, tokens: &[I]) {
        (**self).return_tokens(tokens)
    }

    fn chunk_size_hint(&self) -> usize {
        (**self).chunk_size_hint()
    }
}

impl<I, S: TokenStream<I> + ?Sized> TokenStream<I> for Box<S> {
    fn read(&mut self, out: &mut Vec<I>, max: usize) -> io::Result<usize> {
        (**self).read(out, max)
    }

    fn return_tokens(&mut self, tokens: &[I]) {
        (**self).return_tokens(tokens)
    }

    fn chunk_size_hint(&self) -> usize {
        (**self).chunk_size_hint()
    }
}

/// In-memory inputs accepted directly by `Parser::parse`.
pub trait IntoTokenStream<'a, I> {
    type Stream: TokenStream<I> + 'a;

    fn into_token_stream(self) -> Self::Stream;
}

impl<'a> IntoTokenStream<'a, char> for &'a str {
    type Stream = StrStream<'a>;

    fn into_token_stream(self) -> StrStream<'a> {
        StrStream::new(self)
    }
}

impl<'a> IntoTokenStream<'a, char> for &'a String {
    type Stream = StrStream<'a>;

    fn into_token_stream(self) -> StrStream<'a> {
        StrStream::new(self.as_str())
    }
}

impl<'a, I: Clone + 'a> IntoTokenStream<'a, I> for &'a [I] {
    type Stream = SliceStream<'a, I>;

    fn into_token_stream(self) -> SliceStream<'a, I> {
        SliceStream::new(self)
    }
}

impl<'a, I: Clone + 'a> IntoTokenStream<'a, I> for &'a Vec<I> {
    type Stream = SliceStream<'a, I>;

    fn into_token_stream(self) -> SliceStream<'a, I> {
        SliceStream::new(self.as_slice())
    }
}

impl<'a, I: Clone + 'a, const N: usize> IntoTokenStream<'a, I> for &'a [I; N] {
    type Stream = SliceStream<'a, I>;

    fn into_token_stream(self) -> SliceStream<'a, I> {
        SliceStream::new(self.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain<I, S: TokenStream<I>>(mut stream: S, chunk: usize) -> Vec<I> {
        let mut out = Vec::new();
        while stream.read(&mut out, chunk).unwrap() > 0 {}
        out
    }

    #[test]
    fn test_adapters_yield_same_tokens() {
        let text = String::from("héllo");
        let chars: Vec<char> = text.chars().collect();
        let array = ['h', 'é', 'l', 'l', 'o'];

        assert_eq!(drain(text.as_str().into_token_stream(), 2), chars);
        assert_eq!(drain((&text).into_token_stream(), 3), chars);
        assert_eq!(drain((&chars).into_token_stream(), 1), chars);
        assert_eq!(drain(chars.as_slice().into_token_stream(), 10), chars);
        assert_eq!(drain((&array).into_token_stream(), 4), chars);
    }

    #[test]
    fn test_mut_ref_forwards() {
        let mut inner = SliceStream::new(&[1, 2, 3]);
        assert_eq!(drain(&mut inner, 2), vec![1, 2, 3]);

        fn give_back<S: TokenStream<i32>>(mut stream: S, tokens: &[i32]) -> usize {
            stream.return_tokens(tokens);
            stream.chunk_size_hint()
        }
        assert_eq!(give_back(&mut inner, &[3]), DEFAULT_CHUNK_SIZE);
        assert_eq!(drain(&mut inner, 8), vec![3]);
    }
}
