use std::io;

use super::{TokenStream, DEFAULT_CHUNK_SIZE};

/// Streams the elements of a slice.
#[derive(Debug, Clone)]
pub struct SliceStream<'a, I> {
    items: &'a [I],
    pos: usize,
}

impl<'a, I> SliceStream<'a, I> {
    pub fn new(items: &'a [I]) -> Self {
        Self { items, pos: 0 }
    }

    /// Tokens not yet handed out.
    pub fn remaining(&self) -> &'a [I] {
        &self.items[self.pos..]
    }
}

impl<I: Clone> TokenStream<I> for SliceStream<'_, I> {
    fn read(&mut self, out: &mut Vec<I>, max: usize) -> io::Result<usize> {
        let end = (self.pos + max).min(self.items.len());
        out.extend_from_slice(&self.items[self.pos..end]);
        let count = end - self.pos;
        self.pos = end;
        Ok(count)
    }

    fn return_tokens(&mut self, tokens: &[I]) {
        assert!(
            tokens.len() <= self.pos,
            "cannot return {} tokens to a slice stream positioned at {}",
            tokens.len(),
            self.pos
        );
        self.pos -= tokens.len();
    }

    fn chunk_size_hint(&self) -> usize {
        DEFAULT_CHUNK_SIZE
    }
}

/// Streams the `char`s of a string slice.
#[derive(Debug, Clone)]
pub struct StrStream<'a> {
    text: &'a str,
    offset: usize,
}

impl<'a> StrStream<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text, offset: 0 }
    }

    /// Text not yet handed out.
    pub fn remaining(&self) -> &'a str {
        &self.text[self.offset..]
    }
}

impl TokenStream<char> for StrStream<'_> {
    fn read(&mut self, out: &mut Vec<char>, max: usize) -> io::Result<usize> {
        let mut count = 0;
        for c in self.text[self.offset..].chars().take(max) {
            out.push(c);
            self.offset += c.len_utf8();
            count += 1;
        }
        Ok(count)
    }

    fn return_tokens(&mut self, tokens: &[char]) {
        let bytes: usize = tokens.iter().map(|c| c.len_utf8()).sum();
        assert!(
            bytes <= self.offset,
            "cannot return {} bytes to a string stream positioned at byte {}",
            bytes,
            self.offset
        );
        self.offset -= bytes;
    }

    fn chunk_size_hint(&self) -> usize {
        DEFAULT_CHUNK_SIZE
    }
}
