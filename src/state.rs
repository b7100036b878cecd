//! # Parse State
//!
//! One [`ParseState`] drives one parse. It owns the token stream and a
//! growable window over it, the cursor, the stack of outstanding
//! [`Bookmark`]s and a pool of scratch expected lists.
//!
//! ## Buffer window
//!
//! Tokens live in `buffer`, whose first element sits at the absolute
//! location `buffer_start`. The cursor always satisfies
//! `buffer_start <= location <= buffer_start + buffer.len()`. Before a new
//! chunk is pulled the window is compacted: tokens behind the cursor are
//! dropped, or only those behind the oldest outstanding bookmark when a
//! bookmark is live.
//!
//! ## Lazy positions
//!
//! Line/column information is never tracked per token. The state remembers a
//! marker `(location, delta)` and walks only the tokens between the marker
//! and the requested location when a position is actually needed. Bookmarks
//! carry no position; rewinding behind the marker falls back to the start of
//! the window, whose delta is kept in `base_delta`. Compaction is the only
//! place that scans without being asked, and only over the tokens it drops.

use std::io;

use tracing::{debug, trace, warn};

use crate::config::ParseConfig;
use crate::error::{Failure, ParseError};
use crate::expected::{Expected, ExpectedPool};
use crate::position::{SourcePos, SourcePosDelta};
use crate::stream::TokenStream;
use crate::token::Token;

/// A saved cursor location.
///
/// Obtained from [`ParseState::bookmark`] and given back through exactly one
/// of [`ParseState::rewind`] or [`ParseState::discard_bookmark`]. While it is
/// outstanding the tokens from its location onward stay buffered.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a bookmark must be rewound to or discarded"]
pub struct Bookmark {
    location: usize,
}

impl Bookmark {
    pub fn location(&self) -> usize {
        self.location
    }
}

pub struct ParseState<'s, I: Token> {
    stream: Box<dyn TokenStream<I> + 's>,
    buffer: Vec<I>,
    buffer_start: usize,
    /// Position delta at `buffer_start`.
    base_delta: SourcePosDelta,
    location: usize,
    exhausted: bool,
    chunk_size: usize,
    tab_width: usize,
    bookmarks: Vec<usize>,
    marker: usize,
    marker_delta: SourcePosDelta,
    io_error: Option<io::Error>,
    pool: ExpectedPool<I>,
}

impl<'s, I: Token> ParseState<'s, I> {
    pub fn new<S: TokenStream<I> + 's>(stream: S, config: &ParseConfig) -> Self {
        let chunk_size = match config.chunk_size {
            Some(0) => {
                warn!(target: "sinew::state", "chunk_size 0 is invalid, using the stream hint");
                stream.chunk_size_hint().max(1)
            }
            Some(size) => size,
            None => stream.chunk_size_hint().max(1),
        };
        let tab_width = if config.tab_width == 0 {
            warn!(target: "sinew::state", "tab_width 0 is invalid, using 4");
            4
        } else {
            config.tab_width
        };
        Self {
            stream: Box::new(stream),
            buffer: Vec::with_capacity(config.initial_buffer_capacity.max(chunk_size)),
            buffer_start: 0,
            base_delta: SourcePosDelta::ZERO,
            location: 0,
            exhausted: false,
            chunk_size,
            tab_width,
            bookmarks: Vec::new(),
            marker: 0,
            marker_delta: SourcePosDelta::ZERO,
            io_error: None,
            pool: ExpectedPool::new(config.expected_pool_capacity),
        }
    }

    /// Absolute offset of the cursor, in tokens from the start of the input.
    pub fn location(&self) -> usize {
        self.location
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn tab_width(&self) -> usize {
        self.tab_width
    }

    fn buffer_end(&self) -> usize {
        self.buffer_start + self.buffer.len()
    }

    fn buffered_ahead(&self) -> usize {
        self.buffer_end() - self.location
    }

    pub fn has_current(&mut self) -> bool {
        self.fill(1);
        self.buffered_ahead() > 0
    }

    /// The token under the cursor, or `None` at the end of the input.
    pub fn current(&mut self) -> Option<&I> {
        self.fill(1);
        self.buffer.get(self.location - self.buffer_start)
    }

    /// Moves the cursor over `count` already buffered tokens.
    ///
    /// # Panics
    ///
    /// If fewer than `count` tokens are buffered ahead of the cursor.
    pub fn advance(&mut self, count: usize) {
        assert!(
            count <= self.buffered_ahead(),
            "cannot advance {} tokens from location {}: only {} buffered",
            count,
            self.location,
            self.buffered_ahead()
        );
        self.location += count;
    }

    /// Buffers up to `count` tokens ahead of the cursor and returns them.
    ///
    /// The slice is shorter than `count` only at the end of the input.
    pub fn look_ahead(&mut self, count: usize) -> &[I] {
        self.fill(count);
        let start = self.location - self.buffer_start;
        let end = (start + count).min(self.buffer.len());
        &self.buffer[start..end]
    }

    fn fill(&mut self, count: usize) {
        while self.buffered_ahead() < count && !self.exhausted {
            self.compact();
            self.read_chunk();
        }
    }

    fn read_chunk(&mut self) {
        match self.stream.read(&mut self.buffer, self.chunk_size) {
            Ok(0) => {
                trace!(target: "sinew::state", location = self.buffer_end(), "stream exhausted");
                self.exhausted = true;
            }
            Ok(count) => {
                trace!(
                    target: "sinew::state",
                    count,
                    buffer_start = self.buffer_start,
                    buffered = self.buffer.len(),
                    "read chunk"
                );
            }
            Err(error) => {
                debug!(target: "sinew::state", "stream read failed: {}", error);
                self.io_error = Some(error);
                self.exhausted = true;
            }
        }
    }

    /// Drops the tokens no bookmark or cursor can reach any more.
    fn compact(&mut self) {
        let keep_from = self
            .bookmarks
            .iter()
            .copied()
            .min()
            .map_or(self.location, |oldest| oldest.min(self.location));
        if keep_from <= self.buffer_start {
            return;
        }
        let dropped = keep_from - self.buffer_start;
        // only worth the memmove once the dead prefix dominates the window
        if dropped < self.chunk_size && dropped * 2 < self.buffer.len() {
            return;
        }
        if self.marker <= keep_from {
            let span = &self.buffer[self.marker - self.buffer_start..dropped];
            self.marker_delta = I::span_pos_delta(span, self.marker_delta, self.tab_width);
            self.marker = keep_from;
            self.base_delta = self.marker_delta;
        } else {
            // the marker already sits in the kept part; only the window start moves
            self.base_delta = I::span_pos_delta(&self.buffer[..dropped], self.base_delta, self.tab_width);
        }
        self.buffer.drain(..dropped);
        self.buffer_start = keep_from;
        trace!(
            target: "sinew::state",
            dropped,
            buffer_start = self.buffer_start,
            "compacted buffer"
        );
    }

    /// Captures the cursor so it can be restored with [`rewind`](Self::rewind).
    pub fn bookmark(&mut self) -> Bookmark {
        self.bookmarks.push(self.location);
        Bookmark {
            location: self.location,
        }
    }

    /// Restores the cursor to `bookmark` and releases it.
    ///
    /// # Panics
    ///
    /// If the bookmark was not taken on this state or was already released.
    pub fn rewind(&mut self, bookmark: Bookmark) {
        self.release(bookmark.location);
        self.location = bookmark.location;
        if bookmark.location < self.marker {
            self.marker = self.buffer_start;
            self.marker_delta = self.base_delta;
        }
    }

    /// Releases `bookmark` without moving the cursor.
    pub fn discard_bookmark(&mut self, bookmark: Bookmark) {
        self.release(bookmark.location);
    }

    fn release(&mut self, location: usize) {
        match self.bookmarks.iter().rposition(|&held| held == location) {
            Some(index) => {
                self.bookmarks.remove(index);
            }
            None => panic!("bookmark at location {} is not outstanding on this state", location),
        }
    }

    /// Number of bookmarks not yet rewound to or discarded.
    pub fn outstanding_bookmarks(&self) -> usize {
        self.bookmarks.len()
    }

    /// The position delta from the start of the input to `location`.
    ///
    /// Only the tokens between the last computed marker and `location` are
    /// scanned. The marker moves to `location` when it is not ahead of the
    /// cursor.
    ///
    /// # Panics
    ///
    /// If `location` is before the marker or beyond the buffered input.
    pub fn compute_source_pos_delta_at(&mut self, location: usize) -> SourcePosDelta {
        assert!(
            location >= self.marker,
            "cannot compute a position at location {} before the last computed position at {}",
            location,
            self.marker
        );
        assert!(
            location <= self.buffer_end(),
            "cannot compute a position at location {} beyond the buffered input ending at {}",
            location,
            self.buffer_end()
        );
        let span = &self.buffer[self.marker - self.buffer_start..location - self.buffer_start];
        let delta = I::span_pos_delta(span, self.marker_delta, self.tab_width);
        if location <= self.location {
            self.marker = location;
            self.marker_delta = delta;
        }
        delta
    }

    /// Line and column of the cursor.
    pub fn source_pos(&mut self) -> SourcePos {
        SourcePos::START + self.compute_source_pos_delta_at(self.location)
    }

    /// Position of `location` for diagnostics, without moving the marker.
    ///
    /// Failures are only ever raised on buffered tokens, so `location` lies
    /// inside the window.
    fn report_pos_at(&self, location: usize) -> SourcePos {
        debug_assert!(
            (self.buffer_start..=self.buffer_end()).contains(&location),
            "failure location {} outside the buffered window {}..={}",
            location,
            self.buffer_start,
            self.buffer_end()
        );
        let location = location.clamp(self.buffer_start, self.buffer_end());
        let delta = if location >= self.marker {
            let span = &self.buffer[self.marker - self.buffer_start..location - self.buffer_start];
            I::span_pos_delta(span, self.marker_delta, self.tab_width)
        } else {
            let span = &self.buffer[..location - self.buffer_start];
            I::span_pos_delta(span, self.base_delta, self.tab_width)
        };
        SourcePos::START + delta
    }

    /// A failure describing the token (or end of input) under the cursor.
    pub fn unexpected_here(&mut self, message: Option<&str>) -> Failure<I> {
        let location = self.location;
        let unexpected = self.current().cloned();
        let eof = unexpected.is_none();
        Failure::new(unexpected, eof, location, message.map(Into::into))
    }

    /// Takes an empty scratch list from the state's pool.
    pub fn rent_expected(&mut self) -> Vec<Expected<I>> {
        self.pool.rent()
    }

    pub fn return_expected(&mut self, list: Vec<Expected<I>>) {
        self.pool.give_back(list);
    }

    /// The I/O error that ended the stream early, if any.
    pub fn take_stream_error(&mut self) -> Option<io::Error> {
        self.io_error.take()
    }

    /// Turns a failure and its expected set into the public error value.
    pub fn build_error(&self, failure: &Failure<I>, expected: &[Expected<I>]) -> ParseError<I> {
        ParseError::new(
            failure.unexpected.clone(),
            failure.eof,
            expected.to_vec(),
            failure.location,
            self.report_pos_at(failure.location),
            failure.message.as_deref().map(str::to_string),
        )
    }
}

impl<I: Token> Drop for ParseState<'_, I> {
    fn drop(&mut self) {
        let start = self.location - self.buffer_start;
        if start < self.buffer.len() {
            trace!(
                target: "sinew::state",
                returned = self.buffer.len() - start,
                "returning unconsumed tokens"
            );
            self.stream.return_tokens(&self.buffer[start..]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::{IterStream, ResumableStream, StrStream};
    use pretty_assertions::assert_eq;

    fn state_with_chunk(text: &str, chunk: usize) -> ParseState<'_, char> {
        ParseState::new(StrStream::new(text), &ParseConfig::default().with_chunk_size(chunk))
    }

    #[test]
    fn test_cursor_and_lookahead_across_chunks() {
        let mut state = state_with_chunk("abcdef", 2);
        assert_eq!(state.current(), Some(&'a'));
        assert_eq!(state.look_ahead(5), &['a', 'b', 'c', 'd', 'e']);
        state.advance(4);
        assert_eq!(state.location(), 4);
        assert_eq!(state.look_ahead(10), &['e', 'f']);
        state.advance(2);
        assert!(!state.has_current());
        assert_eq!(state.current(), None);
    }

    #[test]
    #[should_panic(expected = "cannot advance")]
    fn test_advance_past_buffer_panics() {
        let mut state = state_with_chunk("ab", 8);
        state.look_ahead(1);
        state.advance(3);
    }

    #[test]
    fn test_rewind_restores_cursor_and_position() {
        let mut state = state_with_chunk("ab\ncd", 1);
        state.look_ahead(1);
        state.advance(1);
        let bookmark = state.bookmark();
        state.look_ahead(3);
        state.advance(3);
        assert_eq!(state.source_pos(), SourcePos::new(2, 2));

        state.rewind(bookmark);
        assert_eq!(state.location(), 1);
        assert_eq!(state.source_pos(), SourcePos::new(1, 2));
        assert_eq!(state.outstanding_bookmarks(), 0);
    }

    #[test]
    fn test_bookmarks_do_not_compute_positions() {
        let mut state = state_with_chunk("ab\ncd", 8);
        state.look_ahead(5);
        state.advance(4);
        let bookmark = state.bookmark();
        assert_eq!((state.marker, state.marker_delta), (0, SourcePosDelta::ZERO));
        state.advance(1);
        state.discard_bookmark(bookmark);
        assert_eq!(state.marker, 0);
        assert_eq!(state.source_pos(), SourcePos::new(2, 3));
    }

    #[test]
    fn test_rewind_behind_marker_after_compaction() {
        let mut state = state_with_chunk("ab\ncdefgh", 2);
        state.look_ahead(4);
        state.advance(3);
        let bookmark = state.bookmark();
        state.advance(1);
        assert_eq!(state.source_pos(), SourcePos::new(2, 2));
        assert_eq!(state.marker, 4);

        // drops "ab\n" while the marker sits ahead of the bookmark
        state.look_ahead(2);
        assert_eq!(state.buffer_start, 3);
        assert_eq!(state.base_delta, SourcePosDelta::new(1, 0));

        state.rewind(bookmark);
        assert_eq!(state.source_pos(), SourcePos::new(2, 1));
        state.look_ahead(4);
        state.advance(4);
        assert_eq!(state.source_pos(), SourcePos::new(2, 5));
    }

    #[test]
    fn test_bookmark_keeps_tokens_buffered() {
        let text = "x".repeat(100);
        let mut state = state_with_chunk(&text, 4);
        let bookmark = state.bookmark();
        for _ in 0..100 {
            state.look_ahead(1);
            state.advance(1);
        }
        state.rewind(bookmark);
        assert_eq!(state.look_ahead(3), &['x', 'x', 'x']);
    }

    #[test]
    fn test_compaction_bounds_the_window() {
        let text = "y".repeat(1000);
        let mut state = state_with_chunk(&text, 8);
        for _ in 0..1000 {
            state.look_ahead(1);
            state.advance(1);
        }
        assert!(state.buffer.len() <= 32);
        assert_eq!(state.source_pos(), SourcePos::new(1, 1001));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "outside the buffered window")]
    fn test_error_outside_window_is_caught() {
        let mut state = state_with_chunk("abc", 8);
        state.look_ahead(3);
        let failure = Failure::new(None, true, 10, None);
        let _ = state.build_error(&failure, &[]);
    }

    #[test]
    #[should_panic(expected = "not outstanding")]
    fn test_double_release_panics() {
        let mut state = state_with_chunk("abc", 8);
        let first = state.bookmark();
        let copy = Bookmark {
            location: first.location,
        };
        state.discard_bookmark(first);
        state.rewind(copy);
    }

    #[test]
    fn test_positions_with_tabs_and_newlines() {
        let mut state = state_with_chunk("a\tb\n\tc", 2);
        state.look_ahead(6);
        state.advance(3);
        assert_eq!(state.source_pos(), SourcePos::new(1, 6));
        state.advance(3);
        assert_eq!(state.source_pos(), SourcePos::new(2, 6));
    }

    #[test]
    #[should_panic(expected = "before the last computed position")]
    fn test_position_before_marker_panics() {
        let mut state = state_with_chunk("abc", 8);
        state.look_ahead(3);
        state.advance(2);
        state.source_pos();
        state.compute_source_pos_delta_at(1);
    }

    #[test]
    #[should_panic(expected = "beyond the buffered input")]
    fn test_position_beyond_buffer_panics() {
        let mut state = state_with_chunk("abc", 8);
        state.compute_source_pos_delta_at(10);
    }

    #[test]
    fn test_unexpected_here_reports_eof() {
        let mut state = state_with_chunk("", 8);
        let failure = state.unexpected_here(Some("boom"));
        assert!(failure.eof);
        assert_eq!(failure.unexpected, None);
        assert_eq!(failure.message.as_deref(), Some("boom"));
    }

    #[test]
    fn test_build_error_computes_position() {
        let mut state = state_with_chunk("ab\nxy", 2);
        state.look_ahead(4);
        state.advance(4);
        let failure = state.unexpected_here(None);
        let error = state.build_error(&failure, &[Expected::label("digit")]);
        assert_eq!(error.position(), SourcePos::new(2, 2));
        assert_eq!(error.unexpected(), Some(&'y'));
    }

    #[test]
    fn test_drop_returns_unconsumed_tokens() {
        let mut stream = ResumableStream::new(IterStream::new("hello".chars()));
        {
            let mut state = ParseState::new(&mut stream, &ParseConfig::default());
            state.look_ahead(5);
            state.advance(2);
        }
        assert_eq!(stream.held(), 3);
        let mut rest = Vec::new();
        stream.read(&mut rest, 10).unwrap();
        assert_eq!(rest, vec!['l', 'l', 'o']);
    }

    #[test]
    fn test_io_errors_end_the_stream() {
        struct Failing;
        impl TokenStream<u8> for Failing {
            fn read(&mut self, _out: &mut Vec<u8>, _max: usize) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::Other, "gone"))
            }
        }
        let mut state = ParseState::new(Failing, &ParseConfig::default());
        assert!(!state.has_current());
        assert_eq!(state.take_stream_error().map(|e| e.kind()), Some(io::ErrorKind::Other));
        assert!(state.take_stream_error().is_none());
    }
}
