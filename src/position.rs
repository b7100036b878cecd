//! # Source Positions
//!
//! Line/column bookkeeping for diagnostics. Positions are never tracked
//! token-by-token on the hot path; the parse state only accumulates
//! [`SourcePosDelta`]s over spans of tokens when a position is actually
//! requested.

use std::fmt;
use std::ops::Add;

use serde::{Deserialize, Serialize};

/// A 1-based line/column position in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SourcePos {
    pub line: usize,
    pub col: usize,
}

impl SourcePos {
    pub const START: SourcePos = SourcePos { line: 1, col: 1 };

    pub fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

impl Default for SourcePos {
    fn default() -> Self {
        Self::START
    }
}

impl Add<SourcePosDelta> for SourcePos {
    type Output = SourcePos;

    fn add(self, delta: SourcePosDelta) -> SourcePos {
        if delta.lines == 0 {
            SourcePos::new(self.line, self.col + delta.cols)
        } else {
            SourcePos::new(self.line + delta.lines, 1 + delta.cols)
        }
    }
}

impl fmt::Display for SourcePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, col {}", self.line, self.col)
    }
}

/// The distance covered by a span of tokens.
///
/// When `lines` is non-zero, `cols` counts the columns after the last line
/// break, so composition with `+` is associative but not commutative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub struct SourcePosDelta {
    pub lines: usize,
    pub cols: usize,
}

impl SourcePosDelta {
    pub const ZERO: SourcePosDelta = SourcePosDelta { lines: 0, cols: 0 };
    pub const ONE_COL: SourcePosDelta = SourcePosDelta { lines: 0, cols: 1 };
    pub const NEW_LINE: SourcePosDelta = SourcePosDelta { lines: 1, cols: 0 };

    pub fn new(lines: usize, cols: usize) -> Self {
        Self { lines, cols }
    }

    /// Advances to the next multiple of `tab_width` on the current line.
    pub fn tab(self, tab_width: usize) -> Self {
        let width = tab_width.max(1);
        Self {
            lines: self.lines,
            cols: self.cols + (width - self.cols % width),
        }
    }
}

impl Add for SourcePosDelta {
    type Output = SourcePosDelta;

    fn add(self, rhs: SourcePosDelta) -> SourcePosDelta {
        if rhs.lines == 0 {
            SourcePosDelta::new(self.lines, self.cols + rhs.cols)
        } else {
            SourcePosDelta::new(self.lines + rhs.lines, rhs.cols)
        }
    }
}
