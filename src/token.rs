//! # Tokens
//!
//! The engine never inspects tokens except through equality, caller-supplied
//! predicates and the hooks on [`Token`]. Any `Clone + PartialEq + Debug`
//! type can be a token by opting in with an empty impl:
//!
//! ```ignore
//! #[derive(Debug, Clone, PartialEq)]
//! enum Lexeme { Ident(String), Comma }
//!
//! impl sinew::Token for Lexeme {}
//! ```

use std::fmt;

use crate::position::SourcePosDelta;

/// A unit of parser input.
pub trait Token: Clone + PartialEq + fmt::Debug + Sized {
    /// The position delta after this token, given the delta before it.
    ///
    /// Defaults to one column per token.
    fn pos_delta(&self, current: SourcePosDelta, _tab_width: usize) -> SourcePosDelta {
        current + SourcePosDelta::ONE_COL
    }

    /// The position delta after a whole span of tokens.
    fn span_pos_delta(tokens: &[Self], start: SourcePosDelta, tab_width: usize) -> SourcePosDelta {
        tokens
            .iter()
            .fold(start, |delta, token| token.pos_delta(delta, tab_width))
    }

    /// Human-readable form used in `unexpected ...` diagnostics.
    fn render(&self) -> String {
        format!("{:?}", self)
    }

    /// Human-readable form of an expected literal sequence.
    fn render_sequence(tokens: &[Self]) -> String {
        tokens
            .iter()
            .map(Token::render)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Equality used by case-insensitive literal matching.
    fn eq_ignore_case(&self, other: &Self) -> bool {
        self == other
    }
}

impl Token for char {
    fn pos_delta(&self, current: SourcePosDelta, tab_width: usize) -> SourcePosDelta {
        match self {
            '\n' => current + SourcePosDelta::NEW_LINE,
            '\t' => current.tab(tab_width),
            _ => current + SourcePosDelta::ONE_COL,
        }
    }

    // Find the last line break first so only the final line is walked
    // token-by-token; everything before it collapses to a line count.
    fn span_pos_delta(tokens: &[char], start: SourcePosDelta, tab_width: usize) -> SourcePosDelta {
        let (delta, last_line) = match tokens.iter().rposition(|&c| c == '\n') {
            Some(last) => {
                let breaks = tokens[..=last].iter().filter(|&&c| c == '\n').count();
                (
                    SourcePosDelta::new(start.lines + breaks, 0),
                    &tokens[last + 1..],
                )
            }
            None => (start, tokens),
        };
        if last_line.contains(&'\t') {
            last_line
                .iter()
                .fold(delta, |d, c| c.pos_delta(d, tab_width))
        } else {
            SourcePosDelta::new(delta.lines, delta.cols + last_line.len())
        }
    }

    fn render(&self) -> String {
        if self.is_control() {
            self.escape_debug().to_string()
        } else {
            self.to_string()
        }
    }

    fn render_sequence(tokens: &[char]) -> String {
        let text: String = tokens.iter().map(Token::render).collect();
        format!("\"{}\"", text)
    }

    fn eq_ignore_case(&self, other: &char) -> bool {
        self == other || self.to_lowercase().eq(other.to_lowercase())
    }
}

impl Token for u8 {
    fn render(&self) -> String {
        self.escape_ascii().to_string()
    }

    fn render_sequence(tokens: &[u8]) -> String {
        format!("\"{}\"", tokens.escape_ascii())
    }

    fn eq_ignore_case(&self, other: &u8) -> bool {
        self.eq_ignore_ascii_case(other)
    }
}

impl Token for String {
    fn render(&self) -> String {
        self.clone()
    }

    fn eq_ignore_case(&self, other: &String) -> bool {
        self.to_lowercase() == other.to_lowercase()
    }
}

impl Token for &'static str {
    fn render(&self) -> String {
        (*self).to_string()
    }

    fn eq_ignore_case(&self, other: &&'static str) -> bool {
        self.to_lowercase() == other.to_lowercase()
    }
}

macro_rules! integer_tokens {
    ($($ty:ty),*) => {
        $(
            impl Token for $ty {
                fn render(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

integer_tokens!(i8, i16, i32, i64, u16, u32, u64, usize, isize);
