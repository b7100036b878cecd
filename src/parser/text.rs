//! Ready-made parsers over `char` streams.

use std::sync::Arc;

use super::alternation::Or;
use super::combinators::{AsUnit, Attempt, FilterMap, Labelled};
use super::core::Parser;
use super::primitives::{Satisfy, Str};
use super::repeat::{Chain, SkipChainer, StringChainer};

fn string_chainer() -> StringChainer {
    StringChainer::new()
}

pub fn digit() -> impl Parser<char, char> + Clone {
    Labelled::new(Satisfy::new(|c: &char| c.is_ascii_digit()), "digit")
}

pub fn letter() -> impl Parser<char, char> + Clone {
    Labelled::new(Satisfy::new(|c: &char| c.is_alphabetic()), "letter")
}

pub fn letter_or_digit() -> impl Parser<char, char> + Clone {
    Labelled::new(
        Satisfy::new(|c: &char| c.is_alphanumeric()),
        "letter or digit",
    )
}

pub fn whitespace() -> impl Parser<char, char> + Clone {
    Labelled::new(Satisfy::new(|c: &char| c.is_whitespace()), "whitespace")
}

/// Zero or more whitespace characters.
pub fn whitespaces() -> impl Parser<char, String> + Clone {
    Chain::new(whitespace(), string_chainer as fn() -> StringChainer, false)
}

pub fn skip_whitespaces() -> impl Parser<char, ()> + Clone {
    Chain::new(whitespace(), SkipChainer::default as fn() -> SkipChainer, false)
}

/// Any character not in `excluded`.
pub fn any_char_except(excluded: &str) -> impl Parser<char, char> + Clone {
    let excluded: Arc<str> = excluded.into();
    Satisfy::new(move |c: &char| !excluded.contains(*c))
}

/// An unsigned decimal integer.
pub fn dec_num() -> impl Parser<char, i64> + Clone {
    let digits = Chain::new(digit(), string_chainer as fn() -> StringChainer, true);
    Labelled::new(
        FilterMap::new(
            digits,
            |text: String| text.parse::<i64>().ok(),
            "number out of range",
        ),
        "number",
    )
}

/// `"\n"` or `"\r\n"`.
pub fn end_of_line() -> impl Parser<char, ()> + Clone {
    let newline = Or::new(Attempt::new(Str::new("\r\n")), Str::new("\n"));
    Labelled::new(AsUnit::<_, String>::new(newline), "end of line")
}
