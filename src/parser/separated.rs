use std::marker::PhantomData;

use strum::{Display, EnumString};

use super::core::Parser;
use super::repeat::{no_progress, repeat_while};
use crate::error::Failure;
use crate::expected::Expected;
use crate::state::ParseState;
use crate::token::Token;

/// Where separators may appear in a separated list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum SeparatorMode {
    /// `item (sep item)*`
    Between,
    /// `(item sep)*`
    Terminated,
    /// `item (sep item)* sep?`
    OptionallyTerminated,
}

/// Runs `parser`, turning a failure that consumed nothing into `Ok(None)`.
fn optional_step<I, O, P>(
    parser: &P,
    state: &mut ParseState<'_, I>,
    expected: &mut Vec<Expected<I>>,
) -> Result<Option<O>, Failure<I>>
where
    I: Token,
    P: Parser<I, O>,
{
    let start = state.location();
    let mut scratch = state.rent_expected();
    let result = match parser.try_parse(state, &mut scratch) {
        Ok(value) => Ok(Some(value)),
        Err(failure) if state.location() != start => {
            expected.append(&mut scratch);
            Err(failure)
        }
        Err(_) => Ok(None),
    };
    state.return_expected(scratch);
    result
}

#[derive(Clone)]
pub struct Separated<P, S, SO> {
    item: P,
    separator: S,
    mode: SeparatorMode,
    at_least_once: bool,
    _phantom: PhantomData<fn(SO)>,
}

impl<P, S, SO> Separated<P, S, SO> {
    pub fn new(item: P, separator: S, mode: SeparatorMode, at_least_once: bool) -> Self {
        Self {
            item,
            separator,
            mode,
            at_least_once,
            _phantom: PhantomData,
        }
    }

    pub fn mode(&self) -> SeparatorMode {
        self.mode
    }
}

impl<P, S, SO> Separated<P, S, SO> {
    fn first<I, O>(
        &self,
        state: &mut ParseState<'_, I>,
        expected: &mut Vec<Expected<I>>,
    ) -> Result<Option<O>, Failure<I>>
    where
        I: Token,
        P: Parser<I, O>,
    {
        if self.at_least_once {
            self.item.try_parse(state, expected).map(Some)
        } else {
            optional_step(&self.item, state, expected)
        }
    }
}

impl<I, O, SO, P, S> Parser<I, Vec<O>> for Separated<P, S, SO>
where
    I: Token,
    P: Parser<I, O>,
    S: Parser<I, SO>,
{
    fn try_parse(
        &self,
        state: &mut ParseState<'_, I>,
        expected: &mut Vec<Expected<I>>,
    ) -> Result<Vec<O>, Failure<I>> {
        let mut items = Vec::new();
        match self.mode {
            SeparatorMode::Between => {
                let Some(first) = self.first(state, expected)? else {
                    return Ok(items);
                };
                items.push(first);
                repeat_while(
                    state,
                    expected,
                    "separated",
                    |state, expected| {
                        self.separator.try_parse(state, expected)?;
                        self.item.try_parse(state, expected)
                    },
                    |item| items.push(item),
                )?;
            }
            SeparatorMode::Terminated => {
                let terminated = |state: &mut ParseState<'_, I>,
                                  expected: &mut Vec<Expected<I>>|
                 -> Result<O, Failure<I>> {
                    let item = self.item.try_parse(state, expected)?;
                    self.separator.try_parse(state, expected)?;
                    Ok(item)
                };
                if self.at_least_once {
                    items.push(terminated(state, expected)?);
                }
                repeat_while(
                    state,
                    expected,
                    "separated_and_terminated",
                    terminated,
                    |item| items.push(item),
                )?;
            }
            SeparatorMode::OptionallyTerminated => {
                let Some(first) = self.first(state, expected)? else {
                    return Ok(items);
                };
                items.push(first);
                loop {
                    let start = state.location();
                    if optional_step(&self.separator, state, expected)?.is_none() {
                        break;
                    }
                    match optional_step(&self.item, state, expected)? {
                        Some(item) => items.push(item),
                        // trailing separator
                        None => break,
                    }
                    if state.location() == start {
                        no_progress("separated_and_optionally_terminated", start);
                    }
                }
            }
        }
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::prelude::*;
    use crate::parser::ParserExt;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_separated() {
        let parser = dec_num().separated(equal(','));
        assert_eq!(parser.parse("1,2,3"), Ok(vec![1, 2, 3]));
        assert_eq!(parser.parse(""), Ok(vec![]));
        assert_eq!(parser.parse("x"), Ok(vec![]));

        // a separator commits to another item
        let error = parser.parse("1,2,").unwrap_err();
        assert!(error.is_eof());
        assert_eq!(error.location(), 4);
    }

    #[test]
    fn test_separated_at_least_once() {
        let parser = dec_num().separated_at_least_once(equal(','));
        assert_eq!(parser.parse("7"), Ok(vec![7]));
        assert_eq!(
            parser.parse("").unwrap_err().expected(),
            &[Expected::label("number")]
        );
    }

    #[test]
    fn test_separated_and_terminated() {
        let parser = dec_num().separated_and_terminated(equal(';'));
        assert_eq!(parser.parse("1;2;"), Ok(vec![1, 2]));
        assert_eq!(parser.parse(""), Ok(vec![]));
        assert!(parser.parse("1;2").is_err());

        let parser = dec_num().separated_and_terminated_at_least_once(equal(';'));
        assert_eq!(parser.parse("5;"), Ok(vec![5]));
        assert!(parser.parse("").is_err());
    }

    #[test]
    fn test_separated_and_optionally_terminated() {
        let parser = dec_num().separated_and_optionally_terminated(equal(','));
        assert_eq!(parser.parse("1,2"), Ok(vec![1, 2]));
        assert_eq!(parser.parse("1,2,"), Ok(vec![1, 2]));
        assert_eq!(parser.parse_prefix("1,2,]"), Ok((vec![1, 2], 4)));
        assert_eq!(parser.parse(""), Ok(vec![]));

        let parser = dec_num().separated_and_optionally_terminated_at_least_once(equal(','));
        assert_eq!(parser.parse("9,"), Ok(vec![9]));
        assert!(parser.parse(",").is_err());
    }

    #[test]
    fn test_mode_names() {
        assert_eq!(SeparatorMode::OptionallyTerminated.to_string(), "optionally_terminated");
        assert_eq!("between".parse::<SeparatorMode>(), Ok(SeparatorMode::Between));
    }

    #[test]
    #[should_panic(expected = "without consuming input")]
    fn test_zero_width_items_panic() {
        let _ = ParserExt::<char, char>::separated(ret('x'), ret(())).parse("abc");
    }
}
