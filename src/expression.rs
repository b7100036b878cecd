//! Operator-precedence expression parsing.
//!
//! A table is a list of tiers, tightest-binding first. Each tier is folded
//! over the parser of the tier before it by [`Tier`], so a table is plain
//! data interpreted by one builder.

use std::sync::Arc;

use strum::{Display, EnumString};

use crate::error::Failure;
use crate::expected::Expected;
use crate::parser::{
    no_progress, recursive, Alternatives, AsUnit, BoxedParser, Parser, Recursive, RecursiveRef,
};
use crate::state::ParseState;
use crate::token::Token;

/// Where an operator sits relative to its operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum Fixity {
    InfixL,
    InfixR,
    /// Non-associative: `a op b op c` is rejected.
    InfixN,
    Prefix,
    Postfix,
    PrefixChainable,
    PostfixChainable,
}

impl Fixity {
    pub fn is_infix(self) -> bool {
        matches!(self, Fixity::InfixL | Fixity::InfixR | Fixity::InfixN)
    }
}

type Unary<'a, O> = Arc<dyn Fn(O) -> O + Send + Sync + 'a>;
type Binary<'a, O> = Arc<dyn Fn(O, O) -> O + Send + Sync + 'a>;

enum Action<'a, O> {
    Unary(Unary<'a, O>),
    Binary(Binary<'a, O>),
}

impl<O> Clone for Action<'_, O> {
    fn clone(&self) -> Self {
        match self {
            Action::Unary(f) => Action::Unary(Arc::clone(f)),
            Action::Binary(f) => Action::Binary(Arc::clone(f)),
        }
    }
}

/// One entry of a precedence table: the parser recognising the operator
/// and the function applying it.
pub struct Operator<'a, I: Token, O> {
    fixity: Fixity,
    parser: BoxedParser<'a, I, ()>,
    action: Action<'a, O>,
}

impl<I: Token, O> Clone for Operator<'_, I, O> {
    fn clone(&self) -> Self {
        Self {
            fixity: self.fixity,
            parser: self.parser.clone(),
            action: self.action.clone(),
        }
    }
}

impl<'a, I: Token + 'a, O: 'a> Operator<'a, I, O> {
    fn unary<P, X, F>(fixity: Fixity, parser: P, f: F) -> Self
    where
        P: Parser<I, X> + Send + Sync + 'a,
        X: 'a,
        F: Fn(O) -> O + Send + Sync + 'a,
    {
        Self {
            fixity,
            parser: BoxedParser::new(AsUnit::<P, X>::new(parser)),
            action: Action::Unary(Arc::new(f)),
        }
    }

    fn binary<P, X, F>(fixity: Fixity, parser: P, f: F) -> Self
    where
        P: Parser<I, X> + Send + Sync + 'a,
        X: 'a,
        F: Fn(O, O) -> O + Send + Sync + 'a,
    {
        Self {
            fixity,
            parser: BoxedParser::new(AsUnit::<P, X>::new(parser)),
            action: Action::Binary(Arc::new(f)),
        }
    }

    /// Left-associative infix: `a op b op c` is `(a op b) op c`.
    pub fn infix_l<P, X, F>(parser: P, f: F) -> Self
    where
        P: Parser<I, X> + Send + Sync + 'a,
        X: 'a,
        F: Fn(O, O) -> O + Send + Sync + 'a,
    {
        Self::binary(Fixity::InfixL, parser, f)
    }

    /// Right-associative infix: `a op b op c` is `a op (b op c)`.
    pub fn infix_r<P, X, F>(parser: P, f: F) -> Self
    where
        P: Parser<I, X> + Send + Sync + 'a,
        X: 'a,
        F: Fn(O, O) -> O + Send + Sync + 'a,
    {
        Self::binary(Fixity::InfixR, parser, f)
    }

    pub fn infix_n<P, X, F>(parser: P, f: F) -> Self
    where
        P: Parser<I, X> + Send + Sync + 'a,
        X: 'a,
        F: Fn(O, O) -> O + Send + Sync + 'a,
    {
        Self::binary(Fixity::InfixN, parser, f)
    }

    pub fn prefix<P, X, F>(parser: P, f: F) -> Self
    where
        P: Parser<I, X> + Send + Sync + 'a,
        X: 'a,
        F: Fn(O) -> O + Send + Sync + 'a,
    {
        Self::unary(Fixity::Prefix, parser, f)
    }

    pub fn postfix<P, X, F>(parser: P, f: F) -> Self
    where
        P: Parser<I, X> + Send + Sync + 'a,
        X: 'a,
        F: Fn(O) -> O + Send + Sync + 'a,
    {
        Self::unary(Fixity::Postfix, parser, f)
    }

    pub fn prefix_chainable<P, X, F>(parser: P, f: F) -> Self
    where
        P: Parser<I, X> + Send + Sync + 'a,
        X: 'a,
        F: Fn(O) -> O + Send + Sync + 'a,
    {
        Self::unary(Fixity::PrefixChainable, parser, f)
    }

    pub fn postfix_chainable<P, X, F>(parser: P, f: F) -> Self
    where
        P: Parser<I, X> + Send + Sync + 'a,
        X: 'a,
        F: Fn(O) -> O + Send + Sync + 'a,
    {
        Self::unary(Fixity::PostfixChainable, parser, f)
    }
}

impl<I: Token, O> Operator<'_, I, O> {
    pub fn fixity(&self) -> Fixity {
        self.fixity
    }
}

type UnaryOps<'a, I, O> = Vec<(BoxedParser<'a, I, ()>, Unary<'a, O>)>;
type BinaryOps<'a, I, O> = Vec<(BoxedParser<'a, I, ()>, Binary<'a, O>)>;

/// One precedence level folded over the parser of the level above.
pub struct Tier<'a, I: Token, O> {
    operand: BoxedParser<'a, I, O>,
    prefix_chainable: UnaryOps<'a, I, O>,
    prefix: UnaryOps<'a, I, O>,
    postfix: UnaryOps<'a, I, O>,
    postfix_chainable: UnaryOps<'a, I, O>,
    /// Tried in the order non-associative, left, right.
    infix: Vec<(BoxedParser<'a, I, ()>, (Fixity, Binary<'a, O>))>,
    /// The left and right operators again, for continuing a fold.
    infix_l: BinaryOps<'a, I, O>,
    infix_r: BinaryOps<'a, I, O>,
}

impl<'a, I: Token, O> Tier<'a, I, O> {
    pub fn new(operand: BoxedParser<'a, I, O>, operators: Vec<Operator<'a, I, O>>) -> Self {
        let mut tier = Self {
            operand,
            prefix_chainable: Vec::new(),
            prefix: Vec::new(),
            postfix: Vec::new(),
            postfix_chainable: Vec::new(),
            infix: Vec::new(),
            infix_l: Vec::new(),
            infix_r: Vec::new(),
        };
        for Operator {
            fixity,
            parser,
            action,
        } in operators
        {
            match (fixity, action) {
                (Fixity::PrefixChainable, Action::Unary(f)) => tier.prefix_chainable.push((parser, f)),
                (Fixity::Prefix, Action::Unary(f)) => tier.prefix.push((parser, f)),
                (Fixity::Postfix, Action::Unary(f)) => tier.postfix.push((parser, f)),
                (Fixity::PostfixChainable, Action::Unary(f)) => {
                    tier.postfix_chainable.push((parser, f))
                }
                (Fixity::InfixN, Action::Binary(f)) => tier.infix.push((parser, (fixity, f))),
                (Fixity::InfixL, Action::Binary(f)) => tier.infix_l.push((parser, f)),
                (Fixity::InfixR, Action::Binary(f)) => tier.infix_r.push((parser, f)),
                _ => unreachable!("operator constructors pair each fixity with its arity"),
            }
        }
        let left = tier.infix_l.iter().map(|(parser, f)| (parser.clone(), (Fixity::InfixL, Arc::clone(f))));
        let right = tier.infix_r.iter().map(|(parser, f)| (parser.clone(), (Fixity::InfixR, Arc::clone(f))));
        tier.infix.extend(left.chain(right));
        tier
    }

    /// Tries `operators` from the current location. A match yields its
    /// payload; a consuming failure is returned.
    fn pick<'o, A>(
        operators: &'o [(BoxedParser<'a, I, ()>, A)],
        state: &mut ParseState<'_, I>,
        expected: &mut Vec<Expected<I>>,
    ) -> Result<Option<&'o A>, Failure<I>> {
        if operators.is_empty() {
            return Ok(None);
        }
        let mut alternatives = Alternatives::new(state);
        for (parser, payload) in operators {
            if let Some(outcome) = alternatives.attempt(parser, state) {
                return alternatives.finish(state, expected, Some(outcome.map(|()| Some(payload))));
            }
        }
        alternatives.finish(state, expected, Some(Ok(None)))
    }

    /// Like `pick`, panicking on an operator that matched nothing.
    fn pick_chained<'o, A>(
        operators: &'o [(BoxedParser<'a, I, ()>, A)],
        state: &mut ParseState<'_, I>,
        expected: &mut Vec<Expected<I>>,
    ) -> Result<Option<&'o A>, Failure<I>> {
        let start = state.location();
        let picked = Self::pick(operators, state, expected)?;
        if picked.is_some() && state.location() == start {
            no_progress("chainable operator", start);
        }
        Ok(picked)
    }

    fn operand(
        &self,
        state: &mut ParseState<'_, I>,
        expected: &mut Vec<Expected<I>>,
    ) -> Result<O, Failure<I>> {
        let mut chained = Vec::new();
        while let Some(f) = Self::pick_chained(&self.prefix_chainable, state, expected)? {
            chained.push(f);
        }
        let prefix = Self::pick(&self.prefix, state, expected)?;

        let mut value = self.operand.try_parse(state, expected)?;
        if let Some(f) = Self::pick(&self.postfix, state, expected)? {
            value = f(value);
        }
        while let Some(f) = Self::pick_chained(&self.postfix_chainable, state, expected)? {
            value = f(value);
        }

        if let Some(f) = prefix {
            value = f(value);
        }
        // the chainable prefix nearest the operand applies first
        for f in chained.into_iter().rev() {
            value = f(value);
        }
        Ok(value)
    }

    /// Whether an infix operator of this tier starts at the cursor. Leaves
    /// the cursor where it was.
    fn infix_follows(&self, state: &mut ParseState<'_, I>) -> bool {
        let bookmark = state.bookmark();
        let mut scratch = state.rent_expected();
        let found = matches!(Self::pick(&self.infix, state, &mut scratch), Ok(Some(_)));
        state.return_expected(scratch);
        state.rewind(bookmark);
        found
    }
}

impl<I: Token, O> Parser<I, O> for Tier<'_, I, O> {
    fn try_parse(
        &self,
        state: &mut ParseState<'_, I>,
        expected: &mut Vec<Expected<I>>,
    ) -> Result<O, Failure<I>> {
        let left = self.operand(state, expected)?;
        let Some((fixity, f)) = Self::pick(&self.infix, state, expected)? else {
            return Ok(left);
        };
        let right = self.operand(state, expected)?;
        match fixity {
            Fixity::InfixN => {
                if self.infix_follows(state) {
                    return Err(state.unexpected_here(Some("non-associative operator cannot be chained")));
                }
                Ok(f(left, right))
            }
            Fixity::InfixL => {
                let mut value = f(left, right);
                while let Some(f) = Self::pick(&self.infix_l, state, expected)? {
                    let right = self.operand(state, expected)?;
                    value = f(value, right);
                }
                Ok(value)
            }
            _ => {
                let mut operands = vec![left, right];
                let mut applied = vec![Arc::clone(f)];
                while let Some(f) = Self::pick(&self.infix_r, state, expected)? {
                    operands.push(self.operand(state, expected)?);
                    applied.push(Arc::clone(f));
                }
                let mut value = operands.pop();
                while let (Some(f), Some(left)) = (applied.pop(), operands.pop()) {
                    value = value.map(|right| f(left, right));
                }
                match value {
                    Some(value) => Ok(value),
                    None => unreachable!("right fold over a non-empty operand list"),
                }
            }
        }
    }
}

/// Builds an expression parser from `term` and a table of tiers ordered from
/// highest to lowest precedence.
///
/// ```
/// use sinew::parser::prelude::*;
///
/// let arithmetic = expression(
///     dec_num(),
///     vec![
///         vec![Operator::infix_l(equal('*'), |a: i64, b: i64| a * b)],
///         vec![
///             Operator::infix_l(equal('+'), |a: i64, b: i64| a + b),
///             Operator::infix_l(equal('-'), |a: i64, b: i64| a - b),
///         ],
///     ],
/// );
/// assert_eq!(arithmetic.parse("1*2*3+4*5"), Ok(26));
/// ```
pub fn expression<'a, I, O, P>(term: P, table: Vec<Vec<Operator<'a, I, O>>>) -> BoxedParser<'a, I, O>
where
    I: Token + 'a,
    O: 'a,
    P: Parser<I, O> + Send + Sync + 'a,
{
    table
        .into_iter()
        .fold(BoxedParser::new(term), |operand, operators| {
            BoxedParser::new(Tier::new(operand, operators))
        })
}

/// Like [`expression`], with a term that may contain the whole expression,
/// e.g. parenthesised sub-expressions.
pub fn expression_with<'a, I, O, F, P>(
    term: F,
    table: Vec<Vec<Operator<'a, I, O>>>,
) -> Recursive<'a, I, O>
where
    I: Token + 'a,
    O: 'a,
    F: FnOnce(RecursiveRef<'a, I, O>) -> P,
    P: Parser<I, O> + Send + Sync + 'a,
{
    recursive(move |expr| expression(term(expr), table))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::prelude::*;
    use pretty_assertions::assert_eq;

    fn show(op: char) -> impl Fn(String, String) -> String + Send + Sync + Clone {
        move |a, b| format!("({}{}{})", a, op, b)
    }

    fn atom() -> impl Parser<char, String> + Send + Sync + Clone {
        letter_or_digit().at_least_once_string()
    }

    #[test]
    fn test_precedence_and_left_association() {
        let parser = expression(
            atom(),
            vec![
                vec![Operator::infix_l(equal('*'), show('*'))],
                vec![
                    Operator::infix_l(equal('+'), show('+')),
                    Operator::infix_l(equal('-'), show('-')),
                ],
            ],
        );
        assert_eq!(
            parser.parse("1*2*3+4*5"),
            Ok("(((1*2)*3)+(4*5))".to_string())
        );
        assert_eq!(parser.parse("a-b+c"), Ok("((a-b)+c)".to_string()));
    }

    #[test]
    fn test_right_association() {
        let parser = expression(atom(), vec![vec![Operator::infix_r(equal('^'), show('^'))]]);
        assert_eq!(parser.parse("2^3^2"), Ok("(2^(3^2))".to_string()));
        assert_eq!(parser.parse("2"), Ok("2".to_string()));
    }

    #[test]
    fn test_non_associative_rejects_repeats() {
        let parser = expression(atom(), vec![vec![Operator::infix_n(equal('<'), show('<'))]]);
        assert_eq!(parser.parse("1<2"), Ok("(1<2)".to_string()));

        let error = parser.parse("1<2<3").unwrap_err();
        assert_eq!(error.location(), 3);
        assert_eq!(error.unexpected(), Some(&'<'));
        assert_eq!(error.message(), Some("non-associative operator cannot be chained"));
    }

    #[test]
    fn test_postfix_binds_tighter_than_prefix() {
        let parser = expression(
            atom(),
            vec![vec![
                Operator::prefix(equal('-'), |x| format!("(-{})", x)),
                Operator::postfix(equal('!'), |x| format!("({}!)", x)),
            ]],
        );
        assert_eq!(parser.parse("-x!"), Ok("(-(x!))".to_string()));
        // a plain prefix applies at most once
        assert!(parser.parse("--x").is_err());
    }

    #[test]
    fn test_chainable_operators() {
        let parser = expression(
            atom(),
            vec![vec![
                Operator::prefix_chainable(equal('~'), |x| format!("(~{})", x)),
                Operator::postfix_chainable(string("()"), |x| format!("({}())", x)),
            ]],
        );
        assert_eq!(parser.parse("~~x"), Ok("(~(~x))".to_string()));
        assert_eq!(parser.parse("f()()"), Ok("((f())())".to_string()));
        assert_eq!(parser.parse("~f()"), Ok("(~(f()))".to_string()));
    }

    #[test]
    fn test_parenthesised_terms() {
        let parser = expression_with(
            |expr| dec_num().or(expr.between(equal('('), equal(')'))),
            vec![
                vec![Operator::infix_l(equal('*'), |a: i64, b: i64| a * b)],
                vec![Operator::infix_l(equal('+'), |a: i64, b: i64| a + b)],
            ],
        );
        assert_eq!(parser.parse("(1+2)*3"), Ok(9));
        assert_eq!(parser.parse("2*(3+(4))"), Ok(14));
    }

    #[test]
    fn test_tier_partitions_infix_operators() {
        let tier = Tier::new(
            BoxedParser::new(atom()),
            vec![
                Operator::infix_r(equal('^'), show('^')),
                Operator::infix_l(equal('+'), show('+')),
                Operator::infix_n(equal('<'), show('<')),
                Operator::infix_l(equal('-'), show('-')),
            ],
        );
        let order: Vec<Fixity> = tier.infix.iter().map(|(_, (fixity, _))| *fixity).collect();
        assert_eq!(
            order,
            vec![Fixity::InfixN, Fixity::InfixL, Fixity::InfixL, Fixity::InfixR]
        );
        assert_eq!((tier.infix_l.len(), tier.infix_r.len()), (2, 1));
        // a left fold only continues with the tier's left operators
        assert_eq!(
            tier.parse_prefix("a+b-c^d"),
            Ok(("((a+b)-c)".to_string(), 5))
        );
    }

    #[test]
    fn test_fixity_names() {
        assert_eq!(Fixity::PrefixChainable.to_string(), "prefix_chainable");
        assert_eq!("infix_n".parse::<Fixity>(), Ok(Fixity::InfixN));
        assert!(Fixity::InfixR.is_infix());
        assert!(!Fixity::Postfix.is_infix());
    }
}
