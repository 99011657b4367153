use winnow::combinator::{alt, cut_err, delimited, opt, preceded, repeat};
use winnow::error::{ModalResult, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::take_while;

use crate::Expr;

const KEYWORDS: &[&str] = &["and", "or", "not"];

// -- Whitespace -------------------------------------------------------------

fn ws(input: &mut &str) -> ModalResult<()> {
    take_while(0.., |c: char| c.is_ascii_whitespace())
        .void()
        .parse_next(input)
}

// -- Words, keywords and identifiers ----------------------------------------

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')
}

fn is_keyword(word: &str) -> bool {
    KEYWORDS.iter().any(|kw| word.eq_ignore_ascii_case(kw))
}

fn word<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    take_while(1.., is_word_char).parse_next(input)
}

// Keywords are whole words, so `order` and `notify` stay identifiers.
fn keyword(input: &mut &str, kw: &str) -> ModalResult<()> {
    word.verify(|w: &str| w.eq_ignore_ascii_case(kw))
        .void()
        .parse_next(input)
}

fn and_kw(input: &mut &str) -> ModalResult<()> {
    keyword(input, "and")
}

fn or_kw(input: &mut &str) -> ModalResult<()> {
    keyword(input, "or")
}

fn not_kw(input: &mut &str) -> ModalResult<()> {
    keyword(input, "not")
}

fn identifier<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    word.verify(|w: &str| !is_keyword(w))
        .context(StrContext::Label("fact name"))
        .parse_next(input)
}

// -- Expressions (precedence: OR < AND < NOT < primary) ---------------------

fn primary(input: &mut &str) -> ModalResult<Expr> {
    ws.parse_next(input)?;
    alt((
        delimited(
            '(',
            cut_err(expr),
            (
                ws,
                cut_err(')').context(StrContext::Expected(StrContextValue::CharLiteral(')'))),
            ),
        ),
        identifier.map(|name: &str| Expr::Fact(name.to_owned())),
    ))
    .context(StrContext::Expected(StrContextValue::Description(
        "fact name or '('",
    )))
    .parse_next(input)
}

fn unary(input: &mut &str) -> ModalResult<Expr> {
    ws.parse_next(input)?;
    if opt(alt(('!'.void(), not_kw))).parse_next(input)?.is_some() {
        let inner = cut_err(unary).parse_next(input)?;
        Ok(Expr::Not(Box::new(inner)))
    } else {
        primary(input)
    }
}

fn group(first: Expr, rest: Vec<Expr>, make: fn(Vec<Expr>) -> Expr) -> Expr {
    if rest.is_empty() {
        return first;
    }
    let mut operands = Vec::with_capacity(rest.len() + 1);
    operands.push(first);
    operands.extend(rest);
    make(operands)
}

fn and_expr(input: &mut &str) -> ModalResult<Expr> {
    let first = unary(input)?;
    let rest: Vec<Expr> = repeat(0.., preceded((ws, and_kw), cut_err(unary))).parse_next(input)?;
    Ok(group(first, rest, Expr::And))
}

fn or_expr(input: &mut &str) -> ModalResult<Expr> {
    let first = and_expr(input)?;
    let rest: Vec<Expr> =
        repeat(0.., preceded((ws, or_kw), cut_err(and_expr))).parse_next(input)?;
    Ok(group(first, rest, Expr::Or))
}

fn expr(input: &mut &str) -> ModalResult<Expr> {
    ws.parse_next(input)?;
    or_expr(input)
}

// -- Top-level parser -------------------------------------------------------

pub fn expression(input: &mut &str) -> ModalResult<Expr> {
    let parsed = expr(input)?;
    ws.parse_next(input)?;
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use crate::parse::parse;
    use crate::{fact, Expr};

    #[test]
    fn parse_single_fact() {
        assert_eq!(parse("machine").unwrap(), fact("machine"));
    }

    #[test]
    fn parse_hyphenated_fact() {
        assert_eq!(parse("rhel7-workstation").unwrap(), fact("rhel7-workstation"));
    }

    #[test]
    fn parse_and_is_n_ary() {
        assert_eq!(
            parse("a and b and c").unwrap(),
            Expr::And(vec![fact("a"), fact("b"), fact("c")])
        );
    }

    #[test]
    fn parse_or_is_n_ary() {
        assert_eq!(
            parse("a or b or c").unwrap(),
            Expr::Or(vec![fact("a"), fact("b"), fact("c")])
        );
    }

    #[test]
    fn parse_bang_and_not() {
        assert_eq!(parse("!yum").unwrap(), !fact("yum"));
        assert_eq!(parse("not yum").unwrap(), !fact("yum"));
        assert_eq!(parse("!!yum").unwrap(), !!fact("yum"));
    }

    #[test]
    fn parse_precedence_and_before_or() {
        assert_eq!(
            parse("a or b and c").unwrap(),
            Expr::Or(vec![fact("a"), Expr::And(vec![fact("b"), fact("c")])])
        );
    }

    #[test]
    fn parse_not_binds_tighter_than_and() {
        assert_eq!(
            parse("!a and b").unwrap(),
            Expr::And(vec![!fact("a"), fact("b")])
        );
    }

    #[test]
    fn parse_parenthesized_grouping() {
        assert_eq!(
            parse("(a or b) and c").unwrap(),
            Expr::And(vec![Expr::Or(vec![fact("a"), fact("b")]), fact("c")])
        );
    }

    #[test]
    fn parse_redundant_parentheses_collapse() {
        assert_eq!(parse("((ntp))").unwrap(), fact("ntp"));
    }

    #[test]
    fn parse_keywords_are_case_insensitive() {
        assert_eq!(
            parse("a AND b Or NOT c").unwrap(),
            Expr::Or(vec![Expr::And(vec![fact("a"), fact("b")]), !fact("c")])
        );
    }

    #[test]
    fn parse_keyword_prefixes_are_identifiers() {
        assert_eq!(
            parse("order and notify or android").unwrap(),
            Expr::Or(vec![
                Expr::And(vec![fact("order"), fact("notify")]),
                fact("android"),
            ])
        );
    }

    #[test]
    fn parse_whitespace_insensitive() {
        assert_eq!(
            parse("  systemd\tand\n!yum and(ntp or chrony) ").unwrap(),
            parse("systemd and !yum and (ntp or chrony)").unwrap()
        );
    }

    #[test]
    fn parse_not_directly_before_paren() {
        assert_eq!(
            parse("not(a or b)").unwrap(),
            !Expr::Or(vec![fact("a"), fact("b")])
        );
    }

    #[test]
    fn reject_unbalanced_parentheses() {
        assert!(parse("(a and b").is_err());
        assert!(parse("a and b)").is_err());
    }

    #[test]
    fn reject_empty_operands() {
        assert!(parse("").is_err());
        assert!(parse("()").is_err());
        assert!(parse("a and").is_err());
        assert!(parse("or b").is_err());
        assert!(parse("!").is_err());
    }

    #[test]
    fn reject_unknown_operator() {
        assert!(parse("a & b").is_err());
        assert!(parse("a xor b").is_err());
    }

    #[test]
    fn reject_trailing_tokens() {
        let err = parse("ntp chrony").unwrap_err();
        assert_eq!(err.offset(), 4);
    }

    #[test]
    fn reject_keyword_as_fact() {
        assert!(parse("and").is_err());
        assert!(parse("a and or").is_err());
    }
}
