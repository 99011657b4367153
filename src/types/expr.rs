use std::fmt;
use std::ops::Not;

/// User-facing expression AST. Leaves are unresolved fact names.
/// Transformed into a [`Node`](super::Node) once every name is resolved
/// against a [`FactCatalog`](crate::FactCatalog).
///
/// `And` and `Or` hold at least two operands; the parser and the builder
/// helpers never produce a single-operand group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Fact(String),
    Not(Box<Expr>),
    And(Vec<Expr>),
    Or(Vec<Expr>),
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Fact(name) => write!(f, "{name}"),
            Expr::Not(inner) => write!(f, "!{inner}"),
            Expr::And(operands) => write_group(f, operands, " and "),
            Expr::Or(operands) => write_group(f, operands, " or "),
        }
    }
}

fn write_group(f: &mut fmt::Formatter<'_>, operands: &[Expr], sep: &str) -> fmt::Result {
    write!(f, "(")?;
    for (i, operand) in operands.iter().enumerate() {
        if i > 0 {
            write!(f, "{sep}")?;
        }
        write!(f, "{operand}")?;
    }
    write!(f, ")")
}

impl Expr {
    /// Conjunction with `other`. Chained calls extend the same group.
    #[must_use]
    pub fn and(self, other: Expr) -> Expr {
        match self {
            Expr::And(mut operands) => {
                operands.push(other);
                Expr::And(operands)
            }
            first => Expr::And(vec![first, other]),
        }
    }

    /// Disjunction with `other`. Chained calls extend the same group.
    #[must_use]
    pub fn or(self, other: Expr) -> Expr {
        match self {
            Expr::Or(mut operands) => {
                operands.push(other);
                Expr::Or(operands)
            }
            first => Expr::Or(vec![first, other]),
        }
    }

    /// Every fact name referenced by this expression, in source order.
    #[must_use]
    pub fn fact_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        collect_fact_names(self, &mut names);
        names
    }
}

fn collect_fact_names<'a>(expr: &'a Expr, out: &mut Vec<&'a str>) {
    match expr {
        Expr::Fact(name) => out.push(name),
        Expr::Not(inner) => collect_fact_names(inner, out),
        Expr::And(operands) | Expr::Or(operands) => {
            for operand in operands {
                collect_fact_names(operand, out);
            }
        }
    }
}

impl Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        Expr::Not(Box::new(self))
    }
}

#[must_use]
pub fn fact(name: &str) -> Expr {
    Expr::Fact(name.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fact_creates_expr() {
        assert_eq!(fact("ntp"), Expr::Fact("ntp".to_owned()));
    }

    #[test]
    fn and_chaining_stays_flat() {
        let expr = fact("a").and(fact("b")).and(fact("c"));
        assert_eq!(expr, Expr::And(vec![fact("a"), fact("b"), fact("c")]));
    }

    #[test]
    fn or_inside_and_is_nested() {
        let expr = fact("a").and(fact("b").or(fact("c")));
        match expr {
            Expr::And(operands) => {
                assert_eq!(operands.len(), 2);
                assert!(matches!(&operands[1], Expr::Or(inner) if inner.len() == 2));
            }
            other => panic!("expected And, got {other:?}"),
        }
    }

    #[test]
    fn not_expr() {
        let expr = !fact("yum");
        assert_eq!(expr, Expr::Not(Box::new(fact("yum"))));
    }

    #[test]
    fn display_round_trips_structure() {
        let expr = fact("systemd").and(!fact("yum")).and(fact("ntp").or(fact("chrony")));
        assert_eq!(expr.to_string(), "(systemd and !yum and (ntp or chrony))");
    }

    #[test]
    fn fact_names_in_source_order() {
        let expr = fact("systemd").and(!fact("yum")).and(fact("ntp").or(fact("chrony")));
        assert_eq!(expr.fact_names(), vec!["systemd", "yum", "ntp", "chrony"]);
    }
}
