//! Backends that turn a resolved [`Node`] into target syntax.
//!
//! The shell and Ansible backends share one walk: facts that need no runtime
//! check fold to `true`, constants propagate through `and`/`or`/`not`, and
//! whatever survives is rendered by a [`Dialect`]. The CPE-AL backend renders
//! the full tree with no folding.

mod ansible;
mod cpe_al;
mod shell;

pub use ansible::{Ansible, PACKAGES_FACT};
pub use cpe_al::{xml_element, CPE_LANG_NS};
pub use shell::Shell;

use crate::types::{Fact, Node};

/// Surface syntax of a boolean conditional language.
pub trait Dialect {
    /// Operator joining `and` operands, including surrounding spaces.
    const AND: &'static str;
    /// Operator joining `or` operands, including surrounding spaces.
    const OR: &'static str;
    /// Prefix for a negated, parenthesized operand.
    const NOT: &'static str;
    /// Rendering of a conditional that can never hold.
    const NEVER: &'static str;

    /// Predicate for a fact that needs a runtime check, or `None` for a
    /// fact that is always true in this build.
    fn predicate(fact: &Fact) -> Option<String>;
}

/// Render `node` in dialect `D`. An always-true conditional renders as the
/// empty string.
pub fn conditional<D: Dialect>(node: &Node) -> String {
    match fold::<D>(node) {
        Folded::Always => String::new(),
        Folded::Never => D::NEVER.to_owned(),
        Folded::Check { text, .. } => text,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Folded {
    Always,
    Never,
    Check {
        text: String,
        /// Contains a top-level binary operator and needs parentheses when
        /// it shares a group with other operands.
        compound: bool,
    },
}

fn fold<D: Dialect>(node: &Node) -> Folded {
    match node {
        Node::Fact(fact) => match D::predicate(fact) {
            Some(text) => {
                let compound = text.contains(D::AND) || text.contains(D::OR);
                Folded::Check { text, compound }
            }
            None => Folded::Always,
        },
        Node::Not(inner) => match fold::<D>(inner) {
            Folded::Always => Folded::Never,
            Folded::Never => Folded::Always,
            Folded::Check { text, .. } => Folded::Check {
                text: format!("{}( {text} )", D::NOT),
                compound: false,
            },
        },
        Node::And(operands) => fold_group::<D>(operands, D::AND, Folded::Never, Folded::Always),
        Node::Or(operands) => fold_group::<D>(operands, D::OR, Folded::Always, Folded::Never),
    }
}

/// `absorbing` short-circuits the whole group; `identity` operands drop out.
fn fold_group<D: Dialect>(
    operands: &[Node],
    sep: &str,
    absorbing: Folded,
    identity: Folded,
) -> Folded {
    let mut checks = Vec::with_capacity(operands.len());
    for operand in operands {
        let folded = fold::<D>(operand);
        if folded == absorbing {
            return absorbing;
        }
        if let Folded::Check { text, compound } = folded {
            checks.push((text, compound));
        }
    }
    if checks.is_empty() {
        return identity;
    }

    let shared = checks.len() > 1;
    let parts: Vec<String> = checks
        .into_iter()
        .map(|(text, compound)| {
            if compound && shared {
                format!("( {text} )")
            } else {
                text
            }
        })
        .collect();
    Folded::Check {
        text: format!("( {} )", parts.join(sep)),
        compound: false,
    }
}
