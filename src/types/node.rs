use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use super::fact::Fact;

/// Resolved expression tree. Leaves hold facts shared with the catalog.
///
/// Equality and hashing are structural and commutative: facts compare by CPE
/// id and the operands of a group compare as a set, so `ntp or chrony` equals
/// `chrony or ntp`. Nodes produced by [`Platform`](crate::Platform) are in
/// canonical form (flattened, deduplicated, sorted); see [`Node::canonical_name`].
#[derive(Debug, Clone)]
pub enum Node {
    Fact(Arc<Fact>),
    Not(Box<Node>),
    And(Vec<Node>),
    Or(Vec<Node>),
}

/// Order-independent identity of a [`Node`], built from CPE ids.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum StructuralKey {
    Fact(String),
    Not(Box<StructuralKey>),
    And(BTreeSet<StructuralKey>),
    Or(BTreeSet<StructuralKey>),
}

impl Node {
    pub(crate) fn structural_key(&self) -> StructuralKey {
        match self {
            Node::Fact(fact) => StructuralKey::Fact(fact.cpe_id().to_owned()),
            Node::Not(inner) => StructuralKey::Not(Box::new(inner.structural_key())),
            Node::And(operands) => {
                StructuralKey::And(operands.iter().map(Node::structural_key).collect())
            }
            Node::Or(operands) => {
                StructuralKey::Or(operands.iter().map(Node::structural_key).collect())
            }
        }
    }

    /// Deterministic lowercase identifier, e.g. `systemd_and_chrony_or_ntp_and_not_yum`.
    ///
    /// Operands are joined in their stored order, so the name is only stable
    /// across equal inputs for canonical nodes.
    #[must_use]
    pub fn canonical_name(&self) -> String {
        match self {
            Node::Fact(fact) => fact.name().to_lowercase(),
            Node::Not(inner) => format!("not_{}", inner.canonical_name()),
            Node::And(operands) => join_names(operands, "_and_"),
            Node::Or(operands) => join_names(operands, "_or_"),
        }
    }

    /// Every fact leaf, in tree order. Duplicates are kept.
    #[must_use]
    pub fn facts(&self) -> Vec<&Arc<Fact>> {
        let mut out = Vec::new();
        collect_facts(self, &mut out);
        out
    }

    #[must_use]
    pub fn is_group(&self) -> bool {
        matches!(self, Node::And(_) | Node::Or(_))
    }
}

fn join_names(operands: &[Node], sep: &str) -> String {
    operands
        .iter()
        .map(Node::canonical_name)
        .collect::<Vec<_>>()
        .join(sep)
}

fn collect_facts<'a>(node: &'a Node, out: &mut Vec<&'a Arc<Fact>>) {
    match node {
        Node::Fact(fact) => out.push(fact),
        Node::Not(inner) => collect_facts(inner, out),
        Node::And(operands) | Node::Or(operands) => {
            for operand in operands {
                collect_facts(operand, out);
            }
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.structural_key() == other.structural_key()
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.structural_key().hash(state);
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Fact(fact) => write!(f, "{}", fact.name()),
            Node::Not(inner) => write!(f, "!{inner}"),
            Node::And(operands) | Node::Or(operands) => {
                let sep = if matches!(self, Node::And(_)) { " and " } else { " or " };
                write!(f, "(")?;
                for (i, operand) in operands.iter().enumerate() {
                    if i > 0 {
                        write!(f, "{sep}")?;
                    }
                    write!(f, "{operand}")?;
                }
                write!(f, ")")
            }
        }
    }
}
