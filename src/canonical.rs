//! Canonical form of resolved expression trees.
//!
//! A canonical tree has no nested group of the same kind, no duplicate
//! operands, and no single-operand group. Operands are ordered facts first,
//! then `and`/`or` groups, then negations, alphabetically by canonical name
//! within each category. Remaining ties (distinct subtrees that happen to
//! share a name) fall back to the structural key. Negations are kept as
//! written, so `!!a` stays a double negation.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::types::{Node, StructuralKey};

/// Rewrite `node` into canonical form.
pub(crate) fn canonicalize(node: Node) -> Node {
    match node {
        Node::Fact(fact) => Node::Fact(fact),
        Node::Not(inner) => Node::Not(Box::new(canonicalize(*inner))),
        Node::And(operands) => canonical_group(operands, true),
        Node::Or(operands) => canonical_group(operands, false),
    }
}

fn canonical_group(operands: Vec<Node>, is_and: bool) -> Node {
    let mut flat = Vec::with_capacity(operands.len());
    for operand in operands {
        match (canonicalize(operand), is_and) {
            (Node::And(inner), true) | (Node::Or(inner), false) => flat.extend(inner),
            (other, _) => flat.push(other),
        }
    }

    let mut keyed: Vec<(SortKey, Node)> = flat
        .into_iter()
        .map(|node| (SortKey::new(&node, node.structural_key()), node))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| a.cmp(b));

    // Equal operands may carry different names; the smallest name survives.
    let mut seen = HashSet::with_capacity(keyed.len());
    let mut sorted: Vec<Node> = keyed
        .into_iter()
        .filter(|(sort_key, _)| seen.insert(sort_key.key.clone()))
        .map(|(_, node)| node)
        .collect();
    if sorted.len() == 1 {
        return sorted.remove(0);
    }
    if is_and {
        Node::And(sorted)
    } else {
        Node::Or(sorted)
    }
}

#[derive(Debug, PartialEq, Eq)]
struct SortKey {
    category: u8,
    name: String,
    key: StructuralKey,
}

impl SortKey {
    fn new(node: &Node, key: StructuralKey) -> Self {
        let category = match node {
            Node::Fact(_) => 0,
            Node::And(_) | Node::Or(_) => 1,
            Node::Not(_) => 2,
        };
        Self {
            category,
            name: node.canonical_name(),
            key,
        }
    }
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.category
            .cmp(&other.category)
            .then_with(|| self.name.cmp(&other.name))
            .then_with(|| self.key.cmp(&other.key))
    }
}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
