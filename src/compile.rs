use log::trace;

use crate::catalog::FactCatalog;
use crate::types::{Expr, Node, ResolveError};

const LOG_TARGET: &str = "cpeal::compile";

/// Resolve every fact name in `expr` against `catalog`.
///
/// The first unknown name aborts resolution; no partial tree is returned.
pub(crate) fn resolve<C>(expr: &Expr, catalog: &C) -> Result<Node, ResolveError>
where
    C: FactCatalog + ?Sized,
{
    match expr {
        Expr::Fact(name) => match catalog.resolve(name) {
            Some(fact) => {
                trace!(target: LOG_TARGET, "resolved '{name}' to {}", fact.cpe_id());
                Ok(Node::Fact(fact))
            }
            None => Err(ResolveError::FactNotFound {
                name: name.clone(),
                product: catalog.product().to_owned(),
            }),
        },
        Expr::Not(inner) => Ok(Node::Not(Box::new(resolve(inner, catalog)?))),
        Expr::And(operands) => Ok(Node::And(resolve_all(operands, catalog)?)),
        Expr::Or(operands) => Ok(Node::Or(resolve_all(operands, catalog)?)),
    }
}

fn resolve_all<C>(operands: &[Expr], catalog: &C) -> Result<Vec<Node>, ResolveError>
where
    C: FactCatalog + ?Sized,
{
    operands.iter().map(|e| resolve(e, catalog)).collect()
}
