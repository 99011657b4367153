//! Compiler for CPE applicability expressions.
//!
//! Expressions such as `systemd and !yum and (ntp or chrony)` are parsed,
//! resolved against a per-product [`FactCatalog`], and canonicalized into a
//! [`Platform`] that renders to a shell conditional, an Ansible `when`
//! clause, and a CPE-AL XML document. Rule records carrying
//! `field@product` overrides are made product specific by
//! [`Rule::normalize`].

mod canonical;
mod catalog;
mod compile;
mod error;
pub mod generate;
pub mod normalize;
pub mod parse;
mod reorder;
mod types;

pub use catalog::{FactCatalog, ProductCatalog, ProductCatalogBuilder};
pub use error::CpealError;
pub use normalize::OverridePolicy;
pub use parse::{parse, ParseError};
pub use reorder::{reorder_according_to_ordering, PriorityOrder};
pub use types::{
    fact, CatalogError, Expr, Fact, FactCheck, FieldMap, FieldValue, Node, NormalizeError,
    PackageManager, Platform, PlatformDict, ReorderError, ResolveError, Rule, GLOBAL_REFERENCES,
    MACHINE_ANSIBLE, MACHINE_BASH, MACHINE_CPE, SINGULAR_REFERENCES,
};
