mod error;
mod expr;
mod fact;
mod field;
mod node;
mod platform;
mod rule;

pub use error::{CatalogError, NormalizeError, ReorderError, ResolveError};
pub use expr::{fact, Expr};
pub use fact::{Fact, FactCheck, PackageManager, MACHINE_ANSIBLE, MACHINE_BASH, MACHINE_CPE};
pub use field::{FieldMap, FieldValue};
pub(crate) use node::StructuralKey;
pub use node::Node;
pub use platform::{Platform, PlatformDict};
pub use rule::{Rule, GLOBAL_REFERENCES, SINGULAR_REFERENCES};
