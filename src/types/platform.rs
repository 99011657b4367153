use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};

use super::fact::Fact;
use super::node::Node;
use crate::catalog::FactCatalog;
use crate::generate::{self, Ansible, Shell};

const LOG_TARGET: &str = "cpeal::platform";

/// A compiled applicability expression.
///
/// Built from expression text and a [`FactCatalog`], immutable afterwards.
/// Two platforms are equal when their expressions are equal up to operand
/// order, grouping and duplicates, regardless of how they were written.
///
/// # Example
///
/// ```
/// use cpeal::{Platform, ProductCatalog};
///
/// let catalog = ProductCatalog::builder("rhel7")
///     .package("ntp")
///     .package("chrony")
///     .build()
///     .unwrap();
///
/// let platform = Platform::from_text("ntp or chrony", &catalog).unwrap();
/// assert_eq!(platform.name(), "chrony_or_ntp");
/// assert_eq!(
///     platform.to_bash_conditional(),
///     "( rpm --quiet -q chrony || rpm --quiet -q ntp )"
/// );
/// assert_eq!(platform, Platform::from_text("chrony or ntp", &catalog).unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct Platform {
    name: String,
    original_expression: String,
    node: Node,
}

/// Serialized form of a [`Platform`], as stored alongside compiled rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformDict {
    pub name: String,
    pub ansible_conditional: String,
    pub bash_conditional: String,
    pub xml_content: Vec<u8>,
}

impl Platform {
    /// Parse `text`, resolve its facts against `catalog`, and canonicalize.
    ///
    /// # Errors
    ///
    /// Returns [`CpealError::Parse`](crate::CpealError::Parse) for malformed
    /// text and [`CpealError::Resolve`](crate::CpealError::Resolve) for facts
    /// the catalog does not know.
    pub fn from_text<C>(text: &str, catalog: &C) -> Result<Self, crate::CpealError>
    where
        C: FactCatalog + ?Sized,
    {
        let expr = crate::parse::parse(text)?;
        let node = crate::compile::resolve(&expr, catalog)?;
        let platform = Self::from_node(node, text);
        debug!(
            target: LOG_TARGET,
            "compiled platform '{}' from '{text}' for '{}'",
            platform.name,
            catalog.product()
        );
        Ok(platform)
    }

    fn from_node(node: Node, original_expression: &str) -> Self {
        let node = crate::canonical::canonicalize(node);
        Self {
            name: node.canonical_name(),
            original_expression: original_expression.to_owned(),
            node,
        }
    }

    /// Canonical name, used as the CPE-AL platform id and in file names.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The expression text this platform was compiled from.
    #[must_use]
    pub fn original_expression(&self) -> &str {
        &self.original_expression
    }

    /// The canonical resolved expression tree.
    #[must_use]
    pub fn node(&self) -> &Node {
        &self.node
    }

    /// Every distinct fact referenced, in canonical order. Facts that need no
    /// runtime check are included.
    #[must_use]
    pub fn fact_refs(&self) -> Vec<&Arc<Fact>> {
        let mut seen = std::collections::HashSet::new();
        self.node
            .facts()
            .into_iter()
            .filter(|fact| seen.insert(fact.cpe_id().to_owned()))
            .collect()
    }

    /// Shell conditional. Empty when the platform always applies.
    #[must_use]
    pub fn to_bash_conditional(&self) -> String {
        generate::conditional::<Shell>(&self.node)
    }

    /// Ansible conditional. Empty when the platform always applies.
    #[must_use]
    pub fn to_ansible_conditional(&self) -> String {
        generate::conditional::<Ansible>(&self.node)
    }

    /// CPE-AL `platform` document, byte-exact.
    #[must_use]
    pub fn to_xml_element(&self) -> Vec<u8> {
        generate::xml_element(&self.name, &self.node)
    }

    #[must_use]
    pub fn to_dict(&self) -> PlatformDict {
        PlatformDict {
            name: self.name.clone(),
            ansible_conditional: self.to_ansible_conditional(),
            bash_conditional: self.to_bash_conditional(),
            xml_content: self.to_xml_element(),
        }
    }
}

impl PartialEq for Platform {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node
    }
}

impl Eq for Platform {}

impl Hash for Platform {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.node.hash(state);
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
