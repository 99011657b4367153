//! Fact catalogs: the lookup service that turns fact names into CPE-backed
//! [`Fact`]s for one product.
//!
//! A catalog is built once per product, either programmatically with
//! [`ProductCatalogBuilder`] or from a YAML document, and is read-only
//! afterwards. It can be shared across threads behind an `Arc`.
//!
//! ## YAML format
//!
//! ```yaml
//! product: rhel7
//! package_manager: rpm
//! product_cpes:
//!   rhel7:
//!     name: "cpe:/o:redhat:enterprise_linux:7"
//!     title: Red Hat Enterprise Linux 7
//! platform_cpes:
//!   machine:
//!     name: "cpe:/a:machine"
//!     bash_conditional: "[ ! -f /.dockerenv ]"
//!     ansible_conditional: "ansible_virtualization_type != \"docker\""
//!   ntp: {}
//! ```
//!
//! A platform CPE without conditionals is a package-presence check; its CPE
//! name defaults to `cpe:/a:<key>` and its package to `<key>`.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

use log::debug;
use serde::Deserialize;

use crate::types::{CatalogError, Fact, FactCheck, PackageManager};

const LOG_TARGET: &str = "cpeal::catalog";

/// Resolves fact names for the product being built.
pub trait FactCatalog {
    /// The product this catalog resolves facts for.
    fn product(&self) -> &str;

    /// Look up a fact by its source name. `None` if the catalog has no entry.
    fn resolve(&self, name: &str) -> Option<Arc<Fact>>;
}

impl<C: FactCatalog + ?Sized> FactCatalog for &C {
    fn product(&self) -> &str {
        (**self).product()
    }

    fn resolve(&self, name: &str) -> Option<Arc<Fact>> {
        (**self).resolve(name)
    }
}

impl<C: FactCatalog + ?Sized> FactCatalog for Arc<C> {
    fn product(&self) -> &str {
        (**self).product()
    }

    fn resolve(&self, name: &str) -> Option<Arc<Fact>> {
        (**self).resolve(name)
    }
}

/// Immutable snapshot of the facts known for one product.
#[derive(Debug, Clone)]
pub struct ProductCatalog {
    product: String,
    package_manager: PackageManager,
    facts: HashMap<String, Arc<Fact>>,
}

impl ProductCatalog {
    /// Start building a catalog for `product`.
    #[must_use]
    pub fn builder(product: &str) -> ProductCatalogBuilder {
        ProductCatalogBuilder::new(product)
    }

    #[must_use]
    pub fn package_manager(&self) -> PackageManager {
        self.package_manager
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Fact names known to this catalog, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.facts.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Parse a catalog from its YAML form.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] on malformed YAML, duplicate fact names, or a
    /// custom fact missing one of its conditionals.
    pub fn from_yaml_str(input: &str) -> Result<Self, CatalogError> {
        let config: CatalogConfig = serde_yaml::from_str(input)?;
        config.into_catalog()
    }

    /// Read a YAML catalog file.
    ///
    /// # Errors
    ///
    /// Returns [`CpealError`](crate::CpealError) on I/O or catalog failure.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, crate::CpealError> {
        let input = std::fs::read_to_string(path)?;
        Ok(Self::from_yaml_str(&input)?)
    }
}

impl FactCatalog for ProductCatalog {
    fn product(&self) -> &str {
        &self.product
    }

    fn resolve(&self, name: &str) -> Option<Arc<Fact>> {
        self.facts.get(name).cloned()
    }
}

/// Builder for a [`ProductCatalog`].
///
/// # Example
///
/// ```
/// use cpeal::{FactCatalog, ProductCatalog};
///
/// let catalog = ProductCatalog::builder("rhel7")
///     .product_cpe("rhel7", "cpe:/o:redhat:enterprise_linux:7")
///     .machine()
///     .package("ntp")
///     .package("chrony")
///     .build()
///     .unwrap();
///
/// assert!(catalog.resolve("ntp").is_some());
/// assert!(catalog.resolve("bogus").is_none());
/// ```
#[derive(Debug)]
pub struct ProductCatalogBuilder {
    product: String,
    package_manager: PackageManager,
    facts: Vec<Fact>,
}

impl ProductCatalogBuilder {
    #[must_use]
    pub fn new(product: &str) -> Self {
        Self {
            product: product.to_owned(),
            package_manager: PackageManager::default(),
            facts: Vec::new(),
        }
    }

    /// Package manager used by packages added after this call.
    #[must_use]
    pub fn package_manager(mut self, manager: PackageManager) -> Self {
        self.package_manager = manager;
        self
    }

    /// A product identity CPE. Always true for builds of this product.
    #[must_use]
    pub fn product_cpe(mut self, name: &str, cpe_id: &str) -> Self {
        self.facts
            .push(Fact::new(name, cpe_id, FactCheck::ProductIdentity));
        self
    }

    /// A package-presence fact with CPE `cpe:/a:<name>`.
    #[must_use]
    pub fn package(mut self, name: &str) -> Self {
        self.facts.push(Fact::package(name, self.package_manager));
        self
    }

    /// A package-presence fact whose name, CPE, or package differ.
    #[must_use]
    pub fn package_named(mut self, name: &str, cpe_id: &str, package: &str) -> Self {
        self.facts.push(Fact::new(
            name,
            cpe_id,
            FactCheck::Package {
                package: package.to_owned(),
                manager: self.package_manager,
            },
        ));
        self
    }

    /// A fact checked by bespoke predicates.
    #[must_use]
    pub fn custom(mut self, name: &str, cpe_id: &str, bash: &str, ansible: &str) -> Self {
        self.facts.push(Fact::new(
            name,
            cpe_id,
            FactCheck::Custom {
                bash: bash.to_owned(),
                ansible: ansible.to_owned(),
            },
        ));
        self
    }

    /// The built-in `machine` fact (not running in a container).
    #[must_use]
    pub fn machine(mut self) -> Self {
        self.facts.push(Fact::machine());
        self
    }

    #[must_use]
    pub fn fact(mut self, fact: Fact) -> Self {
        self.facts.push(fact);
        self
    }

    /// Freeze the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateFact`] if two facts share a name.
    pub fn build(self) -> Result<ProductCatalog, CatalogError> {
        let mut facts = HashMap::with_capacity(self.facts.len());
        for fact in self.facts {
            let name = fact.name().to_owned();
            if facts.insert(name.clone(), Arc::new(fact)).is_some() {
                return Err(CatalogError::DuplicateFact { name });
            }
        }
        debug!(
            target: LOG_TARGET,
            "built catalog for '{}' with {} facts",
            self.product,
            facts.len()
        );
        Ok(ProductCatalog {
            product: self.product,
            package_manager: self.package_manager,
            facts,
        })
    }
}

// -- YAML configuration -----------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogConfig {
    product: String,
    #[serde(default)]
    package_manager: PackageManager,
    #[serde(default)]
    product_cpes: BTreeMap<String, ProductCpeConfig>,
    #[serde(default)]
    platform_cpes: BTreeMap<String, PlatformCpeConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProductCpeConfig {
    name: String,
    title: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PlatformCpeConfig {
    name: Option<String>,
    title: Option<String>,
    package: Option<String>,
    bash_conditional: Option<String>,
    ansible_conditional: Option<String>,
}

impl CatalogConfig {
    fn into_catalog(self) -> Result<ProductCatalog, CatalogError> {
        let mut builder =
            ProductCatalogBuilder::new(&self.product).package_manager(self.package_manager);

        for (key, cpe) in self.product_cpes {
            let mut fact = Fact::new(key, cpe.name, FactCheck::ProductIdentity);
            if let Some(title) = cpe.title {
                fact = fact.with_title(title);
            }
            builder = builder.fact(fact);
        }

        for (key, cpe) in self.platform_cpes {
            let cpe_id = cpe.name.unwrap_or_else(|| format!("cpe:/a:{key}"));
            let check = match (cpe.bash_conditional, cpe.ansible_conditional) {
                (Some(bash), Some(ansible)) => FactCheck::Custom { bash, ansible },
                (None, None) => FactCheck::Package {
                    package: cpe.package.unwrap_or_else(|| key.clone()),
                    manager: self.package_manager,
                },
                _ => return Err(CatalogError::IncompleteCustomFact { name: key }),
            };
            let mut fact = Fact::new(key, cpe_id, check);
            if let Some(title) = cpe.title {
                fact = fact.with_title(title);
            }
            builder = builder.fact(fact);
        }

        builder.build()
    }
}
