use std::fmt;

use serde::{Deserialize, Serialize};

/// Bash predicate of the built-in `machine` fact: true outside containers.
pub const MACHINE_BASH: &str = "[ ! -f /.dockerenv ] && [ ! -f /run/.containerenv ]";

/// Ansible predicate of the built-in `machine` fact.
pub const MACHINE_ANSIBLE: &str =
    r#"ansible_virtualization_type not in ["docker", "lxc", "openvz", "podman", "container"]"#;

/// CPE name of the built-in `machine` fact.
pub const MACHINE_CPE: &str = "cpe:/a:machine";

/// Package manager used by the product to answer package-presence checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    #[default]
    Rpm,
    Dpkg,
}

impl PackageManager {
    /// Shell command that exits 0 when `package` is installed.
    #[must_use]
    pub fn bash_check(self, package: &str) -> String {
        match self {
            PackageManager::Rpm => format!("rpm --quiet -q {package}"),
            PackageManager::Dpkg => format!(
                "dpkg-query --show --showformat='${{db:Status-Status}}\\n' '{package}' 2>/dev/null | grep -q '^installed$'"
            ),
        }
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackageManager::Rpm => write!(f, "rpm"),
            PackageManager::Dpkg => write!(f, "dpkg"),
        }
    }
}

/// How a fact is checked on the target system.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FactCheck {
    /// The product currently being built. Always true at build time, so no
    /// runtime check is emitted for it.
    ProductIdentity,
    /// The named package is installed.
    Package {
        package: String,
        manager: PackageManager,
    },
    /// Bespoke predicates, one per conditional syntax.
    Custom { bash: String, ansible: String },
}

/// An atomic platform property resolved from a [`FactCatalog`](crate::FactCatalog).
///
/// Immutable once resolved; expression nodes share it behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fact {
    name: String,
    cpe_id: String,
    title: Option<String>,
    check: FactCheck,
}

impl Fact {
    pub fn new(name: impl Into<String>, cpe_id: impl Into<String>, check: FactCheck) -> Self {
        Self {
            name: name.into(),
            cpe_id: cpe_id.into(),
            title: None,
            check,
        }
    }

    /// A package-presence fact named after its package, with CPE `cpe:/a:<name>`.
    pub fn package(name: &str, manager: PackageManager) -> Self {
        Self::new(
            name,
            format!("cpe:/a:{name}"),
            FactCheck::Package {
                package: name.to_owned(),
                manager,
            },
        )
    }

    /// The built-in fact that holds on bare-metal and VM installs, not in containers.
    pub fn machine() -> Self {
        Self::new(
            "machine",
            MACHINE_CPE,
            FactCheck::Custom {
                bash: MACHINE_BASH.to_owned(),
                ansible: MACHINE_ANSIBLE.to_owned(),
            },
        )
        .with_title("Bare-metal or Virtual Machine")
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn cpe_id(&self) -> &str {
        &self.cpe_id
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    #[must_use]
    pub fn check(&self) -> &FactCheck {
        &self.check
    }

    /// `false` for the product identity being built, which holds by construction.
    #[must_use]
    pub fn needs_runtime_check(&self) -> bool {
        !matches!(self.check, FactCheck::ProductIdentity)
    }
}
