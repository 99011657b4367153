use super::Dialect;
use crate::types::{Fact, FactCheck};

/// Collection of installed packages gathered by Ansible's `package_facts`.
pub const PACKAGES_FACT: &str = "ansible_facts.packages";

/// Ansible `when:` conditionals, e.g. `( "chrony" in ansible_facts.packages )`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ansible;

impl Dialect for Ansible {
    const AND: &'static str = " and ";
    const OR: &'static str = " or ";
    const NOT: &'static str = "not ";
    const NEVER: &'static str = "False";

    fn predicate(fact: &Fact) -> Option<String> {
        match fact.check() {
            FactCheck::ProductIdentity => None,
            FactCheck::Package { package, .. } => Some(format!("\"{package}\" in {PACKAGES_FACT}")),
            FactCheck::Custom { ansible, .. } => Some(ansible.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::generate::conditional;
    use crate::{Node, PackageManager};

    fn pkg(name: &str) -> Node {
        Node::Fact(Arc::new(Fact::package(name, PackageManager::Rpm)))
    }

    #[test]
    fn package_check() {
        assert_eq!(
            conditional::<Ansible>(&pkg("ntp")),
            "\"ntp\" in ansible_facts.packages"
        );
    }

    #[test]
    fn custom_check() {
        let node = Node::Fact(Arc::new(Fact::machine()));
        assert_eq!(
            conditional::<Ansible>(&node),
            "ansible_virtualization_type not in [\"docker\", \"lxc\", \"openvz\", \"podman\", \"container\"]"
        );
    }

    #[test]
    fn groups_and_negation() {
        let node = Node::And(vec![
            pkg("systemd"),
            Node::Or(vec![pkg("chrony"), pkg("ntp")]),
            Node::Not(Box::new(pkg("yum"))),
        ]);
        assert_eq!(
            conditional::<Ansible>(&node),
            "( \"systemd\" in ansible_facts.packages and ( \"chrony\" in ansible_facts.packages or \"ntp\" in ansible_facts.packages ) and not ( \"yum\" in ansible_facts.packages ) )"
        );
    }

    #[test]
    fn package_manager_does_not_change_ansible_check() {
        let node = Node::Fact(Arc::new(Fact::package("chrony", PackageManager::Dpkg)));
        assert_eq!(
            conditional::<Ansible>(&node),
            "\"chrony\" in ansible_facts.packages"
        );
    }
}
