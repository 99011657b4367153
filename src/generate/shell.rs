use super::Dialect;
use crate::types::{Fact, FactCheck};

/// POSIX shell conditionals, e.g. `( rpm --quiet -q chrony || rpm --quiet -q ntp )`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Shell;

impl Dialect for Shell {
    const AND: &'static str = " && ";
    const OR: &'static str = " || ";
    const NOT: &'static str = "! ";
    const NEVER: &'static str = "false";

    fn predicate(fact: &Fact) -> Option<String> {
        match fact.check() {
            FactCheck::ProductIdentity => None,
            FactCheck::Package { package, manager } => Some(manager.bash_check(package)),
            FactCheck::Custom { bash, .. } => Some(bash.clone()),
        }
    }
}
