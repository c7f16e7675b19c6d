use std::collections::HashMap;

use crate::config::schema::{AccessLevel, AccessRule};

use super::access::{Operation, Principal};

/// Yes/no authorization gate consulted before every management call.
pub trait Authorizer: Send + Sync {
    fn allows(&self, principal: &Principal, op: Operation) -> bool;
}

/// Principal -> access level, compiled once from config.
/// Unknown principals (including anonymous) are denied everything.
#[derive(Debug, Default)]
pub struct AccessTable {
    levels: HashMap<String, AccessLevel>,
}

impl AccessTable {
    /// Later rules for the same principal replace earlier ones; config
    /// validation already rejects duplicates.
    pub fn from_rules(rules: &[AccessRule]) -> Self {
        let levels = rules
            .iter()
            .map(|r| (r.principal.clone(), r.level))
            .collect();
        Self { levels }
    }

    pub fn level_of(&self, principal: &Principal) -> Option<AccessLevel> {
        self.levels.get(principal.name()).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

impl Authorizer for AccessTable {
    fn allows(&self, principal: &Principal, op: Operation) -> bool {
        self.level_of(principal).is_some_and(|level| level.permits(op))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> AccessTable {
        AccessTable::from_rules(&[
            AccessRule { principal: "root".into(), level: AccessLevel::Readonly },
            AccessRule { principal: "ingest".into(), level: AccessLevel::Readwrite },
        ])
    }

    #[test]
    fn levels_are_enforced() {
        let t = table();
        assert!(t.allows(&Principal::new("root"), Operation::Read));
        assert!(!t.allows(&Principal::new("root"), Operation::Write));
        assert!(t.allows(&Principal::new("ingest"), Operation::Write));
    }

    #[test]
    fn unknown_principals_are_denied() {
        let t = table();
        assert!(!t.allows(&Principal::anonymous(), Operation::List));
        assert!(!t.allows(&Principal::new("Root"), Operation::List));
    }
}
