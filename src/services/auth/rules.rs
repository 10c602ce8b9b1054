/*
 * Responsibility
 * - operation name → required capability (static table, built once at startup)
 * - decision for a caller (anonymous / authenticated + capabilities)
 * - what to do with operations missing from the table is an explicit startup choice
 */
use std::collections::HashMap;
use std::str::FromStr;

use crate::services::auth::scopes::CapabilitySet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationRule {
    /// Anyone, with or without a token.
    Public,
    /// Any caller with a verified token, regardless of scopes.
    Authenticated,
    /// Verified caller whose scopes contain this exact capability.
    Capability(String),
}

impl OperationRule {
    pub fn capability(c: impl Into<String>) -> Self {
        Self::Capability(c.into())
    }
}

/// Policy for operations that have no entry in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlistedPolicy {
    Allow,
    Deny,
}

impl FromStr for UnlistedPolicy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "allow" | "public" => Ok(Self::Allow),
            "deny" => Ok(Self::Deny),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

/// What the rule engine needs to know about the caller.
#[derive(Debug, Clone, Copy)]
pub struct Caller<'a> {
    pub authenticated: bool,
    pub capabilities: &'a CapabilitySet,
}

impl<'a> Caller<'a> {
    pub fn anonymous(capabilities: &'a CapabilitySet) -> Self {
        Self {
            authenticated: false,
            capabilities,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: HashMap<String, OperationRule>,
    unlisted: UnlistedPolicy,
}

impl RuleTable {
    pub fn new(unlisted: UnlistedPolicy) -> Self {
        Self {
            rules: HashMap::new(),
            unlisted,
        }
    }

    pub fn with_rule(mut self, operation: impl Into<String>, rule: OperationRule) -> Self {
        self.rules.insert(operation.into(), rule);
        self
    }

    pub fn rule_for(&self, operation: &str) -> Option<&OperationRule> {
        self.rules.get(operation)
    }

    pub fn unlisted_policy(&self) -> UnlistedPolicy {
        self.unlisted
    }

    pub fn authorize(&self, operation: &str, caller: Caller<'_>) -> Decision {
        let allowed = match self.rules.get(operation) {
            Some(OperationRule::Public) => true,
            Some(OperationRule::Authenticated) => caller.authenticated,
            Some(OperationRule::Capability(required)) => {
                caller.authenticated && caller.capabilities.contains(required)
            }
            None => self.unlisted == UnlistedPolicy::Allow,
        };

        if allowed { Decision::Allow } else { Decision::Deny }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(unlisted: UnlistedPolicy) -> RuleTable {
        RuleTable::new(unlisted)
            .with_rule("ping", OperationRule::Public)
            .with_rule("viewer", OperationRule::Authenticated)
            .with_rule("events", OperationRule::capability("read:events"))
            .with_rule("createEvent", OperationRule::capability("write:events"))
    }

    fn authed(caps: &CapabilitySet) -> Caller<'_> {
        Caller {
            authenticated: true,
            capabilities: caps,
        }
    }

    #[test]
    fn public_rule_allows_everyone() {
        let none = CapabilitySet::empty();
        let t = table(UnlistedPolicy::Deny);
        assert_eq!(t.authorize("ping", Caller::anonymous(&none)), Decision::Allow);
        assert_eq!(t.authorize("ping", authed(&none)), Decision::Allow);
    }

    #[test]
    fn capability_rule_requires_exact_membership() {
        let t = table(UnlistedPolicy::Allow);
        let writer = CapabilitySet::from_scope("write:events");

        assert_eq!(t.authorize("events", authed(&writer)), Decision::Deny);
        assert_eq!(t.authorize("createEvent", authed(&writer)), Decision::Allow);
    }

    #[test]
    fn anonymous_caller_is_denied_gated_operations() {
        let none = CapabilitySet::empty();
        let t = table(UnlistedPolicy::Allow);
        assert_eq!(t.authorize("events", Caller::anonymous(&none)), Decision::Deny);
        assert_eq!(t.authorize("viewer", Caller::anonymous(&none)), Decision::Deny);
    }

    #[test]
    fn authenticated_tier_ignores_scopes() {
        let none = CapabilitySet::empty();
        let t = table(UnlistedPolicy::Deny);
        assert_eq!(t.authorize("viewer", authed(&none)), Decision::Allow);
    }

    #[test]
    fn unlisted_operations_follow_configured_policy() {
        let none = CapabilitySet::empty();
        assert_eq!(
            table(UnlistedPolicy::Allow).authorize("mystery", Caller::anonymous(&none)),
            Decision::Allow
        );
        assert_eq!(
            table(UnlistedPolicy::Deny).authorize("mystery", authed(&none)),
            Decision::Deny
        );
    }

    #[test]
    fn parses_policy_names() {
        assert_eq!("allow".parse::<UnlistedPolicy>(), Ok(UnlistedPolicy::Allow));
        assert_eq!(" DENY ".parse::<UnlistedPolicy>(), Ok(UnlistedPolicy::Deny));
        assert!("maybe".parse::<UnlistedPolicy>().is_err());
    }
}
