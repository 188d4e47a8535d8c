//! Ordered rule registry.

use crate::rule::{CodebaseRule, RegisteredRule, TypeRule};
use std::collections::HashSet;

/// Errors building a registry.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    /// Two rules share a name or code.
    #[error("duplicate rule identifier `{0}`")]
    Duplicate(String),
}

/// The set of rules to run, in execution order.
///
/// Built once and passed by reference to the analyzer. Names and codes are
/// unique within a registry.
#[derive(Debug, Default)]
pub struct RuleRegistry {
    rules: Vec<RegisteredRule>,
    identifiers: HashSet<&'static str>,
}

impl RuleRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a rule.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Duplicate`] if the name or code is taken.
    pub fn register(&mut self, rule: RegisteredRule) -> Result<(), RegistryError> {
        for id in [rule.name(), rule.code()] {
            if self.identifiers.contains(id) {
                return Err(RegistryError::Duplicate(id.to_string()));
            }
        }
        self.identifiers.insert(rule.name());
        self.identifiers.insert(rule.code());
        self.rules.push(rule);
        Ok(())
    }

    /// Registers a per-type rule.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Duplicate`] if the name or code is taken.
    pub fn with_type_rule<R: TypeRule + 'static>(mut self, rule: R) -> Result<Self, RegistryError> {
        self.register(RegisteredRule::per_type(rule))?;
        Ok(self)
    }

    /// Registers a codebase rule.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Duplicate`] if the name or code is taken.
    pub fn with_codebase_rule<R: CodebaseRule + 'static>(
        mut self,
        rule: R,
    ) -> Result<Self, RegistryError> {
        self.register(RegisteredRule::codebase(rule))?;
        Ok(self)
    }

    /// Builds a registry from rules, rejecting duplicates.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Duplicate`] on the first repeated identifier.
    pub fn from_rules<I>(rules: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = RegisteredRule>,
    {
        let mut registry = Self::new();
        for rule in rules {
            registry.register(rule)?;
        }
        Ok(registry)
    }

    /// Iterates rules in registration order.
    pub fn iter(&self) -> std::slice::Iter<'_, RegisteredRule> {
        self.rules.iter()
    }

    /// Looks up a rule by name or code.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&RegisteredRule> {
        self.rules.iter().find(|r| r.name() == id || r.code() == id)
    }

    /// Keeps only the rules whose name or code is in `ids`.
    #[must_use]
    pub fn retain_ids(mut self, ids: &[&str]) -> Self {
        self.rules
            .retain(|r| ids.iter().any(|id| *id == r.name() || *id == r.code()));
        self.identifiers = self
            .rules
            .iter()
            .flat_map(|r| [r.name(), r.code()])
            .collect();
        self
    }

    /// Number of registered rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether no rules are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<'a> IntoIterator for &'a RuleRegistry {
    type Item = &'a RegisteredRule;
    type IntoIter = std::slice::Iter<'a, RegisteredRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::TypeContext;
    use crate::rule::{EvaluatorFault, Rule};
    use crate::types::Violation;

    struct Named(&'static str, &'static str);

    impl Rule for Named {
        fn name(&self) -> &'static str {
            self.0
        }
        fn code(&self) -> &'static str {
            self.1
        }
        fn category(&self) -> &'static str {
            "testing"
        }
    }

    impl TypeRule for Named {
        fn analyze_type(&self, _ctx: &TypeContext) -> Result<Option<Violation>, EvaluatorFault> {
            Ok(None)
        }
    }

    #[test]
    fn keeps_registration_order() {
        let registry = RuleRegistry::new()
            .with_type_rule(Named("b-rule", "T002"))
            .and_then(|r| r.with_type_rule(Named("a-rule", "T001")))
            .expect("unique rules");
        let names: Vec<&str> = registry.iter().map(RegisteredRule::name).collect();
        assert_eq!(names, vec!["b-rule", "a-rule"]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn rejects_duplicate_name_or_code() {
        let err = RuleRegistry::new()
            .with_type_rule(Named("a-rule", "T001"))
            .and_then(|r| r.with_type_rule(Named("a-rule", "T002")))
            .expect_err("duplicate name");
        assert_eq!(err, RegistryError::Duplicate("a-rule".into()));

        let err = RuleRegistry::from_rules([
            RegisteredRule::per_type(Named("a-rule", "T001")),
            RegisteredRule::per_type(Named("b-rule", "T001")),
        ])
        .expect_err("duplicate code");
        assert_eq!(err, RegistryError::Duplicate("T001".into()));
    }

    #[test]
    fn lookup_and_retain_by_name_or_code() {
        let registry = RuleRegistry::from_rules([
            RegisteredRule::per_type(Named("a-rule", "T001")),
            RegisteredRule::per_type(Named("b-rule", "T002")),
            RegisteredRule::per_type(Named("c-rule", "T003")),
        ])
        .expect("unique rules");
        assert!(registry.get("T002").is_some());
        assert!(registry.get("c-rule").is_some());
        assert!(registry.get("d-rule").is_none());

        let kept = registry.retain_ids(&["T001", "c-rule"]);
        assert_eq!(kept.len(), 2);
        assert!(kept.get("b-rule").is_none());
    }
}
