//! Rule traits for defining architecture rules.
//!
//! A rule has an identity ([`Rule`]) and exactly one analysis shape:
//!
//! - [`TypeRule`] inspects one [`TypeContext`] at a time and returns at
//!   most one violation. The engine supplies the iteration.
//! - [`CodebaseRule`] sees every type of every project at once and returns
//!   fully populated [`RuleAnalysisResult`]s itself.
//!
//! [`RegisteredRule`] tags which shape a registered rule has, so dispatch is
//! an explicit `match` rather than override detection.

use crate::context::TypeContext;
use crate::model::ProgramModel;
use crate::types::{RuleAnalysisResult, Severity, Violation};

/// Identity shared by every rule.
///
/// `name` and `code` are stable identifiers: the code appears in
/// suppression comments, the code and name in the ADR path. Neither may be
/// reused for a different invariant.
pub trait Rule: Send + Sync {
    /// Returns the kebab-case name of this rule (e.g., "mapper-write-count").
    fn name(&self) -> &'static str;

    /// Returns the rule code (e.g., "AR101").
    fn code(&self) -> &'static str;

    /// Returns the category used for grouping and ADR paths.
    fn category(&self) -> &'static str;

    /// Returns a brief description of what this rule checks.
    fn description(&self) -> &'static str {
        ""
    }

    /// Returns the default severity for violations from this rule.
    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    /// Returns the path of the design decision document behind this rule.
    ///
    /// Opaque to the engine; never opened or validated.
    fn adr_path(&self) -> String {
        format!(
            "docs/adrs/{}/{}-{}.md",
            self.category(),
            self.code(),
            self.name()
        )
    }
}

/// A rule that inspects one type at a time.
///
/// # Example
///
/// ```ignore
/// use archrule_core::{EvaluatorFault, Rule, TypeContext, TypeKind, TypeRule, Violation};
///
/// pub struct NoEmptyInterfaces;
///
/// impl Rule for NoEmptyInterfaces {
///     fn name(&self) -> &'static str { "no-empty-interfaces" }
///     fn code(&self) -> &'static str { "AR900" }
///     fn category(&self) -> &'static str { "structure" }
/// }
///
/// impl TypeRule for NoEmptyInterfaces {
///     fn analyze_type(&self, ctx: &TypeContext) -> Result<Option<Violation>, EvaluatorFault> {
///         if ctx.symbol.kind != TypeKind::Interface || !ctx.symbol.members.is_empty() {
///             return Ok(None);
///         }
///         Ok(Some(ctx.violation(self, ctx.line, "empty interface", "add members or remove it")))
///     }
/// }
/// ```
pub trait TypeRule: Rule {
    /// Checks one type.
    ///
    /// Returns `Ok(None)` when the type satisfies the invariant, including
    /// when the rule does not apply to it. Must not mutate the model.
    ///
    /// # Errors
    ///
    /// Returns an [`EvaluatorFault`] when the type cannot be inspected.
    fn analyze_type(&self, ctx: &TypeContext) -> Result<Option<Violation>, EvaluatorFault>;
}

/// A rule that must see the whole codebase at once.
///
/// Implementations filter candidate projects and types themselves and emit
/// exactly one [`crate::TypeAnalysisResult`] per candidate type, grouped
/// into one [`RuleAnalysisResult`] per project. There is deliberately no
/// per-type entry point.
pub trait CodebaseRule: Rule {
    /// Analyzes every project of the model.
    fn analyze(&self, model: &ProgramModel) -> Vec<RuleAnalysisResult>;
}

/// A rule could not evaluate a type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot evaluate `{type_name}`: {message}")]
pub struct EvaluatorFault {
    /// Full name of the type being evaluated.
    pub type_name: String,
    /// What went wrong.
    pub message: String,
}

impl EvaluatorFault {
    /// Creates a new fault.
    #[must_use]
    pub fn new(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            message: message.into(),
        }
    }
}

/// Type alias for boxed [`TypeRule`] trait objects.
pub type TypeRuleBox = Box<dyn TypeRule>;

/// Type alias for boxed [`CodebaseRule`] trait objects.
pub type CodebaseRuleBox = Box<dyn CodebaseRule>;

/// A rule tagged with its analysis strategy.
pub enum RegisteredRule {
    /// Evaluated per type by the engine.
    Type(TypeRuleBox),
    /// Evaluated over the whole codebase by the rule itself.
    Codebase(CodebaseRuleBox),
}

impl RegisteredRule {
    /// Wraps a per-type rule.
    #[must_use]
    pub fn per_type<R: TypeRule + 'static>(rule: R) -> Self {
        Self::Type(Box::new(rule))
    }

    /// Wraps a codebase rule.
    #[must_use]
    pub fn codebase<R: CodebaseRule + 'static>(rule: R) -> Self {
        Self::Codebase(Box::new(rule))
    }

    /// Rule name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Type(r) => r.name(),
            Self::Codebase(r) => r.name(),
        }
    }

    /// Rule code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Type(r) => r.code(),
            Self::Codebase(r) => r.code(),
        }
    }

    /// Rule category.
    #[must_use]
    pub fn category(&self) -> &'static str {
        match self {
            Self::Type(r) => r.category(),
            Self::Codebase(r) => r.category(),
        }
    }

    /// Rule description.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Type(r) => r.description(),
            Self::Codebase(r) => r.description(),
        }
    }

    /// Default severity.
    #[must_use]
    pub fn default_severity(&self) -> Severity {
        match self {
            Self::Type(r) => r.default_severity(),
            Self::Codebase(r) => r.default_severity(),
        }
    }

    /// ADR path.
    #[must_use]
    pub fn adr_path(&self) -> String {
        match self {
            Self::Type(r) => r.adr_path(),
            Self::Codebase(r) => r.adr_path(),
        }
    }

    /// Whether the engine iterates types for this rule.
    #[must_use]
    pub fn is_per_type(&self) -> bool {
        matches!(self, Self::Type(_))
    }
}

impl std::fmt::Debug for RegisteredRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = if self.is_per_type() { "Type" } else { "Codebase" };
        f.debug_struct(kind)
            .field("name", &self.name())
            .field("code", &self.code())
            .finish()
    }
}

/// Builds an empty [`RuleAnalysisResult`] for `rule` and `project`.
///
/// Codebase rules use this to start each project's result set.
#[must_use]
pub fn rule_result<R: Rule + ?Sized>(rule: &R, project: &str) -> RuleAnalysisResult {
    RuleAnalysisResult {
        category: rule.category().to_string(),
        rule: rule.name().to_string(),
        code: rule.code().to_string(),
        description: rule.description().to_string(),
        severity: rule.default_severity(),
        adr_path: rule.adr_path(),
        project: project.to_string(),
        types: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestRule;

    impl Rule for TestRule {
        fn name(&self) -> &'static str {
            "test-rule"
        }
        fn code(&self) -> &'static str {
            "TEST001"
        }
        fn category(&self) -> &'static str {
            "testing"
        }
    }

    impl TypeRule for TestRule {
        fn analyze_type(&self, _ctx: &TypeContext) -> Result<Option<Violation>, EvaluatorFault> {
            Ok(None)
        }
    }

    #[test]
    fn test_rule_defaults() {
        let rule = TestRule;
        assert_eq!(rule.default_severity(), Severity::Error);
        assert_eq!(rule.adr_path(), "docs/adrs/testing/TEST001-test-rule.md");
    }

    #[test]
    fn registered_rule_delegates_identity() {
        let registered = RegisteredRule::per_type(TestRule);
        assert!(registered.is_per_type());
        assert_eq!(registered.name(), "test-rule");
        assert_eq!(registered.code(), "TEST001");
        assert_eq!(registered.category(), "testing");
        assert_eq!(format!("{registered:?}"), "Type { name: \"test-rule\", code: \"TEST001\" }");
    }

    #[test]
    fn rule_result_copies_identity() {
        let result = rule_result(&TestRule, "App");
        assert_eq!(result.project, "App");
        assert_eq!(result.code, "TEST001");
        assert!(result.types.is_empty());
        assert!(result.is_clean());
    }

    #[test]
    fn fault_display() {
        let fault = EvaluatorFault::new("App.OrderMapper", "method `Write` not found");
        assert_eq!(
            fault.to_string(),
            "cannot evaluate `App.OrderMapper`: method `Write` not found"
        );
    }
}
