//! Rule requiring closures passed to project APIs to be non-capturing.
//!
//! # Rationale
//!
//! A capturing closure allocates its environment on every call. Project
//! APIs that take callbacks on hot paths expect closures marked with the
//! no-capture qualifier so the allocation never happens.
//!
//! # Detection
//!
//! For every member body, each call whose target lives under the project's
//! root namespace is inspected. Closure arguments lacking the qualifier are
//! offenders. The first offender not suppressed at the closure's start line
//! is reported.
//!
//! # Configuration
//!
//! - `modifier`: Required closure qualifier (default: `static`)
//!
//! `static ||` closures are not accepted by stable Rust, so with the default
//! qualifier no stable closure can pass. The rule is therefore only part of
//! the strict preset. Set `modifier = "move"` to enforce owned captures
//! instead.

use archrule_core::{
    Argument, EvaluatorFault, Rule, RuleConfig, Severity, TypeContext, TypeRule, Violation,
};

/// Rule code for static-closure-arguments.
pub const CODE: &str = "AR003";

/// Rule name for static-closure-arguments.
pub const NAME: &str = "static-closure-arguments";

/// Requires closures passed to project calls to carry a no-capture qualifier.
#[derive(Debug, Clone)]
pub struct StaticClosureArguments {
    modifier: String,
    severity: Severity,
}

impl Default for StaticClosureArguments {
    fn default() -> Self {
        Self::new()
    }
}

impl StaticClosureArguments {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            modifier: "static".to_string(),
            severity: Severity::Warning,
        }
    }

    /// Sets the required qualifier.
    #[must_use]
    pub fn modifier(mut self, modifier: impl Into<String>) -> Self {
        self.modifier = modifier.into();
        self
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Applies rule options from configuration.
    #[must_use]
    pub fn with_config(self, config: &RuleConfig) -> Self {
        let modifier = config.get_str("modifier", &self.modifier).to_string();
        self.modifier(modifier)
    }
}

impl Rule for StaticClosureArguments {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn category(&self) -> &'static str {
        "performance"
    }

    fn description(&self) -> &'static str {
        "Closures passed to project APIs must not capture their environment"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }
}

impl TypeRule for StaticClosureArguments {
    fn analyze_type(&self, ctx: &TypeContext) -> Result<Option<Violation>, EvaluatorFault> {
        let root = ctx.compilation.root_namespace();

        for member in &ctx.symbol.members {
            let file = ctx.member_file(member);
            for call in member.calls.iter().filter(|c| c.targets_namespace(root)) {
                for argument in &call.arguments {
                    let Argument::Closure(closure) = argument else {
                        continue;
                    };
                    if closure.has_modifier(&self.modifier)
                        || ctx.is_suppressed_in(file, CODE, closure.line)
                    {
                        continue;
                    }

                    return Ok(Some(ctx.violation_in(
                        file,
                        self,
                        closure.line,
                        format!(
                            "Closure passed to `{}` in `{}.{}` is not `{}`",
                            call.method, ctx.symbol.name, member.name, self.modifier
                        ),
                        format!(
                            "Mark the closure `{}` and pass captured values as arguments",
                            self.modifier
                        ),
                    )));
                }
            }
        }

        Ok(None)
    }
}
