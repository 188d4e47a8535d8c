//! Rule requiring selected types to carry a name suffix.
//!
//! # Configuration
//!
//! - `suffix`: Required type name suffix

use crate::filter::TypeFilter;
use archrule_core::{
    strip_generics, EvaluatorFault, Rule, RuleConfig, Severity, TypeContext, TypeRule, Violation,
};

/// Rule code for validator-name-suffix.
pub const VALIDATOR_SUFFIX_CODE: &str = "AR004";

/// Rule name for validator-name-suffix.
pub const VALIDATOR_SUFFIX_NAME: &str = "validator-name-suffix";

/// Requires types selected by a filter to end with a suffix.
#[derive(Debug, Clone)]
pub struct NameConvention {
    name: &'static str,
    code: &'static str,
    category: &'static str,
    description: &'static str,
    filter: TypeFilter,
    suffix: String,
    severity: Severity,
}

impl NameConvention {
    /// Creates a convention for types selected by `filter`.
    #[must_use]
    pub fn new(
        name: &'static str,
        code: &'static str,
        filter: TypeFilter,
        suffix: impl Into<String>,
    ) -> Self {
        Self {
            name,
            code,
            category: "naming",
            description: "",
            filter,
            suffix: suffix.into(),
            severity: Severity::Warning,
        }
    }

    /// Types inheriting from `Validator` must be named `*Validator` (AR004).
    #[must_use]
    pub fn validators() -> Self {
        Self::new(
            VALIDATOR_SUFFIX_NAME,
            VALIDATOR_SUFFIX_CODE,
            TypeFilter::InheritsFrom("Validator".to_string()),
            "Validator",
        )
        .description("Validator types must be named with a Validator suffix")
    }

    /// Sets the category.
    #[must_use]
    pub fn category(mut self, category: &'static str) -> Self {
        self.category = category;
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    /// Sets the required suffix.
    #[must_use]
    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
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
        let suffix = config.get_str("suffix", &self.suffix).to_string();
        self.suffix(suffix)
    }
}

impl Rule for NameConvention {
    fn name(&self) -> &'static str {
        self.name
    }

    fn code(&self) -> &'static str {
        self.code
    }

    fn category(&self) -> &'static str {
        self.category
    }

    fn description(&self) -> &'static str {
        self.description
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }
}

impl TypeRule for NameConvention {
    fn analyze_type(&self, ctx: &TypeContext) -> Result<Option<Violation>, EvaluatorFault> {
        let name = strip_generics(&ctx.symbol.name);
        if !self.filter.matches(ctx.symbol) || name.ends_with(&self.suffix) {
            return Ok(None);
        }

        Ok(Some(ctx.violation(
            self,
            ctx.line,
            format!(
                "{} `{name}` is not named with the `{}` suffix",
                self.filter.label(),
                self.suffix
            ),
            format!("Rename `{name}` to `{name}{}`", self.suffix),
        )))
    }
}
