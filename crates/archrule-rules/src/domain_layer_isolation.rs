//! Rule keeping domain projects free of infrastructure dependencies.
//!
//! # Rationale
//!
//! The domain layer must stay independent of persistence and transport
//! concerns. A domain type that derives from, or calls into, those layers
//! couples business rules to infrastructure.
//!
//! # Detection
//!
//! Only types in projects of the configured category are checked. The
//! first base type matching a forbidden pattern is reported unless the type
//! line is suppressed; otherwise the first resolved call into a forbidden
//! namespace that is not suppressed.
//!
//! # Configuration
//!
//! - `category`: Project category to check (default: `domain`)
//! - `forbidden`: Namespace patterns (default: `**::Persistence::**`,
//!   `**::Api::**`, and the crate prefixes `*_persistence::**`, `*_api::**`)

use archrule_core::utils::path_matches;
use archrule_core::{
    strip_generics, EvaluatorFault, Rule, RuleConfig, Severity, TypeContext, TypeRule, Violation,
};

/// Rule code for domain-layer-isolation.
pub const CODE: &str = "AR005";

/// Rule name for domain-layer-isolation.
pub const NAME: &str = "domain-layer-isolation";

const DEFAULT_FORBIDDEN: [&str; 4] = [
    "**::Persistence::**",
    "**::Api::**",
    "*_persistence::**",
    "*_api::**",
];

/// Forbids domain types from depending on infrastructure namespaces.
#[derive(Debug, Clone)]
pub struct DomainLayerIsolation {
    category: String,
    forbidden: Vec<String>,
    severity: Severity,
}

impl Default for DomainLayerIsolation {
    fn default() -> Self {
        Self::new()
    }
}

impl DomainLayerIsolation {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            category: "domain".to_string(),
            forbidden: DEFAULT_FORBIDDEN.iter().map(ToString::to_string).collect(),
            severity: Severity::Error,
        }
    }

    /// Sets the project category to check.
    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Replaces the forbidden namespace patterns.
    #[must_use]
    pub fn forbidden<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.forbidden = patterns.into_iter().map(Into::into).collect();
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
    pub fn with_config(mut self, config: &RuleConfig) -> Self {
        self.category = config.get_str("category", &self.category).to_string();
        if let Some(forbidden) = config.get_str_array("forbidden") {
            self.forbidden = forbidden;
        }
        self
    }

    fn forbidden_pattern(&self, path: &str) -> Option<&str> {
        self.forbidden
            .iter()
            .find(|p| path_matches(path, p))
            .map(String::as_str)
    }
}

impl Rule for DomainLayerIsolation {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn category(&self) -> &'static str {
        "layering"
    }

    fn description(&self) -> &'static str {
        "Domain types must not depend on persistence or API namespaces"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }
}

impl TypeRule for DomainLayerIsolation {
    fn analyze_type(&self, ctx: &TypeContext) -> Result<Option<Violation>, EvaluatorFault> {
        if !ctx.compilation.has_category(&self.category) {
            return Ok(None);
        }
        let name = &ctx.symbol.name;

        let bases: &[String] = if ctx.is_suppressed(CODE, ctx.line) {
            &[]
        } else {
            &ctx.symbol.base_types
        };
        for base in bases {
            let base = strip_generics(base);
            if let Some(pattern) = self.forbidden_pattern(base) {
                return Ok(Some(ctx.violation(
                    self,
                    ctx.line,
                    format!("Domain type `{name}` derives from `{base}` (matches `{pattern}`)"),
                    "Depend on a domain-owned abstraction and implement it in the outer layer",
                )));
            }
        }

        for member in &ctx.symbol.members {
            let file = ctx.member_file(member);
            for call in &member.calls {
                let Some(target) = call.target.as_deref() else {
                    continue;
                };
                let Some(pattern) = self.forbidden_pattern(target) else {
                    continue;
                };
                if ctx.is_suppressed_in(file, CODE, call.line) {
                    continue;
                }
                return Ok(Some(ctx.violation_in(
                    file,
                    self,
                    call.line,
                    format!(
                        "Domain type `{name}` calls `{target}{}{}` from `{}` (matches `{pattern}`)",
                        if target.contains("::") { "::" } else { "." },
                        call.method,
                        member.name,
                    ),
                    "Move the call behind an interface owned by the domain layer",
                )));
            }
        }

        Ok(None)
    }
}
