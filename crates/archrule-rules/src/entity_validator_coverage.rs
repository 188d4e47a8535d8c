//! Rule requiring every domain entity to have a validator somewhere.
//!
//! Validators usually live in a different project than the entities they
//! check, so the lookup spans every compilation of the model.
//!
//! # Configuration
//!
//! - `base`: Entity base type (default: `Entity`)
//! - `category`: Project category holding entities (default: `domain`)
//! - `suffix`: Validator name suffix (default: `Validator`)

use archrule_core::{
    rule_result, CodebaseRule, Compilation, ProgramModel, Rule, RuleAnalysisResult, RuleConfig,
    Severity, TypeContext, TypeKind,
};
use rayon::prelude::*;
use std::collections::HashSet;
use tracing::debug;

/// Rule code for entity-validator-coverage.
pub const CODE: &str = "AR102";

/// Rule name for entity-validator-coverage.
pub const NAME: &str = "entity-validator-coverage";

/// Requires a `<Entity>Validator` type for every domain entity.
#[derive(Debug, Clone)]
pub struct EntityValidatorCoverage {
    base: String,
    category: String,
    suffix: String,
    severity: Severity,
}

impl Default for EntityValidatorCoverage {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityValidatorCoverage {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base: "Entity".to_string(),
            category: "domain".to_string(),
            suffix: "Validator".to_string(),
            severity: Severity::Warning,
        }
    }

    /// Sets the entity base type.
    #[must_use]
    pub fn base(mut self, base: impl Into<String>) -> Self {
        self.base = base.into();
        self
    }

    /// Sets the project category holding entities.
    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Sets the validator name suffix.
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
    pub fn with_config(mut self, config: &RuleConfig) -> Self {
        self.base = config.get_str("base", &self.base).to_string();
        self.category = config.get_str("category", &self.category).to_string();
        self.suffix = config.get_str("suffix", &self.suffix).to_string();
        self
    }

    fn analyze_project(
        &self,
        model: &ProgramModel,
        project: &str,
        compilation: &Compilation,
        known: &HashSet<&str>,
    ) -> RuleAnalysisResult {
        let mut result = rule_result(self, project);
        for symbol in compilation
            .types
            .iter()
            .filter(|t| t.kind != TypeKind::Interface && t.inherits_from(&self.base))
        {
            let ctx = TypeContext::new(symbol, compilation, project, &model.root);
            let validator = format!("{}{}", symbol.name, self.suffix);
            if known.contains(validator.as_str()) || ctx.is_suppressed(CODE, ctx.line) {
                result.types.push(ctx.passed());
                continue;
            }
            let violation = ctx.violation(
                self,
                ctx.line,
                format!("Entity `{}` has no `{validator}` in any project", symbol.name),
                format!("Add a `{validator}` type next to the other validators"),
            );
            result.types.push(ctx.passed().failed(violation));
        }
        result
    }
}

impl Rule for EntityValidatorCoverage {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn category(&self) -> &'static str {
        "validation"
    }

    fn description(&self) -> &'static str {
        "Every domain entity must have a matching validator"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }
}

impl CodebaseRule for EntityValidatorCoverage {
    fn analyze(&self, model: &ProgramModel) -> Vec<RuleAnalysisResult> {
        let known: HashSet<&str> = model.all_types().map(|(_, t)| t.name.as_str()).collect();
        let projects: Vec<(&String, &Compilation)> = model
            .projects
            .iter()
            .filter(|(_, c)| c.has_category(&self.category))
            .collect();

        if projects.is_empty() {
            debug!("No `{}` projects; {NAME} does not apply", self.category);
            return Vec::new();
        }

        projects
            .par_iter()
            .map(|(project, compilation)| self.analyze_project(model, project, compilation, &known))
            .collect()
    }
}
