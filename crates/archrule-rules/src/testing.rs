//! Helpers shared by rule tests.

use archrule_core::{
    analyze_per_type, CodebaseRule, ProgramModel, TypeAnalysisResult, TypeRule, Violation,
};

/// Every per-type outcome of `rule` over `model`, in project and type order.
pub(crate) fn type_outcomes(rule: &dyn TypeRule, model: &ProgramModel) -> Vec<TypeAnalysisResult> {
    analyze_per_type(rule, model)
        .into_iter()
        .flat_map(|r| r.types)
        .collect()
}

/// Violations of a per-type rule after suppression.
pub(crate) fn type_violations(rule: &dyn TypeRule, model: &ProgramModel) -> Vec<Violation> {
    type_outcomes(rule, model)
        .into_iter()
        .filter_map(|t| t.violation)
        .collect()
}

/// Every outcome of a codebase rule, in project and type order.
pub(crate) fn codebase_outcomes(
    rule: &dyn CodebaseRule,
    model: &ProgramModel,
) -> Vec<TypeAnalysisResult> {
    rule.analyze(model)
        .into_iter()
        .flat_map(|r| r.types)
        .collect()
}
