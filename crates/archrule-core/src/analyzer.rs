//! Core analyzer for orchestrating rule execution.

use crate::config::{Config, ConfigError, FaultPolicy};
use crate::context::TypeContext;
use crate::model::ProgramModel;
use crate::provider::{ProviderError, RustModelProvider};
use crate::registry::RuleRegistry;
use crate::rule::{rule_result, EvaluatorFault, RegisteredRule, TypeRule};
use crate::types::{AnalysisReport, RuleAnalysisResult, TypeAnalysisResult, TypeStatus};

use rayon::prelude::*;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur during analysis.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// IO error resolving the analysis root.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The program model could not be loaded.
    #[error("Failed to load program model: {0}")]
    Provider(#[from] ProviderError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A rule could not evaluate a type and the fault policy is `abort`.
    #[error("Rule `{rule}` aborted: {fault}")]
    Evaluator {
        /// Rule name.
        rule: String,
        /// The first fault encountered.
        fault: EvaluatorFault,
    },

    /// The worker pool could not be created.
    #[error("Failed to build worker pool: {0}")]
    ThreadPool(String),
}

/// Builder for configuring an [`Analyzer`].
#[derive(Default)]
pub struct AnalyzerBuilder {
    root: Option<PathBuf>,
    registry: Option<RuleRegistry>,
    config: Option<Config>,
}

impl AnalyzerBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the root directory used by [`Analyzer::analyze_root`].
    #[must_use]
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Sets the rules to run.
    #[must_use]
    pub fn registry(mut self, registry: RuleRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Builds the analyzer.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory cannot be resolved or the
    /// worker pool cannot be created.
    pub fn build(self) -> Result<Analyzer, AnalyzerError> {
        let config = self.config.unwrap_or_default();
        let root = self
            .root
            .unwrap_or_else(|| config.analyzer.root.clone());

        let root = if root.is_absolute() {
            root
        } else {
            std::env::current_dir()?.join(&root)
        };

        let pool = match config.analyzer.parallelism {
            Some(threads) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|e| AnalyzerError::ThreadPool(e.to_string()))?,
            ),
            None => None,
        };

        Ok(Analyzer {
            root,
            registry: self.registry.unwrap_or_default(),
            config,
            pool,
        })
    }
}

/// The engine that runs every registered rule over a program model.
///
/// Use [`Analyzer::builder()`] to construct an instance.
pub struct Analyzer {
    root: PathBuf,
    registry: RuleRegistry,
    config: Config,
    pool: Option<rayon::ThreadPool>,
}

impl Analyzer {
    /// Creates a new builder for configuring an analyzer.
    #[must_use]
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    /// Returns the root directory used by [`Analyzer::analyze_root`].
    #[must_use]
    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    /// Returns the registered rules.
    #[must_use]
    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Returns the number of registered rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.registry.len()
    }

    /// Loads the Rust workspace at the root and analyzes it.
    ///
    /// # Errors
    ///
    /// Returns an error if model loading fails or a fault aborts the run.
    pub fn analyze_root(&self) -> Result<AnalysisReport, AnalyzerError> {
        let model = RustModelProvider::from_config(&self.config.analyzer)?.load(&self.root)?;
        self.analyze(&model)
    }

    /// Runs every enabled rule over `model`.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::Evaluator`] when a rule faults and the fault
    /// policy is `abort`.
    pub fn analyze(&self, model: &ProgramModel) -> Result<AnalysisReport, AnalyzerError> {
        info!(
            "Starting analysis of {} project(s), {} type(s) with {} rule(s)",
            model.projects.len(),
            model.type_count(),
            self.registry.len()
        );

        let mut report = AnalysisReport::new();
        report.types_checked = model.type_count();

        for rule in &self.registry {
            if !self.config.is_rule_enabled(rule.name()) {
                debug!("Skipping disabled rule: {}", rule.name());
                continue;
            }

            let mut results = match rule {
                RegisteredRule::Type(r) => self.install(|| analyze_per_type(r.as_ref(), model)),
                RegisteredRule::Codebase(r) => self.install(|| r.analyze(model)),
            };

            self.check_faults(rule.name(), &results)?;
            self.apply_severity_override(rule.name(), &mut results);
            report.results.extend(results);
        }

        let (errors, warnings, infos) = report.count_by_severity();
        info!(
            "Analysis complete: {errors} error(s), {warnings} warning(s), {infos} info(s)"
        );

        Ok(report)
    }

    fn install<R: Send>(&self, op: impl FnOnce() -> R + Send) -> R {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }

    fn check_faults(
        &self,
        rule: &str,
        results: &[RuleAnalysisResult],
    ) -> Result<(), AnalyzerError> {
        for outcome in results.iter().flat_map(RuleAnalysisResult::faulted) {
            let message = outcome.fault.clone().unwrap_or_default();
            warn!(
                "Rule {rule} could not evaluate {}: {message}",
                outcome.full_name
            );
            if self.config.analyzer.on_fault == FaultPolicy::Abort {
                return Err(AnalyzerError::Evaluator {
                    rule: rule.to_string(),
                    fault: EvaluatorFault::new(outcome.full_name.clone(), message),
                });
            }
        }
        Ok(())
    }

    fn apply_severity_override(&self, rule: &str, results: &mut [RuleAnalysisResult]) {
        let Some(severity) = self.config.rule_severity(rule) else {
            return;
        };
        for result in results {
            result.severity = severity;
            for outcome in &mut result.types {
                if let Some(v) = outcome.violation.as_mut() {
                    v.severity = severity;
                }
            }
        }
    }
}

/// Runs a per-type rule over every type of every project.
///
/// Types are evaluated in parallel; the output keeps project order and
/// declaration order. A candidate violation whose line is suppressed for the
/// rule's code is turned into a pass. Faults are recorded per type.
#[must_use]
pub fn analyze_per_type(rule: &dyn TypeRule, model: &ProgramModel) -> Vec<RuleAnalysisResult> {
    model
        .projects
        .iter()
        .map(|(project, compilation)| {
            let contexts = TypeContext::for_project(project, compilation, &model.root);
            let mut result = rule_result(rule, project);
            result.types = contexts
                .par_iter()
                .map(|ctx| evaluate_type(rule, ctx))
                .collect();
            result
        })
        .collect()
}

fn evaluate_type(rule: &dyn TypeRule, ctx: &TypeContext) -> TypeAnalysisResult {
    match rule.analyze_type(ctx) {
        Ok(None) => ctx.passed(),
        Ok(Some(violation)) => {
            let file = ctx.root.join(&violation.location.file);
            if ctx.is_suppressed_in(&file, rule.code(), violation.location.line) {
                debug!(
                    "{} suppressed for {} at {}:{}",
                    rule.code(),
                    ctx.symbol.full_name(),
                    violation.location.file.display(),
                    violation.location.line
                );
                ctx.passed()
            } else {
                ctx.passed().failed(violation)
            }
        }
        Err(fault) => ctx.passed().faulted(fault.message),
    }
}

/// Number of outcomes with the given status across results.
#[must_use]
pub fn count_status(results: &[RuleAnalysisResult], status: TypeStatus) -> usize {
    results
        .iter()
        .flat_map(|r| r.types.iter())
        .filter(|t| t.status == status)
        .count()
}
