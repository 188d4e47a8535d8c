//! # archrule-core
//!
//! Core engine for validating a codebase against named architecture rules.
//!
//! The engine consumes a [`ProgramModel`] (projects, named types, members,
//! call sites, raw source text) and runs every rule of a [`RuleRegistry`]
//! over it:
//!
//! - [`TypeRule`]s inspect one [`TypeContext`] at a time; the engine drives
//!   the iteration in parallel and applies suppression comments.
//! - [`CodebaseRule`]s see all projects at once and correlate facts across
//!   compilations.
//!
//! Results are reported as an [`AnalysisReport`] with one
//! [`RuleAnalysisResult`] per (rule, project) pair.
//!
//! ## Example
//!
//! ```ignore
//! use archrule_core::{Analyzer, RuleRegistry};
//!
//! let registry = RuleRegistry::new().with_type_rule(MyRule)?;
//! let analyzer = Analyzer::builder()
//!     .root(".")
//!     .registry(registry)
//!     .build()?;
//!
//! let report = analyzer.analyze_root()?;
//! report.print_report();
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod analyzer;
mod config;
mod context;
mod model;
mod provider;
mod registry;
mod rule;
mod types;

/// Suppression comment scanning.
pub mod suppression;

/// Utility modules for rule implementations.
pub mod utils;

pub use analyzer::{analyze_per_type, count_status, Analyzer, AnalyzerBuilder, AnalyzerError};
pub use config::{
    AnalyzerConfig, Config, ConfigError, ConfigOrigin, FaultPolicy, RuleConfig, CONFIG_FILE_NAMES,
    GLOBAL_CONFIG_FILE_NAME,
};
pub use context::{type_contexts, TypeContext};
pub use model::{
    last_path_segment, strip_generics, Argument, CallSite, ClosureSyntax, Compilation,
    MemberKind, MemberSymbol, Namespace, ProgramModel, TypeKind, TypeSymbol,
};
pub use provider::{ProviderError, RustModelProvider};
pub use registry::{RegistryError, RuleRegistry};
pub use rule::{
    rule_result, CodebaseRule, CodebaseRuleBox, EvaluatorFault, RegisteredRule, Rule, TypeRule,
    TypeRuleBox,
};
pub use types::{
    AnalysisReport, Location, RuleAnalysisResult, Severity, TypeAnalysisResult, TypeStatus,
    Violation, ViolationDiagnostic,
};
