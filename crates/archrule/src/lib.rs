//! # archrule
//!
//! Architecture rule engine for multi-project Rust workspaces.
//!
//! This is the main facade crate that re-exports core functionality and the
//! built-in rules.
//!
//! ## Quick Start: `cargo test` Integration
//!
//! ```toml
//! [dev-dependencies]
//! archrule = "0.3"
//! ```
//!
//! ```rust,ignore
//! // tests/architecture.rs
//! archrule::check!();
//! ```
//!
//! This runs archrule as part of `cargo test`. Configure via `archrule.toml`.
//! Arguments override the configuration file:
//!
//! ```rust,ignore
//! archrule::check!(preset = "strict", fail_on = "warning");
//! ```
//!
//! ## Suppression Comments
//!
//! ```rust,ignore
//! // AR003 disable once
//! cache.get_or_insert(key, |k| build(k, &settings));
//! ```
//!
//! ## Programmatic Usage
//!
//! ```rust,ignore
//! use archrule::rules::Preset;
//! use archrule::{Analyzer, Severity};
//!
//! let analyzer = Analyzer::builder()
//!     .root("./services")
//!     .registry(Preset::Strict.registry())
//!     .build()?;
//!
//! let report = analyzer.analyze_root()?;
//! archrule::assert_clean(&report, Severity::Error);
//! ```

#![forbid(unsafe_code)]

pub use archrule_core::*;

/// Built-in rules and presets.
pub mod rules {
    pub use archrule_rules::*;
}

mod runner;

/// Generates a `#[test]` that analyzes the workspace containing the crate.
///
/// Accepts `preset`, `config` and `fail_on` string arguments in any order.
/// The `config` path is relative to the workspace root.
#[macro_export]
macro_rules! check {
    ($($key:ident = $value:literal),* $(,)?) => {
        #[test]
        fn architecture() {
            let args: &[(&str, &str)] = &[$((stringify!($key), $value)),*];
            $crate::__internal::run_check_args(args);
        }
    };
}

/// Panics with a test report if `report` has violations at or above
/// `fail_on`, or any evaluator fault.
///
/// # Panics
///
/// See above.
pub fn assert_clean(report: &AnalysisReport, fail_on: Severity) {
    if report.has_violations_at(fail_on) || report.has_faults() {
        panic!("{}", report.format_test_report(fail_on));
    }
}

#[doc(hidden)]
pub mod __internal {
    pub use crate::runner::{run_check, run_check_args};
}
