//! # archrule-rules
//!
//! Built-in architecture rules for archrule.
//!
//! ## Available Rules
//!
//! | Code | Name | Kind | Description |
//! |------|------|------|-------------|
//! | AR001 | `interfaces-in-interfaces-folder` | per type | Interfaces live in an `Interfaces` folder or namespace |
//! | AR002 | `validators-in-validation-folder` | per type | Validators live in a `Validation` folder or namespace |
//! | AR003 | `static-closure-arguments` | per type | Closures passed to project APIs carry the no-capture qualifier |
//! | AR004 | `validator-name-suffix` | per type | Validators are named `*Validator` |
//! | AR005 | `domain-layer-isolation` | per type | Domain types do not touch persistence or API namespaces |
//! | AR101 | `mapper-write-count` | codebase | Mapper write calls match the mapped fields |
//! | AR102 | `entity-validator-coverage` | codebase | Every domain entity has a validator |
//!
//! ## Usage
//!
//! ```ignore
//! use archrule_core::{Analyzer, RuleRegistry};
//! use archrule_rules::{FolderConvention, MapperWriteCount};
//!
//! let registry = RuleRegistry::new()
//!     .with_type_rule(FolderConvention::interfaces())?
//!     .with_codebase_rule(MapperWriteCount::new().baseline(11))?;
//!
//! let analyzer = Analyzer::builder().registry(registry).build()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod domain_layer_isolation;
mod entity_validator_coverage;
mod filter;
mod folder_convention;
mod mapper_write_count;
mod name_convention;
mod presets;
mod static_closure_arguments;

#[cfg(test)]
mod testing;

pub use domain_layer_isolation::DomainLayerIsolation;
pub use entity_validator_coverage::EntityValidatorCoverage;
pub use filter::TypeFilter;
pub use folder_convention::FolderConvention;
pub use mapper_write_count::MapperWriteCount;
pub use name_convention::NameConvention;
pub use presets::{all_rules, registry_from_config, rule_by_name, Preset, PresetError};
pub use static_closure_arguments::StaticClosureArguments;

/// Re-export core types for convenience.
pub use archrule_core::{CodebaseRule, Rule, Severity, TypeRule, Violation};
