//! Rule presets and config-driven registry construction.

use crate::{
    DomainLayerIsolation, EntityValidatorCoverage, FolderConvention, MapperWriteCount,
    NameConvention, StaticClosureArguments,
};
use archrule_core::{Config, RegisteredRule, RegistryError, RuleRegistry};

/// Preset configurations for archrule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Recommended rules with sensible defaults.
    ///
    /// Leaves out `static-closure-arguments`, whose default qualifier needs
    /// unstable syntax.
    Recommended,
    /// Every built-in rule.
    Strict,
    /// Minimal rules for gradual adoption.
    Minimal,
}

impl Preset {
    /// Parses a preset name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "recommended" => Some(Self::Recommended),
            "strict" => Some(Self::Strict),
            "minimal" => Some(Self::Minimal),
            _ => None,
        }
    }

    /// Names of the rules in this preset, in execution order.
    #[must_use]
    pub fn rule_names(self) -> &'static [&'static str] {
        match self {
            Self::Recommended => &[
                crate::folder_convention::INTERFACES_NAME,
                crate::folder_convention::VALIDATORS_NAME,
                crate::mapper_write_count::NAME,
            ],
            Self::Strict => ALL_RULE_NAMES,
            Self::Minimal => &[
                crate::folder_convention::INTERFACES_NAME,
                crate::mapper_write_count::NAME,
            ],
        }
    }

    /// Builds the registry for this preset with default rule options.
    #[must_use]
    pub fn registry(self) -> RuleRegistry {
        build(self.rule_names().iter().copied(), &Config::default())
            .unwrap_or_default()
    }
}

/// Every built-in rule name, in execution order.
const ALL_RULE_NAMES: &[&str] = &[
    crate::folder_convention::INTERFACES_NAME,
    crate::folder_convention::VALIDATORS_NAME,
    crate::static_closure_arguments::NAME,
    crate::name_convention::VALIDATOR_SUFFIX_NAME,
    crate::domain_layer_isolation::NAME,
    crate::mapper_write_count::NAME,
    crate::entity_validator_coverage::NAME,
];

/// Errors building a registry from configuration.
#[derive(Debug, thiserror::Error)]
pub enum PresetError {
    /// The configured preset does not exist.
    #[error("unknown preset `{0}`, expected: recommended, strict, minimal")]
    Unknown(String),

    /// The rules could not be registered.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Builds a built-in rule by name with options from `config`.
#[must_use]
pub fn rule_by_name(name: &str, config: &Config) -> Option<RegisteredRule> {
    let options = config.rule(name);
    let rule = match name {
        crate::folder_convention::INTERFACES_NAME => {
            RegisteredRule::per_type(FolderConvention::interfaces().with_config(&options))
        }
        crate::folder_convention::VALIDATORS_NAME => {
            RegisteredRule::per_type(FolderConvention::validators().with_config(&options))
        }
        crate::static_closure_arguments::NAME => {
            RegisteredRule::per_type(StaticClosureArguments::new().with_config(&options))
        }
        crate::name_convention::VALIDATOR_SUFFIX_NAME => {
            RegisteredRule::per_type(NameConvention::validators().with_config(&options))
        }
        crate::domain_layer_isolation::NAME => {
            RegisteredRule::per_type(DomainLayerIsolation::new().with_config(&options))
        }
        crate::mapper_write_count::NAME => {
            RegisteredRule::codebase(MapperWriteCount::new().with_config(&options))
        }
        crate::entity_validator_coverage::NAME => {
            RegisteredRule::codebase(EntityValidatorCoverage::new().with_config(&options))
        }
        _ => return None,
    };
    Some(rule)
}

fn build<'a>(
    names: impl IntoIterator<Item = &'a str>,
    config: &Config,
) -> Result<RuleRegistry, RegistryError> {
    RuleRegistry::from_rules(names.into_iter().filter_map(|name| rule_by_name(name, config)))
}

/// Returns every built-in rule with default options.
#[must_use]
pub fn all_rules() -> Vec<RegisteredRule> {
    let config = Config::default();
    ALL_RULE_NAMES
        .iter()
        .filter_map(|name| rule_by_name(name, &config))
        .collect()
}

/// Builds the registry described by a configuration.
///
/// Starts from the configured preset (default: recommended) and adds any
/// built-in rule explicitly enabled in `[rules.<name>]`. Rule options are
/// read from the same tables.
///
/// # Errors
///
/// Returns an error for an unknown preset name.
pub fn registry_from_config(config: &Config) -> Result<RuleRegistry, PresetError> {
    let preset = match config.preset.as_deref() {
        Some(name) => Preset::parse(name).ok_or_else(|| PresetError::Unknown(name.to_string()))?,
        None => Preset::Recommended,
    };

    let in_preset = preset.rule_names();
    let names = ALL_RULE_NAMES.iter().copied().filter(|name| {
        in_preset.contains(name) || config.rules.get(*name).and_then(|r| r.enabled) == Some(true)
    });

    build(names, config).map_err(PresetError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(registry: &RuleRegistry) -> Vec<&'static str> {
        registry.iter().map(RegisteredRule::name).collect()
    }

    #[test]
    fn test_preset_rules() {
        assert_eq!(Preset::Recommended.registry().len(), 3);
        assert_eq!(Preset::Strict.registry().len(), 7);
        assert_eq!(Preset::Minimal.registry().len(), 2);
        assert_eq!(all_rules().len(), 7);
    }

    #[test]
    fn every_name_builds_a_rule() {
        let config = Config::default();
        for name in ALL_RULE_NAMES {
            let rule = rule_by_name(name, &config).expect("known rule");
            assert_eq!(rule.name(), *name);
        }
        assert!(rule_by_name("no-such-rule", &config).is_none());
    }

    #[test]
    fn config_adds_enabled_rules_to_preset() {
        let config = Config::parse(
            "preset = \"minimal\"\n[rules.entity-validator-coverage]\nenabled = true\n",
        )
        .expect("config");
        let registry = registry_from_config(&config).expect("registry");
        assert_eq!(
            names(&registry),
            vec![
                "interfaces-in-interfaces-folder",
                "mapper-write-count",
                "entity-validator-coverage"
            ]
        );
    }

    #[test]
    fn closure_qualifier_rule_is_strict_only() {
        let closure_rule = crate::static_closure_arguments::NAME;
        assert!(!Preset::Recommended.rule_names().contains(&closure_rule));
        assert!(!Preset::Minimal.rule_names().contains(&closure_rule));
        assert!(Preset::Strict.rule_names().contains(&closure_rule));

        let config = Config::parse(
            "[rules.static-closure-arguments]\nenabled = true\nmodifier = \"move\"\n",
        )
        .expect("config");
        let registry = registry_from_config(&config).expect("registry");
        assert!(names(&registry).contains(&closure_rule));
    }

    #[test]
    fn unknown_preset_is_an_error() {
        let config = Config::parse("preset = \"lenient\"").expect("config");
        assert!(matches!(
            registry_from_config(&config),
            Err(PresetError::Unknown(name)) if name == "lenient"
        ));
    }

    #[test]
    fn codes_are_unique() {
        let registry = Preset::Strict.registry();
        let codes: Vec<&str> = registry.iter().map(RegisteredRule::code).collect();
        assert_eq!(
            codes,
            vec!["AR001", "AR002", "AR003", "AR004", "AR005", "AR101", "AR102"]
        );
    }
}
