//! Check command implementation.

use anyhow::{Context, Result};
use archrule_core::{Analyzer, Config, ConfigOrigin, RuleRegistry, RustModelProvider};
use archrule_rules::{all_rules, registry_from_config, rule_by_name};
use std::path::{Path, PathBuf};

use crate::OutputFormat;

/// Flags of the check command.
#[derive(Debug, Default)]
pub struct CheckOptions {
    /// Output format.
    pub format: OutputFormat,
    /// Comma-separated rule names or codes replacing the configured set.
    pub rules: Option<String>,
    /// Extra exclude globs appended to the configured ones.
    pub exclude: Vec<String>,
    /// Print the suppression comments of the executed rules.
    pub show_suppressions: bool,
}

/// Runs the check command.
///
/// Returns `false` when violations at or above `fail_on` or evaluator
/// faults were found.
pub fn run(path: &Path, options: &CheckOptions, mut config: Config) -> Result<bool> {
    config
        .analyzer
        .exclude
        .extend(options.exclude.iter().cloned());
    let fail_on = config.fail_on_severity()?;

    let registry = match &options.rules {
        Some(filter) => {
            let ids: Vec<&str> = filter
                .split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .collect();
            select_rules(&ids, &config)?
        }
        None => registry_from_config(&config)?,
    };

    let analyzer = Analyzer::builder()
        .root(path)
        .registry(registry)
        .config(config.clone())
        .build()
        .context("Failed to build analyzer")?;

    tracing::info!(
        "Analyzing {} with {} rules",
        analyzer.root().display(),
        analyzer.rule_count()
    );

    let model = RustModelProvider::from_config(&config.analyzer)?
        .load(analyzer.root())
        .context("Failed to load workspace")?;
    let report = analyzer.analyze(&model).context("Analysis failed")?;

    print!("{}", super::output::render(&report, &model, options.format)?);

    if options.show_suppressions {
        let codes: Vec<&str> = analyzer.registry().iter().map(|r| r.code()).collect();
        print!("{}", super::output::render_suppressions(&model, &codes));
    }

    Ok(!report.has_violations_at(fail_on) && !report.has_faults())
}

/// Loads the configuration for the workspace at `path`.
///
/// `--config` paths are relative to the working directory. Without one, the
/// workspace config is used, then `config.toml` in the global directory.
pub fn load_config(path: &Path, explicit: Option<&Path>) -> Result<Config> {
    let explicit = explicit
        .map(|p| std::env::current_dir().map(|cwd| cwd.join(p)))
        .transpose()
        .context("Failed to resolve --config")?;
    let global = global_config_dir();
    let (config, origin) = Config::discover(path, explicit.as_deref(), global.as_deref())
        .context("Failed to load config")?;
    if let ConfigOrigin::Global(global) = &origin {
        tracing::info!("Using global config: {}", global.display());
    }
    Ok(config)
}

/// `$ARCHRULE_CONFIG_DIR`, else `~/.archrule`.
fn global_config_dir() -> Option<PathBuf> {
    std::env::var_os("ARCHRULE_CONFIG_DIR")
        .map(PathBuf::from)
        .or_else(|| home::home_dir().map(|home| home.join(".archrule")))
}

/// Builds a registry holding the named built-in rules, in built-in order.
fn select_rules(ids: &[&str], config: &Config) -> Result<RuleRegistry> {
    let every = RuleRegistry::from_rules(
        all_rules()
            .iter()
            .filter_map(|rule| rule_by_name(rule.name(), config)),
    )
    .context("Invalid built-in rule set")?;

    for id in ids {
        if every.get(id).is_none() {
            tracing::warn!("Unknown rule: {}", id);
        }
    }

    Ok(every.retain_ids(ids))
}
