//! Internal runner for `check!()` macro integration.
//!
//! This module is `#[doc(hidden)]` and not part of the public API.
//! It is called by the generated test function from `archrule::check!()`.

use archrule_core::{AnalysisReport, Analyzer, Config, Severity};
use archrule_rules::{registry_from_config, Preset};
use std::path::{Path, PathBuf};

/// Runs archrule with `key = "value"` arguments as written in `check!()`.
///
/// # Panics
///
/// Panics on an unknown argument name, and in every case [`run_check`] does.
pub fn run_check_args(args: &[(&str, &str)]) {
    let mut preset = None;
    let mut config = None;
    let mut fail_on = None;
    for &(key, value) in args {
        match key {
            "preset" => preset = Some(value),
            "config" => config = Some(value),
            "fail_on" => fail_on = Some(value),
            other => panic!(
                "archrule: unknown check! argument `{other}`. Valid arguments: preset, config, fail_on"
            ),
        }
    }
    run_check(preset, config, fail_on);
}

/// Runs archrule analysis as part of `cargo test`.
///
/// Called by the `check!()` macro-generated test function.
/// Panics with a formatted report if violations are found.
///
/// # Panics
///
/// Panics if violations at or above `fail_on` severity or evaluator faults
/// are found, or if the analyzer cannot be built.
pub fn run_check(preset: Option<&str>, config_path: Option<&str>, fail_on: Option<&str>) {
    let root = find_project_root();
    let (report, fail_on) = run_check_in(&root, preset, config_path, fail_on);
    crate::assert_clean(&report, fail_on);
}

/// Loads configuration relative to `root` and analyzes the configured tree.
///
/// Returns the report with the effective failure threshold.
fn run_check_in(
    root: &Path,
    preset: Option<&str>,
    config_path: Option<&str>,
    fail_on: Option<&str>,
) -> (AnalysisReport, Severity) {
    let (mut config, _) = Config::discover(root, config_path.map(Path::new), None)
        .unwrap_or_else(|e| panic!("archrule: failed to load config: {e}"));

    let effective_preset = resolve_preset(preset, &config);
    let effective_fail_on = resolve_fail_on(fail_on, &config);
    config.preset = Some(preset_name(effective_preset).to_string());

    let registry = registry_from_config(&config).unwrap_or_else(|e| {
        panic!("archrule: failed to register rules: {e}");
    });

    let analyzed = root.join(&config.analyzer.root);
    let analyzer = Analyzer::builder()
        .root(analyzed)
        .registry(registry)
        .config(config)
        .build()
        .unwrap_or_else(|e| {
            panic!("archrule: failed to build analyzer: {e}");
        });

    let report = analyzer.analyze_root().unwrap_or_else(|e| {
        panic!("archrule: analysis failed: {e}");
    });
    (report, effective_fail_on)
}

/// Checks whether a `Cargo.toml` file defines a `[workspace]` section
/// by parsing as TOML, avoiding false positives from comments or strings.
fn has_workspace_section(cargo_toml: &Path) -> bool {
    let Ok(content) = std::fs::read_to_string(cargo_toml) else {
        return false;
    };
    let Ok(table) = content.parse::<toml::Table>() else {
        return false;
    };
    table.contains_key("workspace")
}

/// Finds the project root by looking for `Cargo.toml` from `CARGO_MANIFEST_DIR`.
fn find_project_root() -> PathBuf {
    // CARGO_MANIFEST_DIR is the crate holding the test, possibly a workspace member.
    if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
        let manifest_path = PathBuf::from(&manifest_dir);

        let mut candidate = manifest_path.as_path();
        loop {
            let cargo_toml = candidate.join("Cargo.toml");
            if cargo_toml.exists() && has_workspace_section(&cargo_toml) {
                return candidate.to_path_buf();
            }
            match candidate.parent() {
                Some(parent) => candidate = parent,
                None => break,
            }
        }

        return manifest_path;
    }

    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

fn preset_name(preset: Preset) -> &'static str {
    match preset {
        Preset::Recommended => "recommended",
        Preset::Strict => "strict",
        Preset::Minimal => "minimal",
    }
}

/// Resolves the effective preset from macro arg > config > default.
fn resolve_preset(macro_arg: Option<&str>, config: &Config) -> Preset {
    let name = macro_arg
        .or(config.preset.as_deref())
        .unwrap_or("recommended");

    Preset::parse(name).unwrap_or_else(|| {
        panic!("archrule: unknown preset `{name}`. Valid presets: recommended, strict, minimal")
    })
}

/// Resolves the effective `fail_on` severity from macro arg > config > default.
fn resolve_fail_on(macro_arg: Option<&str>, config: &Config) -> Severity {
    let name = macro_arg.or(config.fail_on.as_deref()).unwrap_or("error");

    Severity::parse(name).unwrap_or_else(|| {
        panic!("archrule: unknown severity `{name}`. Valid values: error, warning, info")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(path, content).expect("write");
    }

    /// A one-crate workspace with a trait declared at the crate root.
    fn misplaced_trait() -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        write(
            dir.path(),
            "Cargo.toml",
            "[package]\nname = \"shop-core\"\nversion = \"0.1.0\"\n",
        );
        write(
            dir.path(),
            "src/lib.rs",
            "pub mod interfaces;\n\npub trait Clock {}\n",
        );
        write(dir.path(), "src/interfaces.rs", "pub trait Repository {}\n");
        dir
    }

    #[test]
    fn resolve_preset_defaults_to_recommended() {
        let config = Config::default();
        assert_eq!(resolve_preset(None, &config), Preset::Recommended);
    }

    #[test]
    fn resolve_preset_macro_arg_takes_precedence() {
        let mut config = Config::default();
        config.preset = Some("minimal".to_string());
        assert_eq!(resolve_preset(Some("strict"), &config), Preset::Strict);
    }

    #[test]
    fn resolve_preset_from_config() {
        let mut config = Config::default();
        config.preset = Some("strict".to_string());
        assert_eq!(resolve_preset(None, &config), Preset::Strict);
    }

    #[test]
    #[should_panic(expected = "unknown preset")]
    fn resolve_preset_invalid_panics() {
        let config = Config::default();
        resolve_preset(Some("nonexistent"), &config);
    }

    #[test]
    fn resolve_fail_on_defaults_to_error() {
        let config = Config::default();
        assert_eq!(resolve_fail_on(None, &config), Severity::Error);
    }

    #[test]
    fn resolve_fail_on_from_config() {
        let mut config = Config::default();
        config.fail_on = Some("warning".to_string());
        assert_eq!(resolve_fail_on(None, &config), Severity::Warning);
    }

    #[test]
    fn resolve_fail_on_macro_arg_overrides_config() {
        let mut config = Config::default();
        config.fail_on = Some("warning".to_string());
        assert_eq!(resolve_fail_on(Some("error"), &config), Severity::Error);
    }

    #[test]
    #[should_panic(expected = "unknown severity")]
    fn resolve_fail_on_invalid_panics() {
        let config = Config::default();
        resolve_fail_on(Some("critical"), &config);
    }

    #[test]
    #[should_panic(expected = "unknown check! argument `presets`")]
    fn unknown_macro_argument_panics() {
        run_check_args(&[("presets", "strict")]);
    }

    #[test]
    fn run_check_in_finds_misplaced_trait() {
        let dir = misplaced_trait();
        let (report, fail_on) = run_check_in(dir.path(), Some("minimal"), None, None);
        assert_eq!(fail_on, Severity::Error);

        let violations: Vec<_> = report.violations().collect();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].code, "AR001");
        assert_eq!(violations[0].project, "shop-core");
        assert!(violations[0].message.contains("`Clock`"));
    }

    #[test]
    fn config_file_is_discovered_at_root() {
        let dir = misplaced_trait();
        write(
            dir.path(),
            "archrule.toml",
            "preset = \"minimal\"\n\n[rules.interfaces-in-interfaces-folder]\nenabled = false\n",
        );
        let (report, _) = run_check_in(dir.path(), None, None, None);
        assert_eq!(report.violations().count(), 0);
    }

    #[test]
    #[should_panic(expected = "archrule: failed to load config")]
    fn missing_explicit_config_panics() {
        let dir = misplaced_trait();
        run_check_in(dir.path(), None, Some("missing.toml"), None);
    }

    #[test]
    fn explicit_config_path_is_relative_to_root() {
        let dir = misplaced_trait();
        write(
            dir.path(),
            "config/archrule.toml",
            "[analyzer]\nexclude = [\"**/lib.rs\"]\n",
        );
        let (report, _) =
            run_check_in(dir.path(), Some("minimal"), Some("config/archrule.toml"), None);
        assert_eq!(report.violations().count(), 0);
    }
}
