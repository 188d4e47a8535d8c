//! Configuration types for archrule.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Config file names looked up in the analysis root, in priority order.
pub const CONFIG_FILE_NAMES: &[&str] = &["archrule.toml", ".archrule.toml"];

/// Config file name looked up in the global directory.
pub const GLOBAL_CONFIG_FILE_NAME: &str = "config.toml";

/// Top-level configuration for archrule.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Preset to use (e.g., "recommended", "strict", "minimal").
    #[serde(default)]
    pub preset: Option<String>,

    /// Severity threshold for test failure (default: "error").
    /// Violations at or above this severity cause `check!()` to fail.
    #[serde(default)]
    pub fail_on: Option<String>,

    /// Analyzer configuration.
    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    /// Per-rule configurations, keyed by rule name.
    #[serde(default)]
    pub rules: HashMap<String, RuleConfig>,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Finds and loads the configuration used to analyze `root`.
    ///
    /// An explicit path wins, joined to `root` when relative, and must exist.
    /// Otherwise the first of [`CONFIG_FILE_NAMES`] present in `root` is
    /// loaded, then [`GLOBAL_CONFIG_FILE_NAME`] in `global_dir`. Without any
    /// file the defaults apply.
    ///
    /// # Errors
    ///
    /// Returns an error if the chosen file cannot be read or parsed.
    pub fn discover(
        root: &Path,
        explicit: Option<&Path>,
        global_dir: Option<&Path>,
    ) -> Result<(Self, ConfigOrigin), ConfigError> {
        let origin = match explicit {
            Some(path) => ConfigOrigin::Explicit(root.join(path)),
            None => CONFIG_FILE_NAMES
                .iter()
                .map(|name| root.join(name))
                .find(|path| path.is_file())
                .map(ConfigOrigin::Project)
                .or_else(|| {
                    global_dir
                        .map(|dir| dir.join(GLOBAL_CONFIG_FILE_NAME))
                        .filter(|path| path.is_file())
                        .map(ConfigOrigin::Global)
                })
                .unwrap_or(ConfigOrigin::Default),
        };

        let config = match origin.path() {
            Some(path) => {
                debug!("Loading config from {}", path.display());
                Self::from_file(path)?
            }
            None => Self::default(),
        };
        Ok((config, origin))
    }

    /// Checks if a rule is enabled.
    #[must_use]
    pub fn is_rule_enabled(&self, rule_name: &str) -> bool {
        self.rules
            .get(rule_name)
            .map_or(true, |c| c.enabled.unwrap_or(true))
    }

    /// Gets the severity override for a rule.
    #[must_use]
    pub fn rule_severity(&self, rule_name: &str) -> Option<crate::Severity> {
        self.rules.get(rule_name).and_then(|c| c.severity)
    }

    /// Gets the options of a rule, or an empty set when unconfigured.
    #[must_use]
    pub fn rule(&self, rule_name: &str) -> RuleConfig {
        self.rules.get(rule_name).cloned().unwrap_or_default()
    }

    /// Resolves `fail_on` to a severity.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown severity name.
    pub fn fail_on_severity(&self) -> Result<crate::Severity, ConfigError> {
        let name = self.fail_on.as_deref().unwrap_or("error");
        crate::Severity::parse(name).ok_or_else(|| ConfigError::UnknownSeverity {
            value: name.to_string(),
        })
    }
}

/// Where [`Config::discover`] found the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOrigin {
    /// A path given by the caller.
    Explicit(PathBuf),
    /// A config file in the analysis root.
    Project(PathBuf),
    /// The config file of the global directory.
    Global(PathBuf),
    /// No file; defaults apply.
    Default,
}

impl ConfigOrigin {
    /// The loaded file, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(path) | Self::Project(path) | Self::Global(path) => Some(path),
            Self::Default => None,
        }
    }
}

/// What to do when a rule cannot evaluate a type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaultPolicy {
    /// Record a `Faulted` outcome for the type and keep going.
    #[default]
    Isolate,
    /// Abort the whole run with an error.
    Abort,
}

/// Analyzer-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Root directory to analyze (default: current directory).
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Glob patterns to exclude from analysis.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Whether to respect .gitignore files.
    #[serde(default = "default_true")]
    pub respect_gitignore: bool,

    /// Maximum number of threads used for per-type evaluation.
    #[serde(default)]
    pub parallelism: Option<usize>,

    /// Evaluator fault handling.
    #[serde(default)]
    pub on_fault: FaultPolicy,

    /// Whether an unparseable source file aborts model loading.
    #[serde(default)]
    pub fail_on_parse_error: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            exclude: vec!["**/target/**".to_string(), "**/vendor/**".to_string()],
            respect_gitignore: true,
            parallelism: None,
            on_fault: FaultPolicy::default(),
            fail_on_parse_error: false,
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_true() -> bool {
    true
}

/// Per-rule configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Whether this rule is enabled.
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Severity override for this rule.
    #[serde(default)]
    pub severity: Option<crate::Severity>,

    /// Rule-specific options as key-value pairs.
    #[serde(flatten)]
    pub options: HashMap<String, toml::Value>,
}

impl RuleConfig {
    /// Gets a boolean option with a default value.
    #[must_use]
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.options
            .get(key)
            .and_then(toml::Value::as_bool)
            .unwrap_or(default)
    }

    /// Gets an integer option with a default value.
    #[must_use]
    pub fn get_int(&self, key: &str, default: i64) -> i64 {
        self.options
            .get(key)
            .and_then(toml::Value::as_integer)
            .unwrap_or(default)
    }

    /// Gets a string option with a default value.
    #[must_use]
    pub fn get_str<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.options
            .get(key)
            .and_then(|v| v.as_str())
            .unwrap_or(default)
    }

    /// Gets a string array option, or `None` when unset.
    #[must_use]
    pub fn get_str_array(&self, key: &str) -> Option<Vec<String>> {
        self.options.get(key).and_then(|v| v.as_array()).map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect()
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },

    /// Unknown severity name.
    #[error("unknown severity `{value}`, expected: error, warning, info")]
    UnknownSeverity {
        /// The invalid value.
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.analyzer.respect_gitignore);
        assert_eq!(config.analyzer.on_fault, FaultPolicy::Isolate);
        assert!(config.rules.is_empty());
        assert_eq!(config.fail_on_severity().ok(), Some(crate::Severity::Error));
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
fail_on = "warning"

[analyzer]
root = "./services"
exclude = ["**/generated/**"]
parallelism = 2
on_fault = "abort"

[rules.mapper-write-count]
severity = "warning"
baseline = 11
marker = "map_field"

[rules.static-closure-arguments]
enabled = false
"#;

        let config = Config::parse(toml).expect("Failed to parse");
        assert_eq!(config.analyzer.root, PathBuf::from("./services"));
        assert_eq!(config.analyzer.parallelism, Some(2));
        assert_eq!(config.analyzer.on_fault, FaultPolicy::Abort);
        assert!(config.is_rule_enabled("mapper-write-count"));
        assert!(!config.is_rule_enabled("static-closure-arguments"));
        assert!(config.is_rule_enabled("unconfigured"));
        assert_eq!(
            config.rule_severity("mapper-write-count"),
            Some(crate::Severity::Warning)
        );
        assert_eq!(
            config.fail_on_severity().ok(),
            Some(crate::Severity::Warning)
        );

        let rule = config.rule("mapper-write-count");
        assert_eq!(rule.get_int("baseline", 13), 11);
        assert_eq!(rule.get_str("marker", "map"), "map_field");
        assert_eq!(rule.get_str("escape", "auto_map"), "auto_map");
    }

    #[test]
    fn test_unknown_fail_on() {
        let config = Config::parse("fail_on = \"critical\"").expect("Failed to parse");
        assert!(matches!(
            config.fail_on_severity(),
            Err(ConfigError::UnknownSeverity { .. })
        ));
    }

    #[test]
    fn test_string_array_option() {
        let config = Config::parse(
            "[rules.domain-layer-isolation]\nforbidden = [\"**::db::**\", \"**::http::**\"]",
        )
        .expect("Failed to parse");
        let rule = config.rule("domain-layer-isolation");
        assert_eq!(
            rule.get_str_array("forbidden"),
            Some(vec!["**::db::**".to_string(), "**::http::**".to_string()])
        );
        assert_eq!(rule.get_str_array("missing"), None);
    }

    mod discover {
        use super::*;
        use std::fs;
        use tempfile::TempDir;

        fn write(dir: &Path, name: &str, content: &str) {
            fs::write(dir.join(name), content).expect("write");
        }

        #[test]
        fn root_files_win_over_the_global_directory() {
            let root = TempDir::new().expect("tempdir");
            let global = TempDir::new().expect("tempdir");
            write(global.path(), "config.toml", "preset = \"strict\"\n");

            let (config, origin) =
                Config::discover(root.path(), None, Some(global.path())).expect("global");
            assert_eq!(origin, ConfigOrigin::Global(global.path().join("config.toml")));
            assert_eq!(config.preset.as_deref(), Some("strict"));

            write(root.path(), ".archrule.toml", "preset = \"minimal\"\n");
            let (config, origin) =
                Config::discover(root.path(), None, Some(global.path())).expect("dotfile");
            assert_eq!(origin, ConfigOrigin::Project(root.path().join(".archrule.toml")));
            assert_eq!(config.preset.as_deref(), Some("minimal"));

            write(root.path(), "archrule.toml", "fail_on = \"info\"\n");
            let (config, _) =
                Config::discover(root.path(), None, Some(global.path())).expect("plain");
            assert_eq!(config.fail_on.as_deref(), Some("info"));
            assert_eq!(config.preset, None);
        }

        #[test]
        fn explicit_path_is_joined_to_root() {
            let root = TempDir::new().expect("tempdir");
            fs::create_dir_all(root.path().join("ci")).expect("mkdir");
            write(root.path(), "archrule.toml", "preset = \"minimal\"\n");
            write(&root.path().join("ci"), "archrule.toml", "preset = \"strict\"\n");

            let (config, origin) =
                Config::discover(root.path(), Some(Path::new("ci/archrule.toml")), None)
                    .expect("explicit");
            assert_eq!(origin.path(), Some(root.path().join("ci/archrule.toml").as_path()));
            assert_eq!(config.preset.as_deref(), Some("strict"));
        }

        #[test]
        fn missing_explicit_path_is_an_error() {
            let root = TempDir::new().expect("tempdir");
            let err = Config::discover(root.path(), Some(Path::new("missing.toml")), None)
                .expect_err("missing file");
            assert!(matches!(err, ConfigError::Io { .. }));
        }

        #[test]
        fn defaults_without_any_file() {
            let root = TempDir::new().expect("tempdir");
            let (config, origin) = Config::discover(root.path(), None, None).expect("defaults");
            assert_eq!(origin, ConfigOrigin::Default);
            assert!(origin.path().is_none());
            assert!(config.rules.is_empty());
        }

        #[test]
        fn invalid_project_file_is_an_error() {
            let root = TempDir::new().expect("tempdir");
            write(root.path(), "archrule.toml", "preset = [");
            assert!(matches!(
                Config::discover(root.path(), None, None),
                Err(ConfigError::Parse { .. })
            ));
        }
    }
}
