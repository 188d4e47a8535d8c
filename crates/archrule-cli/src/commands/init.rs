//! Init command implementation.

use anyhow::{bail, Result};
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# archrule configuration

# recommended | strict | minimal
preset = "recommended"

# Lowest severity that fails `archrule check` and `archrule::check!()`
fail_on = "error"

[analyzer]
# Workspace root to analyze (default: current directory)
# root = "."

# Glob patterns to exclude from analysis
exclude = [
    "**/target/**",
    "**/vendor/**",
    "**/generated/**",
]

# Respect .gitignore files
respect_gitignore = true

# isolate: record the type as faulted and continue; abort: stop the run
on_fault = "isolate"

# Worker threads for per-type evaluation (default: rayon's global pool)
# parallelism = 4

# Rule configurations
# Each rule can be enabled/disabled and have its severity overridden

# Strict preset only: `static ||` closures need unstable syntax.
# Enable it elsewhere with a stable qualifier.
# [rules.static-closure-arguments]
# enabled = true
# modifier = "move"

[rules.mapper-write-count]
base = "DataMapper"
category = "persistence"
baseline = 13

# [rules.domain-layer-isolation]
# enabled = true
# forbidden = ["**::persistence::**", "**::api::**", "*_persistence::**", "*_api::**"]
"#;

/// Config file written by `archrule init`.
const CONFIG_NAME: &str = "archrule.toml";

/// Runs the init command in `dir`.
pub fn run(dir: &Path, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_NAME);

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)?;

    println!("Created {CONFIG_NAME}");
    println!("\nNext steps:");
    println!("  1. Edit {CONFIG_NAME} to configure rules");
    println!("  2. Run: archrule check");

    Ok(())
}
