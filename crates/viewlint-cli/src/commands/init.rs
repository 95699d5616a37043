//! Init command implementation.

use anyhow::{bail, Result};
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# viewlint configuration
# See https://github.com/viewlint/viewlint for documentation

# Findings at or above this severity fail the run
fail_on = "error"

# Rule configurations
# Each rule can be enabled/disabled and have its severity overridden

[rules.body-size-limit]
enabled = true
# severity = "error"  # Override default severity
max_body_lines = 50

[rules.state-ownership]
enabled = true

# [rules.component-naming]
# enabled = true

# Reports for suppressions that silence nothing
# [rules.unused-suppression]
# enabled = false
"#;

/// Runs the init command.
pub fn run(force: bool) -> Result<()> {
    let config_path = Path::new("viewlint.toml");

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(config_path, DEFAULT_CONFIG)?;

    println!("Created viewlint.toml");
    println!("\nNext steps:");
    println!("  1. Edit viewlint.toml to configure rules");
    println!("  2. Run: viewlint check");

    Ok(())
}
