//! Configuration file resolution with global layering.
//!
//! Builds the ordered list of configuration layers, later layers
//! overriding earlier ones per rule entry:
//!
//! 1. `~/.viewlint/config.toml` (global base, when present)
//! 2. `{project}/viewlint.toml` or `.viewlint.toml`
//!
//! An explicit `--config` path replaces the whole stack.

use std::path::{Path, PathBuf};

/// Where one configuration layer was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly specified via `--config` flag.
    Explicit(PathBuf),
    /// Found in the project directory.
    Project(PathBuf),
    /// Loaded from the global config directory (`~/.viewlint/`).
    Global(PathBuf),
}

impl ConfigSource {
    /// Returns the resolved path.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Global(p) => p,
        }
    }

    /// Returns `true` if the layer came from the global directory.
    #[must_use]
    pub fn is_global(&self) -> bool {
        matches!(self, Self::Global(_))
    }
}

/// Project-level config file names, checked in order.
const PROJECT_CONFIG_NAMES: &[&str] = &["viewlint.toml", ".viewlint.toml"];

/// Config file name within the global config directory.
const GLOBAL_CONFIG_NAME: &str = "config.toml";

/// Resolves the ordered configuration layers, lowest precedence first.
///
/// See module-level docs for resolution order. An empty result means
/// defaults apply.
#[must_use]
pub fn resolve(project_dir: &Path, explicit: Option<&Path>) -> Vec<ConfigSource> {
    resolve_inner(project_dir, explicit, global_config_dir())
}

/// Testable core: accepts `global_dir` as parameter to avoid env var races.
fn resolve_inner(
    project_dir: &Path,
    explicit: Option<&Path>,
    global_dir: Option<PathBuf>,
) -> Vec<ConfigSource> {
    // An explicit path from --config replaces the whole stack
    if let Some(p) = explicit {
        return vec![ConfigSource::Explicit(p.to_path_buf())];
    }

    let mut layers = Vec::new();

    if let Some(dir) = global_dir {
        let candidate = dir.join(GLOBAL_CONFIG_NAME);
        if candidate.exists() {
            tracing::debug!("Found global config: {}", candidate.display());
            layers.push(ConfigSource::Global(candidate));
        }
    }

    for name in PROJECT_CONFIG_NAMES {
        let candidate = project_dir.join(name);
        if candidate.exists() {
            tracing::debug!("Found project config: {}", candidate.display());
            layers.push(ConfigSource::Project(candidate));
            break;
        }
    }

    layers
}

/// Returns the global config directory path.
///
/// Resolution: `$VIEWLINT_CONFIG_DIR` > `~/.viewlint/`
///
/// The env var override enables testing and custom CI setups.
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("VIEWLINT_CONFIG_DIR") {
        return Some(PathBuf::from(dir));
    }
    home::home_dir().map(|h| h.join(".viewlint"))
}
