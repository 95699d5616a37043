//! Rule presets for common configurations.

use crate::{
    BodySizeLimit, CaptureDiscipline, ComponentNaming, IsolationConsistency,
    LifecycleTaskBinding, StableIdentity, StateOwnership,
};
use std::sync::Arc;
use viewlint_core::{Catalog, CatalogError, Rule};

/// Preset configurations for viewlint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Recommended rules with sensible defaults.
    Recommended,
    /// All rules, including stylistic ones.
    Strict,
    /// Minimal rules for gradual adoption.
    Minimal,
}

impl Preset {
    /// Returns the rules for this preset.
    #[must_use]
    pub fn rules(self) -> Vec<Arc<dyn Rule>> {
        match self {
            Self::Recommended => recommended_rules(),
            Self::Strict => all_rules(),
            Self::Minimal => minimal_rules(),
        }
    }
}

/// Returns the recommended set of rules.
///
/// Includes:
/// - `body-size-limit` (VL001) - Caps rendering function length
/// - `state-ownership` (VL002) - Owning wrappers on fresh values only
/// - `isolation-consistency` (VL003) - State access from the right domain
/// - `capture-discipline` (VL004) - Weak owner captures in stored closures
/// - `stable-identity` (VL005) - Stable keys for list construction
/// - `lifecycle-task-binding` (VL006) - Lifecycle work bound to inputs
#[must_use]
pub fn recommended_rules() -> Vec<Arc<dyn Rule>> {
    vec![
        Arc::new(BodySizeLimit::new()),
        Arc::new(StateOwnership::new()),
        Arc::new(IsolationConsistency::new()),
        Arc::new(CaptureDiscipline::new()),
        Arc::new(StableIdentity::new()),
        Arc::new(LifecycleTaskBinding::new()),
    ]
}

/// Returns the minimal set of rules.
///
/// For gradual adoption, only includes the two correctness rules:
/// `state-ownership` and `capture-discipline`.
#[must_use]
pub fn minimal_rules() -> Vec<Arc<dyn Rule>> {
    vec![Arc::new(StateOwnership::new()), Arc::new(CaptureDiscipline::new())]
}

/// Returns all available rules.
#[must_use]
pub fn all_rules() -> Vec<Arc<dyn Rule>> {
    let mut rules = recommended_rules();
    rules.push(Arc::new(ComponentNaming::new()));
    rules
}

/// Builds a catalog with every rule registered.
pub fn default_catalog() -> Result<Catalog, CatalogError> {
    let mut catalog = Catalog::new();
    for rule in all_rules() {
        catalog.register(rule)?;
    }
    Ok(catalog)
}
