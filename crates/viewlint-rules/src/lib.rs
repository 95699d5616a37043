//! # viewlint-rules
//!
//! Built-in structural rules for viewlint.
//!
//! ## Available Rules
//!
//! | Code | Id | Category | Description |
//! |------|----|----------|-------------|
//! | VL001 | `body-size-limit` | performance | Limits measured lines in a component's rendering body |
//! | VL002 | `state-ownership` | architecture | Owning state wrappers must construct their value |
//! | VL003 | `isolation-consistency` | concurrency | State access must stay in the component's isolation domain |
//! | VL004 | `capture-discipline` | memory | Owner captures must be weak/unowned, with liveness guards |
//! | VL005 | `stable-identity` | performance | Dynamic lists need stable per-item identifiers |
//! | VL006 | `lifecycle-task-binding` | concurrency | Async work must be bound to the view's visible lifetime |
//! | VL007 | `component-naming` | style | Naming conventions for components, properties, functions |
//!
//! ## Usage
//!
//! ```ignore
//! use viewlint_core::{analyze, Configuration};
//! use viewlint_rules::default_catalog;
//!
//! let catalog = default_catalog()?;
//! let active = catalog.resolve(&Configuration::default())?;
//! let outcome = analyze(&unit, &active)?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod body_size_limit;
mod capture_discipline;
mod component_naming;
mod isolation_consistency;
mod lifecycle_task_binding;
mod presets;
mod stable_identity;
mod state_ownership;

pub use body_size_limit::BodySizeLimit;
pub use capture_discipline::CaptureDiscipline;
pub use component_naming::ComponentNaming;
pub use isolation_consistency::IsolationConsistency;
pub use lifecycle_task_binding::LifecycleTaskBinding;
pub use presets::{all_rules, default_catalog, minimal_rules, recommended_rules, Preset};
pub use stable_identity::StableIdentity;
pub use state_ownership::StateOwnership;

/// Re-export core types for convenience.
pub use viewlint_core::{Category, Finding, Rule, Severity};

#[cfg(test)]
pub(crate) mod testutil {
    use std::sync::Arc;
    use viewlint_core::{
        analyze, AnalysisOutcome, Catalog, Configuration, Rule, SourceUnit, Span,
    };

    /// Spans a whole-line range in the test unit file.
    pub fn sp(l1: usize, l2: usize) -> Span {
        Span::new("View.ui", l1, 1, l2, 120)
    }

    /// Spans a sub-line range, for nesting several nodes on one line.
    pub fn sp_at(line: usize, c1: usize, c2: usize) -> Span {
        Span::new("View.ui", line, c1, line, c2)
    }

    /// Runs a single rule with default configuration over a unit.
    pub fn run_rule(rule: Arc<dyn Rule>, unit: &SourceUnit) -> AnalysisOutcome {
        let mut catalog = Catalog::new();
        catalog.register(rule).expect("register test rule");
        let active = catalog
            .resolve(&Configuration::default())
            .expect("resolve test rule");
        analyze(unit, &active).expect("unit should be well-formed")
    }

    /// Runs a single rule with the given TOML rule configuration.
    pub fn run_rule_with_config(
        rule: Arc<dyn Rule>,
        unit: &SourceUnit,
        config_toml: &str,
    ) -> AnalysisOutcome {
        let mut catalog = Catalog::new();
        catalog.register(rule).expect("register test rule");
        let doc =
            viewlint_core::ConfigDocument::parse(config_toml).expect("test config should parse");
        let active = catalog
            .resolve(&Configuration::resolve(vec![doc]))
            .expect("resolve test rule");
        analyze(unit, &active).expect("unit should be well-formed")
    }
}
