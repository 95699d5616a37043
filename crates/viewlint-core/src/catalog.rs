//! The rule catalog: registration and configuration binding.

use crate::config::Configuration;
use crate::rule::{ParamValue, Rule, RuleParams};
use crate::types::Severity;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Errors fatal at configuration-resolution time.
///
/// Nothing has been analyzed when these occur, so the run aborts
/// before traversal rather than producing misleading partial output.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A rule with this identifier is already registered.
    #[error("duplicate rule id `{0}`")]
    DuplicateRuleId(String),

    /// Configuration references an unregistered rule.
    #[error("unknown rule id `{0}` in configuration")]
    UnknownRuleId(String),

    /// A parameter override is incompatible with the rule's
    /// declared parameter domain.
    #[error("invalid parameter `{param}` for rule `{rule_id}`: {message}")]
    InvalidParameter {
        /// Rule the override addressed.
        rule_id: String,
        /// Parameter name.
        param: String,
        /// Why the override was rejected.
        message: String,
    },
}

/// The registry of known rules.
///
/// Rules are registered at process start and immutable thereafter;
/// the catalog is the only structure shared between parallel runs,
/// which is safe because resolution never mutates it.
#[derive(Default)]
pub struct Catalog {
    rules: Vec<Arc<dyn Rule>>,
    ids: HashMap<String, usize>,
}

impl Catalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a rule.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateRuleId`] when a rule with
    /// the same identifier is already registered.
    pub fn register(&mut self, rule: Arc<dyn Rule>) -> Result<(), CatalogError> {
        let id = rule.id().to_string();
        if self.ids.contains_key(&id) {
            return Err(CatalogError::DuplicateRuleId(id));
        }
        self.ids.insert(id, self.rules.len());
        self.rules.push(rule);
        Ok(())
    }

    /// Tests whether a rule id is registered.
    #[must_use]
    pub fn contains(&self, rule_id: &str) -> bool {
        self.ids.contains_key(rule_id)
    }

    /// Number of registered rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterates the registered rules in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Rule>> {
        self.rules.iter()
    }

    /// Binds a configuration snapshot to the catalog, producing the
    /// active rule set for one run: disabled rules filtered out,
    /// severity and parameter overrides validated and applied.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownRuleId`] for configured rules
    /// that were never registered (the aggregator-owned
    /// `unused-suppression` id is exempt) and
    /// [`CatalogError::InvalidParameter`] for overrides outside a
    /// parameter's declared domain.
    pub fn resolve(&self, config: &Configuration) -> Result<ActiveRuleSet, CatalogError> {
        for rule_id in config.rules.keys() {
            if !self.contains(rule_id) && rule_id != crate::aggregate::UNUSED_SUPPRESSION_ID {
                return Err(CatalogError::UnknownRuleId(rule_id.clone()));
            }
        }

        let mut active = Vec::new();
        for rule in &self.rules {
            if !config.is_rule_enabled(rule.id()) {
                debug!(rule = rule.id(), "rule disabled by configuration");
                continue;
            }
            let severity = config
                .rule_severity(rule.id())
                .unwrap_or_else(|| rule.default_severity());
            let params = bind_params(rule.as_ref(), config)?;
            active.push(ActiveRule {
                rule: Arc::clone(rule),
                severity,
                params,
            });
        }
        Ok(ActiveRuleSet { rules: active })
    }
}

/// One rule bound to its resolved severity and parameters.
pub struct ActiveRule {
    /// The rule implementation.
    pub rule: Arc<dyn Rule>,
    /// Severity after configuration overrides.
    pub severity: Severity,
    /// Parameters after configuration overrides.
    pub params: RuleParams,
}

/// The immutable set of rules active for one analysis run.
pub struct ActiveRuleSet {
    rules: Vec<ActiveRule>,
}

impl ActiveRuleSet {
    /// Iterates the active rules.
    pub fn iter(&self) -> impl Iterator<Item = &ActiveRule> {
        self.rules.iter()
    }

    /// Number of active rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether no rules are active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Overlays configuration overrides on the rule's parameter defaults.
fn bind_params(rule: &dyn Rule, config: &Configuration) -> Result<RuleParams, CatalogError> {
    let specs = rule.parameters();
    let mut params = RuleParams::default();
    for spec in &specs {
        params.insert(spec.name, spec.default.clone());
    }

    let Some(settings) = config.rule(rule.id()) else {
        return Ok(params);
    };

    for (name, value) in &settings.params {
        let Some(spec) = specs.iter().find(|s| s.name == name) else {
            return Err(CatalogError::InvalidParameter {
                rule_id: rule.id().to_string(),
                param: name.clone(),
                message: "rule declares no such parameter".to_string(),
            });
        };
        let bound = match (&spec.default, value) {
            (ParamValue::Int(_), toml::Value::Integer(v)) => {
                if let Some(min) = spec.min {
                    if *v < min {
                        return Err(CatalogError::InvalidParameter {
                            rule_id: rule.id().to_string(),
                            param: name.clone(),
                            message: format!("{v} is below the minimum of {min}"),
                        });
                    }
                }
                ParamValue::Int(*v)
            }
            (ParamValue::Str(_), toml::Value::String(v)) => ParamValue::Str(v.clone()),
            (expected, got) => {
                return Err(CatalogError::InvalidParameter {
                    rule_id: rule.id().to_string(),
                    param: name.clone(),
                    message: format!(
                        "expected {} value, got {}",
                        expected.kind_name(),
                        got.type_str()
                    ),
                });
            }
        };
        params.insert(name.clone(), bound);
    }
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigDocument;
    use crate::context::MatchContext;
    use crate::model::{Node, NodeKind};
    use crate::rule::{ParamSpec, RuleError};
    use crate::types::{Category, Finding};

    struct StubRule;

    impl Rule for StubRule {
        fn id(&self) -> &'static str {
            "stub-rule"
        }
        fn code(&self) -> &'static str {
            "VL999"
        }
        fn category(&self) -> Category {
            Category::Style
        }
        fn default_severity(&self) -> Severity {
            Severity::Warning
        }
        fn parameters(&self) -> Vec<ParamSpec> {
            vec![ParamSpec::int("max_items", 10, 0, "item limit")]
        }
        fn applies_to(&self, kind: NodeKind) -> bool {
            kind == NodeKind::Component
        }
        fn check_enter(
            &self,
            _node: &Node,
            _ctx: &MatchContext<'_, '_>,
        ) -> Result<Vec<Finding>, RuleError> {
            Ok(Vec::new())
        }
    }

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog.register(Arc::new(StubRule)).expect("register");
        catalog
    }

    fn config(toml: &str) -> Configuration {
        let doc = ConfigDocument::parse(toml).expect("config should parse");
        Configuration::resolve(vec![doc])
    }

    #[test]
    fn duplicate_registration_fails() {
        let mut catalog = catalog();
        assert!(matches!(
            catalog.register(Arc::new(StubRule)),
            Err(CatalogError::DuplicateRuleId(id)) if id == "stub-rule"
        ));
    }

    #[test]
    fn unknown_configured_rule_fails_resolution() {
        let result = catalog().resolve(&config("[rules.no-such-rule]\nenabled = true\n"));
        assert!(matches!(
            result,
            Err(CatalogError::UnknownRuleId(id)) if id == "no-such-rule"
        ));
    }

    #[test]
    fn defaults_apply_without_configuration() {
        let active = catalog()
            .resolve(&Configuration::default())
            .expect("resolve");
        assert_eq!(active.len(), 1);
        let rule = active.iter().next().expect("one rule");
        assert_eq!(rule.severity, Severity::Warning);
        assert_eq!(rule.params.int("max_items", 0), 10);
    }

    #[test]
    fn overrides_bind_severity_and_params() {
        let active = catalog()
            .resolve(&config(
                "[rules.stub-rule]\nseverity = \"error\"\nmax_items = 3\n",
            ))
            .expect("resolve");
        let rule = active.iter().next().expect("one rule");
        assert_eq!(rule.severity, Severity::Error);
        assert_eq!(rule.params.int("max_items", 0), 3);
    }

    #[test]
    fn disabled_rule_is_filtered() {
        let active = catalog()
            .resolve(&config("[rules.stub-rule]\nenabled = false\n"))
            .expect("resolve");
        assert!(active.is_empty());
    }

    #[test]
    fn below_minimum_param_is_invalid() {
        let result = catalog().resolve(&config("[rules.stub-rule]\nmax_items = -1\n"));
        assert!(matches!(
            result,
            Err(CatalogError::InvalidParameter { param, .. }) if param == "max_items"
        ));
    }

    #[test]
    fn wrong_param_type_is_invalid() {
        let result = catalog().resolve(&config("[rules.stub-rule]\nmax_items = \"lots\"\n"));
        assert!(matches!(result, Err(CatalogError::InvalidParameter { .. })));
    }

    #[test]
    fn undeclared_param_is_invalid() {
        let result = catalog().resolve(&config("[rules.stub-rule]\nmax_depth = 2\n"));
        assert!(matches!(
            result,
            Err(CatalogError::InvalidParameter { param, .. }) if param == "max_depth"
        ));
    }

    #[test]
    fn unused_suppression_id_is_configurable() {
        let result = catalog().resolve(&config("[rules.unused-suppression]\nenabled = false\n"));
        assert!(result.is_ok());
    }
}
