//! The rule trait and rule parameter machinery.

use crate::context::MatchContext;
use crate::model::{Node, NodeKind};
use crate::types::{Category, Finding, Severity};
use std::collections::BTreeMap;
use thiserror::Error;

/// An error raised by a rule while evaluating a node.
///
/// Rule failures never abort a run; the engine records them as
/// incidents and keeps analyzing.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct RuleError {
    /// What went wrong inside the rule.
    pub message: String,
}

impl RuleError {
    /// Creates a new rule error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Value of a rule parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    /// Integer parameter (thresholds, limits).
    Int(i64),
    /// String parameter.
    Str(String),
}

impl ParamValue {
    /// Returns the human-readable kind name, for error messages.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "integer",
            Self::Str(_) => "string",
        }
    }
}

impl std::fmt::Display for ParamValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Str(v) => write!(f, "{v}"),
        }
    }
}

/// Declaration of one named rule parameter.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    /// Parameter name as written in configuration.
    pub name: &'static str,
    /// Default value, also fixing the parameter's type.
    pub default: ParamValue,
    /// Inclusive lower bound for integer parameters.
    pub min: Option<i64>,
    /// One-line description for `list-rules` output.
    pub description: &'static str,
}

impl ParamSpec {
    /// Declares an integer parameter with a lower bound.
    #[must_use]
    pub fn int(name: &'static str, default: i64, min: i64, description: &'static str) -> Self {
        Self {
            name,
            default: ParamValue::Int(default),
            min: Some(min),
            description,
        }
    }
}

/// Resolved parameter values for one active rule.
///
/// Built once at catalog resolution (defaults overlaid with
/// configuration overrides) and immutable during the run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleParams(BTreeMap<String, ParamValue>);

impl RuleParams {
    /// Sets a parameter value.
    pub fn insert(&mut self, name: impl Into<String>, value: ParamValue) {
        self.0.insert(name.into(), value);
    }

    /// Looks up a raw parameter value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.0.get(name)
    }

    /// Gets an integer parameter with a fallback default.
    #[must_use]
    pub fn int(&self, name: &str, default: i64) -> i64 {
        match self.0.get(name) {
            Some(ParamValue::Int(v)) => *v,
            _ => default,
        }
    }

    /// Gets a string parameter with a fallback default.
    #[must_use]
    pub fn str<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        match self.0.get(name) {
            Some(ParamValue::Str(v)) => v.as_str(),
            _ => default,
        }
    }
}

/// A structural lint rule over the model tree.
///
/// Rules are pure functions of (node, ancestor context, parameters);
/// any state a rule needs across a subtree is derived from the node
/// itself inside [`Rule::check_exit`], never held between calls.
///
/// # Example
///
/// ```ignore
/// use viewlint_core::{Category, Finding, MatchContext, Node, NodeKind, Rule, RuleError, Severity};
///
/// pub struct NoEmptyComponents;
///
/// impl Rule for NoEmptyComponents {
///     fn id(&self) -> &'static str { "no-empty-components" }
///     fn code(&self) -> &'static str { "VL042" }
///     fn category(&self) -> Category { Category::Architecture }
///     fn default_severity(&self) -> Severity { Severity::Warning }
///     fn applies_to(&self, kind: NodeKind) -> bool { kind == NodeKind::Component }
///
///     fn check_enter(&self, node: &Node, ctx: &MatchContext<'_, '_>)
///         -> Result<Vec<Finding>, RuleError>
///     {
///         if node.children.is_empty() {
///             return Ok(vec![Finding::new(
///                 self.code(), self.id(), ctx.severity,
///                 node.span.clone(), "component declares nothing",
///             )]);
///         }
///         Ok(Vec::new())
///     }
/// }
/// ```
pub trait Rule: Send + Sync {
    /// Stable kebab-case identifier (e.g. "body-size-limit").
    fn id(&self) -> &'static str;

    /// Rule code (e.g. "VL001").
    fn code(&self) -> &'static str;

    /// Category this rule belongs to.
    fn category(&self) -> Category;

    /// Brief description of what this rule checks.
    fn description(&self) -> &'static str {
        ""
    }

    /// Default severity before configuration overrides.
    fn default_severity(&self) -> Severity;

    /// Named parameters this rule accepts.
    fn parameters(&self) -> Vec<ParamSpec> {
        Vec::new()
    }

    /// Which node kinds this rule inspects.
    fn applies_to(&self, kind: NodeKind) -> bool;

    /// Called when the traversal enters an applicable node.
    ///
    /// # Errors
    ///
    /// A [`RuleError`] is recorded as an engine incident; the run
    /// continues.
    fn check_enter(
        &self,
        _node: &Node,
        _ctx: &MatchContext<'_, '_>,
    ) -> Result<Vec<Finding>, RuleError> {
        Ok(Vec::new())
    }

    /// Called when the traversal leaves an applicable node, after
    /// all of its children. Cross-node aggregation (line counting,
    /// cumulative nesting) belongs here.
    ///
    /// # Errors
    ///
    /// A [`RuleError`] is recorded as an engine incident; the run
    /// continues.
    fn check_exit(
        &self,
        _node: &Node,
        _ctx: &MatchContext<'_, '_>,
    ) -> Result<Vec<Finding>, RuleError> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_fall_back_to_defaults() {
        let mut params = RuleParams::default();
        params.insert("max_body_lines", ParamValue::Int(30));
        assert_eq!(params.int("max_body_lines", 50), 30);
        assert_eq!(params.int("missing", 50), 50);
        assert_eq!(params.str("missing", "x"), "x");
    }

    #[test]
    fn param_value_kind_names() {
        assert_eq!(ParamValue::Int(1).kind_name(), "integer");
        assert_eq!(ParamValue::Str("a".into()).kind_name(), "string");
    }

    #[test]
    fn int_spec_carries_bound() {
        let spec = ParamSpec::int("max_body_lines", 50, 1, "line limit");
        assert_eq!(spec.min, Some(1));
        assert_eq!(spec.default, ParamValue::Int(50));
    }
}
