//! Rule for state-ownership correctness of property wrappers.
//!
//! # Rationale
//!
//! An owning wrapper (`@State`, `@StateObject`) hands the component
//! the source of truth. Wrapping a passed-in value makes two owners
//! disagree: the component snapshots the value and silently stops
//! observing the caller's copy.
//!
//! # Detected Patterns
//!
//! - An owning wrapper on a property whose initializer is a bare
//!   value reference (no construction anywhere in the initializer)
//!
//! Properties without an initializer are not flagged; assigning in
//! an initializer body is a legitimate construction site the model
//! cannot see.

use viewlint_core::{Category, Finding, MatchContext, Node, NodeKind, Rule, RuleError, Severity};

/// Rule code for state-ownership.
pub const CODE: &str = "VL002";

/// Rule id for state-ownership.
pub const ID: &str = "state-ownership";

/// Wrappers that claim ownership of the wrapped value.
const OWNING_WRAPPERS: &[&str] = &["State", "StateObject"];

/// Wrappers that merely observe a value owned elsewhere.
const OBSERVING_WRAPPERS: &[&str] = &["ObservedObject", "Binding", "EnvironmentObject"];

/// Flags owning state wrappers on values the component did not
/// construct.
#[derive(Debug, Clone, Copy, Default)]
pub struct StateOwnership;

impl StateOwnership {
    /// Creates the rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Rule for StateOwnership {
    fn id(&self) -> &'static str {
        ID
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn category(&self) -> Category {
        Category::Architecture
    }

    fn description(&self) -> &'static str {
        "Owning state wrappers must construct their value"
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn applies_to(&self, kind: NodeKind) -> bool {
        kind == NodeKind::PropertyDeclaration
    }

    fn check_enter(
        &self,
        node: &Node,
        ctx: &MatchContext<'_, '_>,
    ) -> Result<Vec<Finding>, RuleError> {
        let Some(wrapper) = node
            .annotations
            .iter()
            .find(|a| OWNING_WRAPPERS.contains(&a.name.as_str()))
        else {
            return Ok(Vec::new());
        };

        // Initializer expression is the property's child subtree.
        let Some(initializer) = node.children.first() else {
            return Ok(Vec::new());
        };
        if is_fresh_construction(initializer) {
            return Ok(Vec::new());
        }
        if initializer.kind != NodeKind::Identifier {
            return Ok(Vec::new());
        }

        Ok(vec![Finding::new(
            CODE,
            ID,
            ctx.severity,
            node.span.clone(),
            format!(
                "`@{}` owns property `{}` but its initializer is the passed-in value `{}`",
                wrapper.name,
                node.name_str(),
                initializer.name_str()
            ),
        )
        .with_suggestion(format!(
            "Construct the value here, or observe it with @{}",
            OBSERVING_WRAPPERS.join("/@")
        ))])
    }
}

/// A fresh construction contains at least one call expression.
fn is_fresh_construction(initializer: &Node) -> bool {
    initializer.kind == NodeKind::ModifierCall
        || initializer
            .descendants()
            .any(|n| n.kind == NodeKind::ModifierCall)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{run_rule, sp, sp_at};
    use std::sync::Arc;
    use viewlint_core::SourceUnit;

    fn unit_with_property(property: Node) -> SourceUnit {
        let root = Node::new(NodeKind::Component, sp(1, 10))
            .with_name("ProfileView")
            .with_child(property);
        SourceUnit::new("View.ui", "", root)
    }

    #[test]
    fn owning_wrapper_on_parameter_reference_is_flagged() {
        let property = Node::new(NodeKind::PropertyDeclaration, sp(2, 2))
            .with_name("model")
            .with_annotation("StateObject", vec![])
            .with_child(Node::new(NodeKind::Identifier, sp_at(2, 30, 42)).with_name("injected"));
        let outcome = run_rule(Arc::new(StateOwnership), &unit_with_property(property));
        assert_eq!(outcome.findings.len(), 1);
        let f = &outcome.findings[0];
        assert_eq!(f.severity, Severity::Error);
        assert!(f.message.contains("`@StateObject` owns property `model`"));
        assert!(f.message.contains("`injected`"));
    }

    #[test]
    fn fresh_construction_is_fine() {
        let property = Node::new(NodeKind::PropertyDeclaration, sp(2, 2))
            .with_name("model")
            .with_annotation("StateObject", vec![])
            .with_child(
                Node::new(NodeKind::ModifierCall, sp_at(2, 30, 60)).with_name("ProfileModel"),
            );
        let outcome = run_rule(Arc::new(StateOwnership), &unit_with_property(property));
        assert!(outcome.findings.is_empty());
    }

    #[test]
    fn construction_nested_in_initializer_is_fine() {
        // e.g. `@State var index = items.startIndex` style wrapping a call
        let property = Node::new(NodeKind::PropertyDeclaration, sp(2, 2))
            .with_name("rows")
            .with_annotation("State", vec![])
            .with_child(
                Node::new(NodeKind::Identifier, sp_at(2, 30, 70))
                    .with_name("wrapped")
                    .with_child(
                        Node::new(NodeKind::ModifierCall, sp_at(2, 40, 60)).with_name("makeRows"),
                    ),
            );
        let outcome = run_rule(Arc::new(StateOwnership), &unit_with_property(property));
        assert!(outcome.findings.is_empty());
    }

    #[test]
    fn observing_wrapper_is_not_the_rules_business() {
        let property = Node::new(NodeKind::PropertyDeclaration, sp(2, 2))
            .with_name("model")
            .with_annotation("ObservedObject", vec![])
            .with_child(Node::new(NodeKind::Identifier, sp_at(2, 30, 42)).with_name("injected"));
        let outcome = run_rule(Arc::new(StateOwnership), &unit_with_property(property));
        assert!(outcome.findings.is_empty());
    }

    #[test]
    fn missing_initializer_is_not_flagged() {
        let property = Node::new(NodeKind::PropertyDeclaration, sp(2, 2))
            .with_name("count")
            .with_annotation("State", vec![]);
        let outcome = run_rule(Arc::new(StateOwnership), &unit_with_property(property));
        assert!(outcome.findings.is_empty());
    }
}
