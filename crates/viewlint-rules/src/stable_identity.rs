//! Rule for stable identity in dynamically generated lists.
//!
//! # Rationale
//!
//! The renderer diffs repeated children by identifier. A positional
//! identifier (index, offset) reshuffles state and animations as
//! soon as the data reorders, inserts or removes.
//!
//! # Detected Patterns
//!
//! - A `ForEach` whose `id` key path is positional
//! - A `ForEach` over a positional source (`indices`, `enumerated`,
//!   an integer range) keyed by `\.self` or with no `id` at all

use viewlint_core::{Category, Finding, MatchContext, Node, NodeKind, Rule, RuleError, Severity};

/// Rule code for stable-identity.
pub const CODE: &str = "VL005";

/// Rule id for stable-identity.
pub const ID: &str = "stable-identity";

/// List-construction node name in the ingest contract.
const LIST_NAME: &str = "ForEach";

/// Flags positional identity in dynamic lists.
#[derive(Debug, Clone, Copy, Default)]
pub struct StableIdentity;

impl StableIdentity {
    /// Creates the rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Rule for StableIdentity {
    fn id(&self) -> &'static str {
        ID
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn category(&self) -> Category {
        Category::Performance
    }

    fn description(&self) -> &'static str {
        "Dynamic lists need stable per-item identifiers"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn applies_to(&self, kind: NodeKind) -> bool {
        matches!(kind, NodeKind::Component | NodeKind::ModifierCall)
    }

    fn check_enter(
        &self,
        node: &Node,
        ctx: &MatchContext<'_, '_>,
    ) -> Result<Vec<Finding>, RuleError> {
        if node.name_str() != LIST_NAME {
            return Ok(Vec::new());
        }

        let id_arg = node
            .annotation("id")
            .and_then(|a| a.args.first())
            .map(String::as_str);
        let positional_source = has_positional_source(node);

        let problem = match id_arg {
            Some(arg) if positional_key(arg) => {
                Some(format!("list identity is the positional key path `{arg}`"))
            }
            Some(arg) if arg.ends_with(".self") && positional_source => Some(
                "list identity is `\\.self` over a positional data source".to_string(),
            ),
            None if positional_source => {
                Some("list over a positional data source supplies no identifier".to_string())
            }
            _ => None,
        };

        Ok(problem
            .map(|message| {
                vec![Finding::new(
                    CODE,
                    ID,
                    ctx.severity,
                    node.span.clone(),
                    message,
                )
                .with_suggestion(
                    "Key the list by a unique, stable property of the element \
                     (e.g. `id: \\.uuid`), not by its position",
                )]
            })
            .unwrap_or_default())
    }
}

/// Key paths that encode position rather than element identity.
fn positional_key(arg: &str) -> bool {
    matches!(arg, "index" | "offset" | "position")
        || arg.ends_with(".offset")
        || arg.ends_with(".0")
}

/// Is the list's data source positional? The source expression is the
/// first child of the list-construction node.
fn has_positional_source(node: &Node) -> bool {
    node.children.first().is_some_and(|source| {
        let name = source.name_str();
        name.contains("..") || name.ends_with("indices") || name.contains("enumerated")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{run_rule, sp, sp_at};
    use std::sync::Arc;
    use viewlint_core::SourceUnit;

    fn unit(list: Node) -> SourceUnit {
        let root = Node::new(NodeKind::Component, sp(1, 20))
            .with_name("FeedView")
            .with_child(list);
        SourceUnit::new("View.ui", "", root)
    }

    fn list(span_line: usize) -> Node {
        Node::new(NodeKind::Component, sp(span_line, span_line + 4)).with_name(LIST_NAME)
    }

    #[test]
    fn positional_id_key_path_is_flagged_at_the_list_node() {
        let l = list(3)
            .with_annotation("id", vec!["\\.offset".into()])
            .with_child(
                Node::new(NodeKind::ModifierCall, sp_at(3, 9, 40)).with_name("rows.enumerated"),
            );
        let outcome = run_rule(Arc::new(StableIdentity), &unit(l));
        assert_eq!(outcome.findings.len(), 1);
        let f = &outcome.findings[0];
        assert_eq!(f.span.start_line, 3);
        assert!(f.message.contains("\\.offset"));
    }

    #[test]
    fn self_identity_over_range_is_flagged() {
        let l = list(3)
            .with_annotation("id", vec!["\\.self".into()])
            .with_child(Node::new(NodeKind::Identifier, sp_at(3, 9, 18)).with_name("0..<count"));
        let outcome = run_rule(Arc::new(StableIdentity), &unit(l));
        assert_eq!(outcome.findings.len(), 1);
    }

    #[test]
    fn missing_id_over_indices_is_flagged() {
        let l = list(3).with_child(
            Node::new(NodeKind::Identifier, sp_at(3, 9, 22)).with_name("rows.indices"),
        );
        let outcome = run_rule(Arc::new(StableIdentity), &unit(l));
        assert_eq!(outcome.findings.len(), 1);
    }

    #[test]
    fn stable_key_path_is_fine() {
        let l = list(3)
            .with_annotation("id", vec!["\\.uuid".into()])
            .with_child(Node::new(NodeKind::Identifier, sp_at(3, 9, 13)).with_name("rows"));
        let outcome = run_rule(Arc::new(StableIdentity), &unit(l));
        assert!(outcome.findings.is_empty());
    }

    #[test]
    fn self_identity_over_identifiable_data_is_fine() {
        let l = list(3)
            .with_annotation("id", vec!["\\.self".into()])
            .with_child(Node::new(NodeKind::Identifier, sp_at(3, 9, 13)).with_name("tags"));
        let outcome = run_rule(Arc::new(StableIdentity), &unit(l));
        assert!(outcome.findings.is_empty());
    }

    #[test]
    fn other_nodes_are_ignored() {
        let l = Node::new(NodeKind::ModifierCall, sp(3, 3)).with_name("padding");
        let outcome = run_rule(Arc::new(StableIdentity), &unit(l));
        assert!(outcome.findings.is_empty());
    }
}
