//! The matcher engine: one pre-order walk offering every node to
//! every applicable rule.

use crate::catalog::ActiveRuleSet;
use crate::context::{MatchContext, UnitContext};
use crate::model::{ModelError, Node, Span, SourceUnit};
use crate::types::Finding;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// A rule evaluation failure, isolated to one rule and node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineIncident {
    /// The rule that failed.
    pub rule: String,
    /// The node it failed on.
    pub span: Span,
    /// The rule's error message.
    pub message: String,
}

impl std::fmt::Display for EngineIncident {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "rule `{}` failed at {}: {}",
            self.rule, self.span, self.message
        )
    }
}

/// Raw matcher output for one unit, in traversal order.
#[derive(Debug, Default)]
pub struct AnalysisOutcome {
    /// Findings produced by the rules.
    pub findings: Vec<Finding>,
    /// Rule evaluation failures; the run continued past each.
    pub incidents: Vec<EngineIncident>,
}

impl AnalysisOutcome {
    /// Merges another outcome into this one.
    pub fn extend(&mut self, other: AnalysisOutcome) {
        self.findings.extend(other.findings);
        self.incidents.extend(other.incidents);
    }
}

/// Analyzes one source unit against an active rule set.
///
/// The unit is validated once at ingestion; a malformed unit is
/// rejected as a whole. The walk itself is purely functional over
/// the immutable model: each run owns its ancestor stack and finding
/// buffer, so units can be analyzed in parallel without locking.
///
/// # Errors
///
/// Returns [`ModelError::Malformed`] when the unit violates span
/// containment or ordering.
pub fn analyze(unit: &SourceUnit, rules: &ActiveRuleSet) -> Result<AnalysisOutcome, ModelError> {
    unit.validate()?;
    debug!(
        file = %unit.file.display(),
        rules = rules.len(),
        "analyzing unit"
    );

    let mut walker = Walker {
        unit: UnitContext::new(unit),
        rules,
        ancestors: Vec::new(),
        findings: Vec::new(),
        incidents: Vec::new(),
    };
    walker.visit(&unit.root);

    Ok(AnalysisOutcome {
        findings: walker.findings,
        incidents: walker.incidents,
    })
}

struct Walker<'a> {
    unit: UnitContext<'a>,
    rules: &'a ActiveRuleSet,
    ancestors: Vec<&'a Node>,
    findings: Vec<Finding>,
    incidents: Vec<EngineIncident>,
}

enum Hook {
    Enter,
    Exit,
}

impl<'a> Walker<'a> {
    fn visit(&mut self, node: &'a Node) {
        self.offer(node, &Hook::Enter);
        self.ancestors.push(node);
        for child in &node.children {
            self.visit(child);
        }
        self.ancestors.pop();
        self.offer(node, &Hook::Exit);
    }

    fn offer(&mut self, node: &'a Node, hook: &Hook) {
        let rules = self.rules;
        for active in rules.iter() {
            if !active.rule.applies_to(node.kind) {
                continue;
            }
            let ctx = MatchContext {
                unit: &self.unit,
                ancestors: &self.ancestors,
                params: &active.params,
                severity: active.severity,
            };
            let result = match hook {
                Hook::Enter => active.rule.check_enter(node, &ctx),
                Hook::Exit => active.rule.check_exit(node, &ctx),
            };
            match result {
                Ok(findings) => self.findings.extend(findings),
                Err(e) => {
                    warn!(
                        rule = active.rule.id(),
                        span = %node.span,
                        "rule evaluation failed: {e}"
                    );
                    self.incidents.push(EngineIncident {
                        rule: active.rule.id().to_string(),
                        span: node.span.clone(),
                        message: e.message,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::config::Configuration;
    use crate::model::NodeKind;
    use crate::rule::{Rule, RuleError};
    use crate::types::{Category, Severity};
    use std::sync::Arc;

    fn sp(l1: usize, l2: usize) -> Span {
        Span::new("View.ui", l1, 1, l2, 80)
    }

    /// Flags every Identifier on enter, counts children on exit of
    /// Components.
    struct CountingRule;

    impl Rule for CountingRule {
        fn id(&self) -> &'static str {
            "counting-rule"
        }
        fn code(&self) -> &'static str {
            "VL991"
        }
        fn category(&self) -> Category {
            Category::Style
        }
        fn default_severity(&self) -> Severity {
            Severity::Info
        }
        fn applies_to(&self, kind: NodeKind) -> bool {
            matches!(kind, NodeKind::Identifier | NodeKind::Component)
        }
        fn check_enter(
            &self,
            node: &Node,
            ctx: &MatchContext<'_, '_>,
        ) -> Result<Vec<Finding>, RuleError> {
            if node.kind == NodeKind::Identifier {
                return Ok(vec![Finding::new(
                    self.code(),
                    self.id(),
                    ctx.severity,
                    node.span.clone(),
                    format!("identifier at depth {}", ctx.ancestors.len()),
                )]);
            }
            Ok(Vec::new())
        }
        fn check_exit(
            &self,
            node: &Node,
            ctx: &MatchContext<'_, '_>,
        ) -> Result<Vec<Finding>, RuleError> {
            if node.kind == NodeKind::Component {
                return Ok(vec![Finding::new(
                    self.code(),
                    self.id(),
                    ctx.severity,
                    node.span.clone(),
                    format!("component with {} children", node.children.len()),
                )]);
            }
            Ok(Vec::new())
        }
    }

    /// Fails on every Function node.
    struct BrokenRule;

    impl Rule for BrokenRule {
        fn id(&self) -> &'static str {
            "broken-rule"
        }
        fn code(&self) -> &'static str {
            "VL992"
        }
        fn category(&self) -> Category {
            Category::Style
        }
        fn default_severity(&self) -> Severity {
            Severity::Error
        }
        fn applies_to(&self, kind: NodeKind) -> bool {
            kind == NodeKind::Function
        }
        fn check_enter(
            &self,
            _node: &Node,
            _ctx: &MatchContext<'_, '_>,
        ) -> Result<Vec<Finding>, RuleError> {
            Err(RuleError::new("predicate blew up"))
        }
    }

    fn unit() -> SourceUnit {
        let root = Node::new(NodeKind::Component, sp(1, 10))
            .with_name("ProfileView")
            .with_child(
                Node::new(NodeKind::Function, sp(2, 8))
                    .with_name("body")
                    .with_child(Node::new(NodeKind::Identifier, sp(3, 3)).with_name("name")),
            );
        SourceUnit::new("View.ui", "", root)
    }

    fn active(rules: Vec<Arc<dyn Rule>>) -> ActiveRuleSet {
        let mut catalog = Catalog::new();
        for rule in rules {
            catalog.register(rule).expect("register");
        }
        catalog
            .resolve(&Configuration::default())
            .expect("resolve")
    }

    #[test]
    fn enter_and_exit_hooks_both_fire() {
        let outcome =
            analyze(&unit(), &active(vec![Arc::new(CountingRule)])).expect("analyze");
        assert_eq!(outcome.findings.len(), 2);
        // Pre-order: identifier enter precedes component exit.
        assert!(outcome.findings[0].message.contains("identifier at depth 2"));
        assert!(outcome.findings[1].message.contains("component with 1 children"));
    }

    #[test]
    fn rule_failure_is_isolated() {
        let outcome = analyze(
            &unit(),
            &active(vec![Arc::new(CountingRule), Arc::new(BrokenRule)]),
        )
        .expect("analyze");
        assert_eq!(outcome.findings.len(), 2);
        assert_eq!(outcome.incidents.len(), 1);
        assert_eq!(outcome.incidents[0].rule, "broken-rule");
        assert_eq!(outcome.incidents[0].span.start_line, 2);
    }

    #[test]
    fn malformed_unit_is_rejected_whole() {
        let root = Node::new(NodeKind::Component, sp(1, 2))
            .with_child(Node::new(NodeKind::Function, sp(5, 9)));
        let unit = SourceUnit::new("View.ui", "", root);
        assert!(analyze(&unit, &active(vec![Arc::new(CountingRule)])).is_err());
    }

    #[test]
    fn repeated_runs_are_identical() {
        let unit = unit();
        let rules = active(vec![Arc::new(CountingRule)]);
        let a = analyze(&unit, &rules).expect("first");
        let b = analyze(&unit, &rules).expect("second");
        assert_eq!(a.findings, b.findings);
        assert_eq!(a.incidents, b.incidents);
    }
}
