//! Rule for isolation-domain consistency of state access.
//!
//! # Rationale
//!
//! A component's state-carrying properties live in the component's
//! isolation domain (UI-confined by default). A function or closure
//! annotated into a different domain that touches that state races
//! with the renderer unless it hops explicitly.
//!
//! # Detected Patterns
//!
//! - A function/closure whose effective isolation domain differs
//!   from its component's, referencing a state-carrying property
//!   without a `<Domain>.run` hop on the access path
//!
//! `nonisolated` opts a function/closure out entirely. Accesses
//! inside nested functions/closures are checked when those nodes are
//! visited, never twice.

use std::collections::BTreeSet;
use viewlint_core::{Category, Finding, MatchContext, Node, NodeKind, Rule, RuleError, Severity};

/// Rule code for isolation-consistency.
pub const CODE: &str = "VL003";

/// Rule id for isolation-consistency.
pub const ID: &str = "isolation-consistency";

/// Annotation opting a function/closure out of isolation checking.
const NONISOLATED: &str = "nonisolated";

/// Components are UI-confined unless annotated otherwise.
const DEFAULT_COMPONENT_DOMAIN: &str = "MainActor";

/// Wrappers that make a property state-carrying.
const STATE_WRAPPERS: &[&str] = &[
    "State",
    "StateObject",
    "ObservedObject",
    "Binding",
    "EnvironmentObject",
    "Published",
];

/// Flags cross-domain access to component state without a hop.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsolationConsistency;

impl IsolationConsistency {
    /// Creates the rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Rule for IsolationConsistency {
    fn id(&self) -> &'static str {
        ID
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn category(&self) -> Category {
        Category::Concurrency
    }

    fn description(&self) -> &'static str {
        "State access must stay in the component's isolation domain"
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn applies_to(&self, kind: NodeKind) -> bool {
        matches!(kind, NodeKind::Function | NodeKind::Closure)
    }

    fn check_enter(
        &self,
        node: &Node,
        ctx: &MatchContext<'_, '_>,
    ) -> Result<Vec<Finding>, RuleError> {
        if node.has_annotation(NONISOLATED) {
            return Ok(Vec::new());
        }
        let Some(component) = ctx.enclosing(NodeKind::Component) else {
            return Ok(Vec::new());
        };

        let state_names = state_property_names(component);
        if state_names.is_empty() {
            return Ok(Vec::new());
        }

        let component_domain =
            isolation_domain(component).unwrap_or(DEFAULT_COMPONENT_DOMAIN);
        let Some(node_domain) = effective_domain(node, ctx) else {
            // nonisolated somewhere on the enclosing chain
            return Ok(Vec::new());
        };
        let Some(node_domain) = node_domain else {
            // Inherited from the component: same domain by definition.
            return Ok(Vec::new());
        };
        if node_domain == component_domain {
            return Ok(Vec::new());
        }

        let hop = format!("{component_domain}.run");
        let mut findings = Vec::new();
        collect_accesses(
            node,
            &state_names,
            &hop,
            false,
            &mut |access: &Node| {
                findings.push(
                    Finding::new(
                        CODE,
                        ID,
                        ctx.severity,
                        access.span.clone(),
                        format!(
                            "`{}` is confined to {} but is accessed from a {} {}",
                            access.name_str(),
                            component_domain,
                            node_domain,
                            node.kind
                        ),
                    )
                    .with_suggestion(format!(
                        "Hop explicitly with `{hop}`, or mark the {} `{NONISOLATED}`",
                        node.kind
                    )),
                );
            },
        );
        Ok(findings)
    }
}

/// Names of the component's state-carrying properties.
fn state_property_names(component: &Node) -> BTreeSet<&str> {
    component
        .children
        .iter()
        .filter(|c| c.kind == NodeKind::PropertyDeclaration)
        .filter(|c| {
            c.annotations
                .iter()
                .any(|a| STATE_WRAPPERS.contains(&a.name.as_str()))
        })
        .filter_map(|c| c.name.as_deref())
        .collect()
}

/// The isolation domain a node declares, if any.
fn isolation_domain(node: &Node) -> Option<&str> {
    node.annotations
        .iter()
        .map(|a| a.name.as_str())
        .find(|name| *name == "MainActor" || name.ends_with("Actor"))
}

/// Resolves the node's effective domain against its enclosing chain.
///
/// `None` means a `nonisolated` opt-out applies; `Some(None)` means
/// the domain is inherited from the component itself.
fn effective_domain<'a>(
    node: &'a Node,
    ctx: &MatchContext<'a, '_>,
) -> Option<Option<&'a str>> {
    if let Some(domain) = isolation_domain(node) {
        return Some(Some(domain));
    }
    for ancestor in ctx.ancestors_until(NodeKind::Component) {
        if ancestor.has_annotation(NONISOLATED) {
            return None;
        }
        if let Some(domain) = isolation_domain(ancestor) {
            return Some(Some(domain));
        }
    }
    Some(None)
}

/// Walks the node's direct body, skipping nested functions/closures
/// and marking subtrees under an explicit hop call.
fn collect_accesses<'a>(
    node: &'a Node,
    state_names: &BTreeSet<&str>,
    hop: &str,
    hopped: bool,
    sink: &mut impl FnMut(&'a Node),
) {
    for child in &node.children {
        if matches!(child.kind, NodeKind::Function | NodeKind::Closure) {
            continue;
        }
        let hopped = hopped || (child.kind == NodeKind::ModifierCall && child.name_str() == hop);
        if child.kind == NodeKind::Identifier
            && !hopped
            && state_names.contains(child.name_str())
        {
            sink(child);
        }
        collect_accesses(child, state_names, hop, hopped, sink);
    }
}
