//! Rule for capture-list safety in closures.
//!
//! # Rationale
//!
//! A closure stored by its owner and capturing that owner strongly
//! creates a retain cycle. A weak capture breaks the cycle, but an
//! async closure must then test liveness before doing work, or it
//! races with the owner's teardown.
//!
//! # Detected Patterns
//!
//! - A closure referencing its owner (`self`) without a `weak` or
//!   `unowned` capture
//! - An async-executing closure with a `weak` capture and no leading
//!   liveness guard (the front-end summarises the guard as the
//!   `early-exit` annotation)

use viewlint_core::{Category, Finding, MatchContext, Node, NodeKind, Rule, RuleError, Severity};

/// Rule code for capture-discipline.
pub const CODE: &str = "VL004";

/// Rule id for capture-discipline.
pub const ID: &str = "capture-discipline";

/// Capture-list annotation name in the ingest contract.
const CAPTURE: &str = "capture";

/// Annotation marking an async-executing closure.
const ASYNC: &str = "async";

/// Annotation summarising a leading liveness guard.
const EARLY_EXIT: &str = "early-exit";

/// The owner reference name.
const OWNER: &str = "self";

/// Enforces weak/unowned owner captures and liveness guards.
#[derive(Debug, Clone, Copy, Default)]
pub struct CaptureDiscipline;

impl CaptureDiscipline {
    /// Creates the rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Rule for CaptureDiscipline {
    fn id(&self) -> &'static str {
        ID
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn category(&self) -> Category {
        Category::Memory
    }

    fn description(&self) -> &'static str {
        "Owner captures must be weak/unowned, with liveness guards in async closures"
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn applies_to(&self, kind: NodeKind) -> bool {
        kind == NodeKind::Closure
    }

    fn check_enter(
        &self,
        node: &Node,
        ctx: &MatchContext<'_, '_>,
    ) -> Result<Vec<Finding>, RuleError> {
        let capture = node.annotation(CAPTURE);
        let discipline = capture.and_then(|a| a.args.first()).map(String::as_str);
        let disciplined = matches!(discipline, Some("weak" | "unowned"));

        let captures_owner = capture
            .map(|a| a.args.iter().any(|arg| arg == OWNER))
            .unwrap_or(false)
            || references_owner(node);

        let mut findings = Vec::new();
        if captures_owner && !disciplined {
            findings.push(
                Finding::new(
                    CODE,
                    ID,
                    ctx.severity,
                    node.span.clone(),
                    "closure captures its owner strongly",
                )
                .with_suggestion("Declare `[weak self]` or `[unowned self]` in the capture list"),
            );
        }

        if discipline == Some("weak") && is_async(node, ctx) && !node.has_annotation(EARLY_EXIT) {
            findings.push(
                Finding::new(
                    CODE,
                    ID,
                    ctx.severity,
                    node.span.clone(),
                    "async closure with `[weak self]` does not test liveness before running",
                )
                .with_suggestion(
                    "Start with `guard let self else { return }` so the work exits early \
                     when the owner is gone",
                ),
            );
        }

        Ok(findings)
    }
}

/// Does the closure body reference the owner directly? Nested
/// closures carry their own capture lists and are checked on their
/// own visit.
fn references_owner(node: &Node) -> bool {
    fn walk(node: &Node) -> bool {
        node.children.iter().any(|child| {
            if child.kind == NodeKind::Closure {
                return false;
            }
            (child.kind == NodeKind::Identifier && child.name_str() == OWNER) || walk(child)
        })
    }
    walk(node)
}

/// Async execution: the closure is annotated `async` or handed
/// straight to a `Task` construction.
fn is_async(node: &Node, ctx: &MatchContext<'_, '_>) -> bool {
    node.has_annotation(ASYNC)
        || ctx
            .parent()
            .map(|p| p.kind == NodeKind::ModifierCall && p.name_str() == "Task")
            .unwrap_or(false)
}
