//! Rule binding async work to a component's visible lifetime.
//!
//! # Rationale
//!
//! Work launched from a bare appearance callback keeps running after
//! the component disappears and restarts unconditionally on every
//! reappearance. A lifetime-bound task modifier keyed by an input
//! value is cancelled and restarted for free.
//!
//! # Detected Patterns
//!
//! - An `onAppear` modifier whose subtree starts a `Task` or runs an
//!   `async` closure

use viewlint_core::{Category, Finding, MatchContext, Node, NodeKind, Rule, RuleError, Severity};

/// Rule code for lifecycle-task-binding.
pub const CODE: &str = "VL006";

/// Rule id for lifecycle-task-binding.
pub const ID: &str = "lifecycle-task-binding";

/// The unconditional appearance callback.
const ON_APPEAR: &str = "onAppear";

/// Binds appearance-started async work to the visible lifetime.
#[derive(Debug, Clone, Copy, Default)]
pub struct LifecycleTaskBinding;

impl LifecycleTaskBinding {
    /// Creates the rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Rule for LifecycleTaskBinding {
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
        "Async work must be bound to the view's visible lifetime"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn applies_to(&self, kind: NodeKind) -> bool {
        kind == NodeKind::ModifierCall
    }

    fn check_enter(
        &self,
        node: &Node,
        ctx: &MatchContext<'_, '_>,
    ) -> Result<Vec<Finding>, RuleError> {
        if node.name_str() != ON_APPEAR {
            return Ok(Vec::new());
        }
        let starts_async = node.descendants().any(|n| {
            (n.kind == NodeKind::ModifierCall && n.name_str() == "Task")
                || (n.kind == NodeKind::Closure && n.has_annotation("async"))
        });
        if !starts_async {
            return Ok(Vec::new());
        }

        Ok(vec![Finding::new(
            CODE,
            ID,
            ctx.severity,
            node.span.clone(),
            "async work started in `onAppear` is not cancelled when the view disappears",
        )
        .with_suggestion(
            "Use `.task(id:)` bound to an input value so the work is tied to the \
             view's visible lifetime and cancelled on change",
        )])
    }
}
