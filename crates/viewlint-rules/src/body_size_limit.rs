//! Rule to limit the size of a component's rendering body.
//!
//! # Rationale
//!
//! The rendering body is re-evaluated on every state change. Large
//! bodies diff slowly and usually hide extractable subviews.
//!
//! # Detected Patterns
//!
//! - A component's `body` function whose measured line count (blank
//!   and comment lines excluded) exceeds the limit
//!
//! # Configuration
//!
//! - `max_body_lines`: maximum measured lines in a body (default: 50)

use viewlint_core::{
    Category, Finding, MatchContext, Node, NodeKind, ParamSpec, Rule, RuleError, Severity,
};

/// Rule code for body-size-limit.
pub const CODE: &str = "VL001";

/// Rule id for body-size-limit.
pub const ID: &str = "body-size-limit";

/// Default measured-line limit.
pub const DEFAULT_MAX_BODY_LINES: i64 = 50;

/// Name of the primary rendering function in the ingest contract.
const BODY_NAME: &str = "body";

/// Limits measured lines in a component's rendering body.
///
/// Line counting needs the whole subtree span, so the check fires
/// once on subtree exit rather than per child.
#[derive(Debug, Clone, Copy, Default)]
pub struct BodySizeLimit;

impl BodySizeLimit {
    /// Creates the rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Rule for BodySizeLimit {
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
        "Limits measured lines in a component's rendering body"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn parameters(&self) -> Vec<ParamSpec> {
        vec![ParamSpec::int(
            "max_body_lines",
            DEFAULT_MAX_BODY_LINES,
            1,
            "Maximum measured lines in a rendering body",
        )]
    }

    fn applies_to(&self, kind: NodeKind) -> bool {
        kind == NodeKind::Function
    }

    fn check_exit(
        &self,
        node: &Node,
        ctx: &MatchContext<'_, '_>,
    ) -> Result<Vec<Finding>, RuleError> {
        if node.name_str() != BODY_NAME {
            return Ok(Vec::new());
        }
        let Some(component) = ctx.parent().filter(|p| p.kind == NodeKind::Component) else {
            return Ok(Vec::new());
        };

        let measured = ctx.unit.measured_lines(&node.span).ok_or_else(|| {
            RuleError::new(format!(
                "body span ends at line {} but the unit source is shorter",
                node.span.end_line
            ))
        })?;

        let max = ctx.params.int("max_body_lines", DEFAULT_MAX_BODY_LINES);
        if i64::try_from(measured).unwrap_or(i64::MAX) <= max {
            return Ok(Vec::new());
        }

        Ok(vec![Finding::new(
            CODE,
            ID,
            ctx.severity,
            node.span.clone(),
            format!(
                "rendering body of `{}` has {} measured lines (max: {})",
                component.name_str(),
                measured,
                max
            ),
        )
        .with_suggestion(
            "Extract subviews or move branching logic into helper functions",
        )])
    }
}
