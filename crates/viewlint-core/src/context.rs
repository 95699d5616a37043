//! Context types passed to rules during a traversal.

use crate::model::{Node, NodeKind, Span, SourceUnit};
use crate::rule::RuleParams;
use crate::types::Severity;
use std::path::Path;

/// Read-only view of the unit under analysis.
#[derive(Debug, Clone, Copy)]
pub struct UnitContext<'a> {
    /// File path relative to the project root.
    pub file: &'a Path,
    /// Raw source text of the unit.
    pub source: &'a str,
}

impl<'a> UnitContext<'a> {
    /// Creates a context over a source unit.
    #[must_use]
    pub fn new(unit: &'a SourceUnit) -> Self {
        Self {
            file: &unit.file,
            source: &unit.source,
        }
    }

    /// Counts measured source lines within a span: blank lines and
    /// comment lines are excluded.
    ///
    /// Returns `None` when the span extends past the end of the unit
    /// source, which indicates a front-end/model mismatch.
    #[must_use]
    pub fn measured_lines(&self, span: &Span) -> Option<usize> {
        if span.start_line == 0 || span.end_line < span.start_line {
            return None;
        }
        let mut seen = 0;
        let mut counted = 0;
        for (idx, line) in self.source.lines().enumerate() {
            let lineno = idx + 1;
            if lineno > span.end_line {
                break;
            }
            if lineno >= span.start_line {
                seen += 1;
                if is_measured(line) {
                    counted += 1;
                }
            }
        }
        if seen == span.end_line - span.start_line + 1 {
            Some(counted)
        } else {
            None
        }
    }

    /// Calculates the byte offset of a 1-indexed line/column position.
    #[must_use]
    pub fn offset_for(&self, line: usize, column: usize) -> usize {
        if line == 0 {
            return 0;
        }
        let mut offset = 0;
        for (i, line_content) in self.source.lines().enumerate() {
            if i + 1 == line {
                return offset + column.saturating_sub(1);
            }
            offset += line_content.len() + 1;
        }
        offset
    }
}

/// Line-based comment heuristic: full semantic comment detection
/// belongs to the front-end, the core only needs line counting.
fn is_measured(line: &str) -> bool {
    let trimmed = line.trim();
    !(trimmed.is_empty()
        || trimmed.starts_with("//")
        || trimmed.starts_with("/*")
        || trimmed.starts_with('*'))
}

/// Context handed to a rule for one node visit.
///
/// The ancestor stack is immutable and rebuilt per run; rules never
/// share mutable state, so rule evaluation order cannot matter.
pub struct MatchContext<'a, 'b> {
    /// The unit being analyzed.
    pub unit: &'b UnitContext<'a>,
    /// Enclosing nodes, outermost first, innermost last.
    pub ancestors: &'b [&'a Node],
    /// Resolved parameters for the rule being evaluated.
    pub params: &'b RuleParams,
    /// Resolved severity for the rule being evaluated.
    pub severity: Severity,
}

impl<'a> MatchContext<'a, '_> {
    /// Returns the innermost enclosing node, if any.
    #[must_use]
    pub fn parent(&self) -> Option<&'a Node> {
        self.ancestors.last().copied()
    }

    /// Returns the innermost enclosing node of the given kind.
    #[must_use]
    pub fn enclosing(&self, kind: NodeKind) -> Option<&'a Node> {
        self.ancestors.iter().rev().copied().find(|n| n.kind == kind)
    }

    /// Returns the enclosing nodes between the current node and the
    /// innermost enclosing node of `kind`, innermost first. Empty
    /// when no such ancestor exists.
    #[must_use]
    pub fn ancestors_until(&self, kind: NodeKind) -> Vec<&'a Node> {
        let mut out = Vec::new();
        for node in self.ancestors.iter().rev() {
            if node.kind == kind {
                return out;
            }
            out.push(node);
        }
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Node;

    fn unit(source: &str) -> SourceUnit {
        let lines = source.lines().count().max(1);
        SourceUnit::new(
            "View.ui",
            source,
            Node::new(
                NodeKind::Component,
                Span::new("View.ui", 1, 1, lines, 1),
            ),
        )
    }

    #[test]
    fn measured_lines_skips_blank_and_comments() {
        let source = "var body: some View {\n\n    // header\n    Text(name)\n}\n";
        let u = unit(source);
        let ctx = UnitContext::new(&u);
        let span = Span::new("View.ui", 1, 1, 5, 1);
        assert_eq!(ctx.measured_lines(&span), Some(3));
    }

    #[test]
    fn measured_lines_rejects_span_past_eof() {
        let u = unit("one line\n");
        let ctx = UnitContext::new(&u);
        let span = Span::new("View.ui", 1, 1, 12, 1);
        assert_eq!(ctx.measured_lines(&span), None);
    }

    #[test]
    fn offset_for_walks_lines() {
        let u = unit("line1\nline2\nline3");
        let ctx = UnitContext::new(&u);
        assert_eq!(ctx.offset_for(1, 1), 0);
        assert_eq!(ctx.offset_for(2, 1), 6);
        assert_eq!(ctx.offset_for(2, 3), 8);
    }

    #[test]
    fn enclosing_finds_nearest_kind() {
        let component = Node::new(NodeKind::Component, Span::new("V.ui", 1, 1, 9, 1));
        let function = Node::new(NodeKind::Function, Span::new("V.ui", 2, 1, 8, 1));
        let ancestors: Vec<&Node> = vec![&component, &function];
        let u = unit("");
        let uctx = UnitContext::new(&u);
        let params = RuleParams::default();
        let ctx = MatchContext {
            unit: &uctx,
            ancestors: &ancestors,
            params: &params,
            severity: Severity::Warning,
        };
        assert_eq!(ctx.parent().map(|n| n.kind), Some(NodeKind::Function));
        assert_eq!(
            ctx.enclosing(NodeKind::Component).map(|n| n.kind),
            Some(NodeKind::Component)
        );
        assert_eq!(ctx.ancestors_until(NodeKind::Component).len(), 1);
        assert!(ctx.ancestors_until(NodeKind::Closure).is_empty());
    }
}
