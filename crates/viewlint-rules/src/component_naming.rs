//! Naming conventions for components, properties and functions.
//!
//! # Detected Patterns
//!
//! - A component whose name is not UpperCamelCase
//! - A property or function whose name is not lowerCamelCase
//! - Underscores in any declared name

use viewlint_core::{Category, Finding, MatchContext, Node, NodeKind, Rule, RuleError, Severity};

/// Rule code for component-naming.
pub const CODE: &str = "VL007";

/// Rule id for component-naming.
pub const ID: &str = "component-naming";

/// Enforces declaration naming conventions.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComponentNaming;

impl ComponentNaming {
    /// Creates the rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Rule for ComponentNaming {
    fn id(&self) -> &'static str {
        ID
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn category(&self) -> Category {
        Category::Style
    }

    fn description(&self) -> &'static str {
        "Naming conventions for components, properties and functions"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn applies_to(&self, kind: NodeKind) -> bool {
        matches!(
            kind,
            NodeKind::Component | NodeKind::PropertyDeclaration | NodeKind::Function
        )
    }

    fn check_enter(
        &self,
        node: &Node,
        ctx: &MatchContext<'_, '_>,
    ) -> Result<Vec<Finding>, RuleError> {
        let Some(name) = node.name.as_deref() else {
            return Ok(Vec::new());
        };
        let Some(first) = name.chars().next() else {
            return Ok(Vec::new());
        };

        let problem = if name.contains('_') {
            Some(format!("name `{name}` contains underscores"))
        } else if node.kind == NodeKind::Component && first.is_ascii_lowercase() {
            Some(format!("component `{name}` should be UpperCamelCase"))
        } else if node.kind != NodeKind::Component && first.is_ascii_uppercase() {
            Some(format!("{} `{name}` should be lowerCamelCase", node.kind))
        } else {
            None
        };

        Ok(problem
            .map(|message| {
                vec![Finding::new(CODE, ID, ctx.severity, node.span.clone(), message)
                    .with_suggestion(suggest(node.kind, name))]
            })
            .unwrap_or_default())
    }
}

fn suggest(kind: NodeKind, name: &str) -> String {
    let camel: String = name
        .split('_')
        .filter(|part| !part.is_empty())
        .enumerate()
        .map(|(i, part)| {
            if i == 0 {
                part.to_string()
            } else {
                capitalize(part)
            }
        })
        .collect();
    let renamed = if kind == NodeKind::Component {
        capitalize(&camel)
    } else {
        decapitalize(&camel)
    };
    format!("Rename to `{renamed}`")
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |c| {
        c.to_ascii_uppercase().to_string() + chars.as_str()
    })
}

fn decapitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |c| {
        c.to_ascii_lowercase().to_string() + chars.as_str()
    })
}
