//! Core types for findings and severities.

use crate::model::Span;
use miette::{Diagnostic, SourceSpan};
use serde::{Deserialize, Serialize};

/// Severity level for findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message, does not fail a check.
    Info,
    /// Warning that should be addressed.
    Warning,
    /// Error that must be fixed.
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info" => Ok(Self::Info),
            "warning" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown severity `{other}`")),
        }
    }
}

/// Rule category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Structure and ownership of components.
    Architecture,
    /// Rendering and diffing performance.
    Performance,
    /// Isolation domains and task lifetimes.
    Concurrency,
    /// Reference captures and value ownership.
    Memory,
    /// Naming and identifier conventions.
    Style,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Architecture => write!(f, "architecture"),
            Self::Performance => write!(f, "performance"),
            Self::Concurrency => write!(f, "concurrency"),
            Self::Memory => write!(f, "memory"),
            Self::Style => write!(f, "style"),
        }
    }
}

/// One reported rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Rule code (e.g. "VL001").
    pub code: String,
    /// Stable rule identifier (e.g. "body-size-limit").
    pub rule: String,
    /// Severity after configuration overrides.
    pub severity: Severity,
    /// Where the violation occurred.
    pub span: Span,
    /// Human-readable message.
    pub message: String,
    /// Suggested fix, text only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl Finding {
    /// Creates a new finding.
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        rule: impl Into<String>,
        severity: Severity,
        span: Span,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            rule: rule.into(),
            severity,
            span,
            message: message.into(),
            suggestion: None,
        }
    }

    /// Attaches a suggested-fix description.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Formats the finding for terminal output.
    #[must_use]
    pub fn format(&self) -> String {
        use std::fmt::Write;
        let mut output = format!("{} {} at {}\n", self.code, self.rule, self.span);
        let _ = writeln!(output, "  {}: {}", self.severity, self.message);
        if let Some(suggestion) = &self.suggestion {
            let _ = writeln!(output, "  = help: {suggestion}");
        }
        output
    }
}

impl std::fmt::Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} [{}] {}",
            self.span, self.severity, self.code, self.message
        )
    }
}

/// Converts a Finding to a miette Diagnostic for rich error display.
#[allow(dead_code)] // Public API for miette integration
#[derive(Debug, thiserror::Error, Diagnostic)]
#[error("{message}")]
pub struct FindingDiagnostic {
    message: String,
    #[help]
    help: Option<String>,
    #[label("{label_message}")]
    span: SourceSpan,
    label_message: String,
}

impl FindingDiagnostic {
    /// Builds a diagnostic from a finding and the byte offset/length
    /// of its span within the unit source.
    #[must_use]
    pub fn new(finding: &Finding, offset: usize, length: usize) -> Self {
        Self {
            message: format!("[{}] {}", finding.code, finding.message),
            help: finding.suggestion.clone(),
            span: SourceSpan::from((offset, length)),
            label_message: finding.rule.clone(),
        }
    }
}
