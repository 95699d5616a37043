//! The diagnostic aggregator: dedup, suppression, ordering, summary.

use crate::config::Configuration;
use crate::engine::{AnalysisOutcome, EngineIncident};
use crate::model::Span;
use crate::suppress::Suppression;
use crate::types::{Finding, Severity};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Rule id of the aggregator-owned catalog-hygiene finding.
pub const UNUSED_SUPPRESSION_ID: &str = "unused-suppression";

/// Rule code of the catalog-hygiene finding.
pub const UNUSED_SUPPRESSION_CODE: &str = "VL900";

/// Per-severity finding counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// Number of error findings.
    pub errors: usize,
    /// Number of warning findings.
    pub warnings: usize,
    /// Number of info findings.
    pub infos: usize,
}

impl Summary {
    fn count(findings: &[Finding]) -> Self {
        let mut summary = Self::default();
        for finding in findings {
            match finding.severity {
                Severity::Error => summary.errors += 1,
                Severity::Warning => summary.warnings += 1,
                Severity::Info => summary.infos += 1,
            }
        }
        summary
    }
}

/// Aggregated output of one analysis run.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Report {
    /// Ordered findings after dedup and suppression.
    pub findings: Vec<Finding>,
    /// Rule evaluation failures the run continued past.
    pub incidents: Vec<EngineIncident>,
    /// Number of source units analyzed.
    pub units_checked: usize,
    /// Per-severity counts over `findings`.
    pub summary: Summary,
}

impl Report {
    /// Tests whether any finding meets the severity threshold, for
    /// exit-code decisions by the CLI.
    #[must_use]
    pub fn has_findings_at(&self, severity: Severity) -> bool {
        self.findings.iter().any(|f| f.severity >= severity)
    }
}

/// Aggregates raw matcher output into a report.
///
/// Identical (rule id, span) pairs are deduplicated, first occurrence
/// wins. Suppressions remove matching findings; a directive that
/// silenced nothing yields an Info-level [`UNUSED_SUPPRESSION_ID`]
/// finding (disable it via configuration if unwanted). Findings are
/// ordered by (file, line, column, severity descending, rule id
/// ascending) — a contract, because downstream tooling diffs reports.
#[must_use]
pub fn aggregate(
    outcome: AnalysisOutcome,
    suppressions: &[Suppression],
    config: &Configuration,
    units_checked: usize,
) -> Report {
    let mut seen: HashSet<(String, Span)> = HashSet::new();
    let mut used: Vec<bool> = vec![false; suppressions.len()];
    let mut findings: Vec<Finding> = Vec::new();

    for finding in outcome.findings {
        if !seen.insert((finding.rule.clone(), finding.span.clone())) {
            continue;
        }
        let mut silenced = false;
        for (idx, suppression) in suppressions.iter().enumerate() {
            if suppression.silences(&finding.span.file, finding.span.start_line, &finding.rule) {
                used[idx] = true;
                silenced = true;
            }
        }
        if !silenced {
            findings.push(finding);
        }
    }

    if config.is_rule_enabled(UNUSED_SUPPRESSION_ID) {
        let severity = config
            .rule_severity(UNUSED_SUPPRESSION_ID)
            .unwrap_or(Severity::Info);
        for (suppression, used) in suppressions.iter().zip(&used) {
            if *used {
                continue;
            }
            let span = Span::new(
                suppression.file.clone(),
                suppression.line,
                1,
                suppression.line,
                1,
            );
            findings.push(Finding::new(
                UNUSED_SUPPRESSION_CODE,
                UNUSED_SUPPRESSION_ID,
                severity,
                span,
                format!(
                    "suppression of `{}` matches no finding; remove the stale directive",
                    suppression
                        .rules
                        .iter()
                        .cloned()
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            ));
        }
    }

    sort_findings(&mut findings);
    let summary = Summary::count(&findings);

    Report {
        findings,
        incidents: outcome.incidents,
        units_checked,
        summary,
    }
}

/// The ordering contract: file, then position, then severity
/// descending, then rule id ascending.
fn sort_findings(findings: &mut [Finding]) {
    findings.sort_by(|a, b| {
        a.span
            .file
            .cmp(&b.span.file)
            .then(a.span.start_line.cmp(&b.span.start_line))
            .then(a.span.start_col.cmp(&b.span.start_col))
            .then(b.severity.cmp(&a.severity))
            .then(a.rule.cmp(&b.rule))
    });
}
