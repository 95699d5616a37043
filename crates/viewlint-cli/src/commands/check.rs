//! Check command implementation.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use viewlint_core::{
    aggregate, analyze, scan_suppressions, ActiveRuleSet, AnalysisOutcome, Catalog,
    ConfigDocument, Configuration, Severity, SourceUnit, Suppression,
};
use viewlint_rules::{all_rules, default_catalog};

use crate::OutputFormat;

/// File suffix for serialized structural units.
const UNIT_SUFFIX: &str = ".uimodel.json";

/// Runs the check command.
pub fn run(
    path: &Path,
    format: OutputFormat,
    rules_filter: Option<String>,
    fail_on: Option<Severity>,
    explicit_config: Option<&Path>,
) -> Result<()> {
    let project_dir = if path.is_dir() {
        path
    } else {
        path.parent().unwrap_or_else(|| Path::new("."))
    };

    let config = load_config(project_dir, explicit_config)?;
    for err in &config.parse_errors {
        tracing::warn!("Skipping config entry [rules.{}]: {}", err.rule_id, err.message);
    }

    let catalog = build_catalog(rules_filter.as_deref())?;
    let active = catalog
        .resolve(&config)
        .context("Failed to resolve rule configuration")?;

    let unit_paths = discover_units(path)?;
    tracing::info!(
        "Analyzing {} unit(s) with {} rule(s)",
        unit_paths.len(),
        active.len()
    );

    let batch = analyze_units(&unit_paths, &active)?;

    let report = aggregate(
        batch.outcome,
        &batch.suppressions,
        &config,
        batch.units_checked,
    );

    super::output::print(&report, format)?;

    let threshold = fail_on.unwrap_or(config.fail_on);
    if batch.rejected > 0 || report.has_findings_at(threshold) {
        std::process::exit(1);
    }

    Ok(())
}

/// Accumulated results of analyzing a set of unit files.
#[derive(Default)]
struct UnitBatch {
    outcome: AnalysisOutcome,
    suppressions: Vec<Suppression>,
    units_checked: usize,
    rejected: usize,
}

/// Analyzes each unit file, collecting findings and suppressions.
///
/// Rejected units contribute nothing to the batch: their suppression
/// directives are not collected, so they cannot surface as unused.
fn analyze_units(unit_paths: &[PathBuf], active: &ActiveRuleSet) -> Result<UnitBatch> {
    let mut batch = UnitBatch::default();

    for unit_path in unit_paths {
        let content = std::fs::read_to_string(unit_path)
            .with_context(|| format!("Failed to read {}", unit_path.display()))?;

        let unit = match SourceUnit::from_json(&content) {
            Ok(unit) => unit,
            Err(e) => {
                tracing::error!("Rejecting {}: {}", unit_path.display(), e);
                batch.rejected += 1;
                continue;
            }
        };

        match analyze(&unit, active) {
            Ok(unit_outcome) => {
                batch
                    .suppressions
                    .extend(scan_suppressions(&unit.file, &unit.source));
                batch.outcome.extend(unit_outcome);
                batch.units_checked += 1;
            }
            Err(e) => {
                tracing::error!("Rejecting {}: {}", unit_path.display(), e);
                batch.rejected += 1;
            }
        }
    }

    Ok(batch)
}

/// Loads and layers the resolved configuration documents.
fn load_config(project_dir: &Path, explicit: Option<&Path>) -> Result<Configuration> {
    let mut docs = Vec::new();
    for source in crate::config_resolver::resolve(project_dir, explicit) {
        if source.is_global() {
            tracing::info!("Using global config: {}", source.path().display());
        }
        let doc = ConfigDocument::from_file(source.path())
            .with_context(|| format!("Failed to load config: {}", source.path().display()))?;
        docs.push(doc);
    }
    Ok(Configuration::resolve(docs))
}

/// Builds the catalog, honoring the `--rules` filter when present.
fn build_catalog(filter: Option<&str>) -> Result<Catalog> {
    let Some(filter) = filter else {
        return default_catalog().context("Failed to build rule catalog");
    };

    let names: Vec<&str> = filter.split(',').map(str::trim).collect();
    let mut catalog = Catalog::new();
    for rule in all_rules() {
        if names.contains(&rule.id()) || names.contains(&rule.code()) {
            catalog
                .register(rule)
                .context("Failed to build rule catalog")?;
        }
    }
    for name in &names {
        if !catalog.contains(name) && !catalog.iter().any(|r| r.code() == *name) {
            tracing::warn!("Unknown rule: {}", name);
        }
    }
    Ok(catalog)
}

/// Finds unit files under `path`, sorted for deterministic output.
fn discover_units(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let pattern = format!("{}/**/*{UNIT_SUFFIX}", path.display());
    let mut paths: Vec<PathBuf> = glob::glob(&pattern)
        .with_context(|| format!("Invalid search pattern for {}", path.display()))?
        .filter_map(std::result::Result::ok)
        .collect();
    paths.sort();
    Ok(paths)
}
