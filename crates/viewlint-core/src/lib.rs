//! # viewlint-core
//!
//! Core engine for structural analysis of declarative, component-based
//! UI source. An external front-end supplies a pre-built
//! [`SourceUnit`] (the Structural Model); this crate provides:
//!
//! - [`Node`] / [`SourceUnit`] — the read-only structural model
//! - [`Rule`] trait and [`Catalog`] — the declarative rule catalog
//! - [`analyze`] — the matcher engine (single pre-order walk)
//! - [`aggregate`] / [`Report`] — dedup, suppression, ordering
//! - [`Configuration`] — layered, immutable run configuration
//!
//! ## Example
//!
//! ```ignore
//! use viewlint_core::{aggregate, analyze, Catalog, Configuration};
//!
//! let active = catalog.resolve(&config)?;
//! let outcome = analyze(&unit, &active)?;
//! let report = aggregate(outcome, &suppressions, &config, 1);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod aggregate;
mod catalog;
mod config;
mod context;
mod engine;
mod model;
mod rule;
mod suppress;
mod types;

pub use aggregate::{aggregate, Report, Summary, UNUSED_SUPPRESSION_CODE, UNUSED_SUPPRESSION_ID};
pub use catalog::{ActiveRule, ActiveRuleSet, Catalog, CatalogError};
pub use config::{ConfigDocument, ConfigError, ConfigParseError, Configuration, RuleSettings};
pub use context::{MatchContext, UnitContext};
pub use engine::{analyze, AnalysisOutcome, EngineIncident};
pub use model::{Annotation, Descendants, ModelError, Node, NodeKind, SourceUnit, Span};
pub use rule::{ParamSpec, ParamValue, Rule, RuleError, RuleParams};
pub use suppress::{scan as scan_suppressions, Suppression};
pub use types::{Category, Finding, FindingDiagnostic, Severity};
