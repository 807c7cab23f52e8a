//! Aggregating validators for the scoring key and allocation tables. Unlike
//! the loaders, which stop at the first defect, these walk whole row sets and
//! report everything they find, so operators can fix an override file in one
//! pass.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use crate::data::allocation::{AllocationRow, RiskProfile};
use crate::data::registry::{
    read_allocations_file, read_scoring_key_file, RegistryError, ALLOCATIONS_FILE,
    SCORING_KEY_FILE,
};
use crate::data::scoring_key::{
    Choice, ScoringKey, ScoringKeyRow, FIRST_QUESTION_ID, LAST_QUESTION_ID,
};
use crate::scoring::rescale::Tier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ValidationSeverity {
    Error,
    Warning,
    Info,
}

impl ValidationSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for ValidationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationDiagnostic {
    pub severity: ValidationSeverity,
    pub context: String,
    pub message: String,
}

impl fmt::Display for ValidationDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.context, self.message)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub diagnostics: Vec<ValidationDiagnostic>,
}

impl ValidationReport {
    pub fn push(
        &mut self,
        severity: ValidationSeverity,
        context: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(ValidationDiagnostic {
            severity,
            context: context.into(),
            message: message.into(),
        });
    }

    pub fn merge(&mut self, other: ValidationReport) {
        self.diagnostics.extend(other.diagnostics);
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    pub fn error_count(&self) -> usize {
        self.count_of(ValidationSeverity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count_of(ValidationSeverity::Warning)
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    fn count_of(&self, severity: ValidationSeverity) -> usize {
        self.diagnostics
            .iter()
            .filter(|diag| diag.severity == severity)
            .count()
    }
}

/// Validate scoring-key rows.
///
/// Errors: ids outside the questionnaire, duplicates, missing questions,
/// fewer than two choices, unknown choice letters. Warnings: zero-point
/// choices, and an achievable maximum total that drifts from the builtin
/// key's.
pub fn validate_scoring_key_rows(rows: &[ScoringKeyRow]) -> ValidationReport {
    let mut report = ValidationReport::default();
    let mut seen_ids = HashSet::new();

    for (index, row) in rows.iter().enumerate() {
        let context = format!("questions[{index}]");

        if !(FIRST_QUESTION_ID..=LAST_QUESTION_ID).contains(&row.id) {
            report.push(
                ValidationSeverity::Error,
                context.clone(),
                format!(
                    "question id {} outside {FIRST_QUESTION_ID}..={LAST_QUESTION_ID}",
                    row.id
                ),
            );
        }
        if !seen_ids.insert(row.id) {
            report.push(
                ValidationSeverity::Error,
                context.clone(),
                format!("duplicate question id {}", row.id),
            );
        }

        if row.points.len() < 2 {
            report.push(
                ValidationSeverity::Error,
                format!("{context}.points"),
                format!(
                    "question {} defines {} choice(s), need at least 2",
                    row.id,
                    row.points.len()
                ),
            );
        }
        for (letter, points) in &row.points {
            if Choice::parse(letter).is_none() {
                report.push(
                    ValidationSeverity::Error,
                    format!("{context}.points"),
                    format!("unknown choice letter '{letter}'"),
                );
            } else if *points == 0 {
                report.push(
                    ValidationSeverity::Warning,
                    format!("{context}.points"),
                    format!("choice '{letter}' is worth 0 points"),
                );
            }
        }
    }

    for id in FIRST_QUESTION_ID..=LAST_QUESTION_ID {
        if !seen_ids.contains(&id) {
            report.push(
                ValidationSeverity::Error,
                "questions",
                format!("missing question id {id}"),
            );
        }
    }

    if !report.has_errors() {
        let max_total: u32 = rows
            .iter()
            .map(|row| row.points.values().copied().max().unwrap_or(0))
            .sum();
        let builtin_max = ScoringKey::builtin().max_total();
        if max_total != builtin_max {
            report.push(
                ValidationSeverity::Warning,
                "questions",
                format!(
                    "achievable maximum total is {max_total}; the builtin key yields {builtin_max}"
                ),
            );
        }
    }

    report
}

/// Validate allocation rows.
///
/// Everything here is an error: malformed tiers, duplicates, unknown profile
/// labels, weights that do not sum to 100, and any tier with no row. A table
/// that loads with gaps still serves, but every assessment landing on a
/// missing tier fails, so the validator treats gaps as hard defects.
pub fn validate_allocation_rows(rows: &[AllocationRow]) -> ValidationReport {
    let mut report = ValidationReport::default();
    let mut seen_tiers = HashSet::new();

    for (index, row) in rows.iter().enumerate() {
        let context = format!("allocations[{index}]");

        match Tier::from_value(row.risk_tier) {
            Some(tier) => {
                if !seen_tiers.insert(tier.half_steps()) {
                    report.push(
                        ValidationSeverity::Error,
                        context.clone(),
                        format!("tier {tier} defined more than once"),
                    );
                }
            }
            None => report.push(
                ValidationSeverity::Error,
                context.clone(),
                format!("'{}' is not a half-step tier in [1.0, 10.0]", row.risk_tier),
            ),
        }

        if RiskProfile::parse(&row.profile).is_none() {
            report.push(
                ValidationSeverity::Error,
                format!("{context}.profile"),
                format!("unknown profile label '{}'", row.profile),
            );
        }

        let total =
            u64::from(row.money_market) + u64::from(row.obligation) + u64::from(row.stocks);
        if total != 100 {
            report.push(
                ValidationSeverity::Error,
                context,
                format!("weights sum to {total}, expected 100"),
            );
        }
    }

    for tier in Tier::all() {
        if !seen_tiers.contains(&tier.half_steps()) {
            report.push(
                ValidationSeverity::Error,
                "allocations",
                format!("no entry for tier {tier}"),
            );
        }
    }

    report
}

/// Validate the override table files in a data directory. A missing file is
/// reported as info, since the registry falls back to its builtin table. Read
/// or parse failures surface as [`RegistryError`]; table defects come back in
/// the report.
pub fn validate_data_dir(dir: &Path) -> Result<ValidationReport, RegistryError> {
    let mut report = ValidationReport::default();

    let scoring_path = dir.join(SCORING_KEY_FILE);
    match read_scoring_key_file(&scoring_path)? {
        Some(file) => report.merge(validate_scoring_key_rows(&file.questions)),
        None => report.push(
            ValidationSeverity::Info,
            "questions",
            format!(
                "'{}' not found; builtin scoring key in effect",
                scoring_path.display()
            ),
        ),
    }

    let allocations_path = dir.join(ALLOCATIONS_FILE);
    match read_allocations_file(&allocations_path)? {
        Some(file) => report.merge(validate_allocation_rows(&file.allocations)),
        None => report.push(
            ValidationSeverity::Info,
            "allocations",
            format!(
                "'{}' not found; builtin allocation table in effect",
                allocations_path.display()
            ),
        ),
    }

    Ok(report)
}
