// src/validator.rs

// --- Imports ---
use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

use crate::models::{Holding, Investor, IssueCategory, Transaction, ValidationIssue};

// --- Format Patterns (Lazy Static) ---

static ISIN_FORMAT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^INF[A-Z0-9]{9}$").expect("Failed to compile ISIN_FORMAT_RE"));

static PAN_FORMAT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{5}[0-9]{4}[A-Z]$").expect("Failed to compile PAN_FORMAT_RE"));

/// Runs every post-assembly consistency check. Checks are independent, all of
/// them run, and findings append in check order. Nothing here mutates the
/// parsed data.
pub fn validate(
    investor: &Investor,
    holdings: &[Holding],
    transactions: &[Transaction],
) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    check_value_consistency(holdings, &mut issues);
    check_unit_balance(holdings, transactions, &mut issues);
    check_isin_format(holdings, &mut issues);
    check_pan_format(investor, &mut issues);
    check_completeness(investor, &mut issues);
    tracing::debug!(issues = issues.len(), "validation complete");
    issues
}

fn check_value_consistency(holdings: &[Holding], issues: &mut Vec<ValidationIssue>) {
    // 1% relative tolerance absorbs the rounding the statement printer does
    let tolerance = Decimal::new(1, 2);
    for holding in holdings {
        let implied = holding.units * holding.nav;
        let drift = (implied - holding.current_value).abs();
        if drift > tolerance * holding.current_value.abs() {
            issues.push(
                ValidationIssue::error(
                    IssueCategory::ValueMismatch,
                    format!(
                        "units x nav = {} disagrees with reported value {}",
                        implied, holding.current_value
                    ),
                )
                .with_reference(holding.isin.as_str()),
            );
        }
    }
}

fn check_unit_balance(
    holdings: &[Holding],
    transactions: &[Transaction],
    issues: &mut Vec<ValidationIssue>,
) {
    // 0.001 units; statements print three decimal places
    let tolerance = Decimal::new(1, 3);
    let mut deltas: BTreeMap<(&str, &str), Decimal> = BTreeMap::new();
    for txn in transactions {
        *deltas
            .entry((txn.folio.as_str(), txn.isin.as_str()))
            .or_insert(Decimal::ZERO) += txn.units;
    }
    for holding in holdings {
        // A holding with no printed history cannot be checked; the statement
        // period routinely truncates older transactions.
        if let Some(sum) = deltas.get(&(holding.folio.as_str(), holding.isin.as_str())) {
            if (*sum - holding.units).abs() > tolerance {
                issues.push(
                    ValidationIssue::warning(
                        IssueCategory::UnitBalanceMismatch,
                        format!(
                            "transaction deltas sum to {} against {} held units",
                            sum, holding.units
                        ),
                    )
                    .with_reference(format!("{}/{}", holding.folio, holding.isin)),
                );
            }
        }
    }
}

fn check_isin_format(holdings: &[Holding], issues: &mut Vec<ValidationIssue>) {
    for holding in holdings {
        if !ISIN_FORMAT_RE.is_match(&holding.isin) {
            issues.push(
                ValidationIssue::error(
                    IssueCategory::MalformedIsin,
                    format!("ISIN {} does not match the INF format", holding.isin),
                )
                .with_reference(holding.isin.as_str()),
            );
        }
    }
}

fn check_pan_format(investor: &Investor, issues: &mut Vec<ValidationIssue>) {
    if !investor.pan.is_empty() && !PAN_FORMAT_RE.is_match(&investor.pan) {
        issues.push(
            ValidationIssue::error(
                IssueCategory::MalformedPan,
                format!("PAN {} does not match the expected format", investor.pan),
            )
            .with_reference(investor.pan.as_str()),
        );
    }
}

fn check_completeness(investor: &Investor, issues: &mut Vec<ValidationIssue>) {
    if investor.name.is_empty() {
        issues.push(ValidationIssue::error(
            IssueCategory::MissingField,
            "investor name was not found in the statement",
        ));
    }
    if investor.pan.is_empty() {
        issues.push(ValidationIssue::error(
            IssueCategory::MissingField,
            "investor PAN was not found in the statement",
        ));
    }
}
