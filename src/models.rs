// src/models.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Identity of the statement owner. Created once per statement and not
/// mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Investor {
    pub name: String,
    pub pan: String,
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub dp_id: Option<String>,
    pub client_id: Option<String>,
}

/// One mutual-fund position as of the statement date.
///
/// `units` and `nav` are exact decimals; `units * nav` is expected to match
/// `current_value` within 1%, and the validator records a violation rather
/// than correcting it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holding {
    pub scheme_name: String,
    pub isin: String,
    pub folio: String,
    pub units: Decimal,
    pub nav: Decimal,
    pub current_value: Decimal,
}

/// Closed set of ledger-event categories inferred from description keywords.
/// `Unknown` is a legitimate terminal classification, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Purchase,
    Redemption,
    Sip,
    SwitchIn,
    SwitchOut,
    StpIn,
    StpOut,
    DividendPayout,
    DividendReinvestment,
    StampDuty,
    Stt,
    Charge,
    Unknown,
}

impl TransactionType {
    /// Types whose unit delta must be negative (outflows).
    pub fn is_outflow(self) -> bool {
        matches!(
            self,
            TransactionType::Redemption | TransactionType::SwitchOut | TransactionType::StpOut
        )
    }

    /// Types that affect amount only; unit delta is always zero.
    pub fn is_charge_like(self) -> bool {
        matches!(
            self,
            TransactionType::Stt | TransactionType::StampDuty | TransactionType::Charge
        )
    }
}

/// One ledger event against a folio, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub txn_type: TransactionType,
    pub description: String,
    pub units: Decimal,
    pub amount: Option<Decimal>,
    pub balance_units: Option<Decimal>,
    pub folio: String,
    pub isin: String,
    pub segregated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    ValueMismatch,
    UnitBalanceMismatch,
    MalformedIsin,
    MalformedPan,
    ParseFailure,
    MissingField,
}

/// One validation finding. `reference` points at the affected entity
/// (ISIN/folio) or, for row-level parse failures, the offending raw line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub category: IssueCategory,
    pub message: String,
    #[serde(rename = "ref")]
    pub reference: Option<String>,
}

impl ValidationIssue {
    pub fn error(category: IssueCategory, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            category,
            message: message.into(),
            reference: None,
        }
    }

    pub fn warning(category: IssueCategory, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            category,
            message: message.into(),
            reference: None,
        }
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }
}

/// Ordered sequence of findings plus the overall validity derived from them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// Builds a report from findings; validity is the absence of any
    /// error-severity issue. Warnings never affect validity.
    pub fn from_issues(issues: Vec<ValidationIssue>) -> Self {
        let is_valid = !issues.iter().any(|i| i.severity == Severity::Error);
        Self { is_valid, issues }
    }

    pub fn error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count()
    }
}

/// Root aggregate for one parsed statement. Owned exclusively by the
/// orchestrator during assembly; immutable once returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CasStatement {
    pub investor: Investor,
    pub holdings: Vec<Holding>,
    pub transactions: Vec<Transaction>,
    pub validation: ValidationReport,
}

impl CasStatement {
    /// Canonical JSON export. Decimal fields serialize as exact decimal
    /// strings, never binary floating-point.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_holding() -> Holding {
        Holding {
            scheme_name: "HDFC Flexi Cap Fund - Direct Growth".to_string(),
            isin: "INF179K01YV8".to_string(),
            folio: "12345678/90".to_string(),
            units: dec!(104.519),
            nav: dec!(1234.5678),
            current_value: dec!(129035.01),
        }
    }

    #[test]
    fn holding_json_round_trip_is_stable() {
        let holding = sample_holding();
        let json = serde_json::to_string(&holding).unwrap();
        let back: Holding = serde_json::from_str(&json).unwrap();
        assert_eq!(holding, back);
        // Decimals must cross the boundary as strings, not floats
        assert!(json.contains("\"units\":\"104.519\""));
        assert!(json.contains("\"nav\":\"1234.5678\""));
    }

    #[test]
    fn transaction_type_serializes_snake_case() {
        let json = serde_json::to_string(&TransactionType::DividendReinvestment).unwrap();
        assert_eq!(json, "\"dividend_reinvestment\"");
        let json = serde_json::to_string(&TransactionType::StpOut).unwrap();
        assert_eq!(json, "\"stp_out\"");
    }

    #[test]
    fn issue_reference_serializes_as_ref() {
        let issue = ValidationIssue::error(IssueCategory::MalformedIsin, "bad isin")
            .with_reference("INF1234567");
        let json = serde_json::to_string(&issue).unwrap();
        assert!(json.contains("\"ref\":\"INF1234567\""));
        assert!(json.contains("\"category\":\"malformed_isin\""));
    }

    #[test]
    fn report_validity_ignores_warnings() {
        let report = ValidationReport::from_issues(vec![ValidationIssue::warning(
            IssueCategory::UnitBalanceMismatch,
            "short history",
        )]);
        assert!(report.is_valid);
        assert_eq!(report.warning_count(), 1);

        let report = ValidationReport::from_issues(vec![ValidationIssue::error(
            IssueCategory::MalformedPan,
            "bad pan",
        )]);
        assert!(!report.is_valid);
    }
}
