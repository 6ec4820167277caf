// src/extractors/transactions.rs

// --- Imports ---
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

use crate::classifier::{Marker, MarkerSet};
use crate::models::{IssueCategory, Transaction, TransactionType, ValidationIssue};

use super::{find_folio, find_isin, scan_numbers, strip_spans};

// --- Regex Patterns (Lazy Static) ---

static DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b\d{2}-[A-Za-z]{3}-\d{4}\b|\b\d{2}/\d{2}/\d{4}\b|\b\d{4}-\d{2}-\d{2}\b")
        .expect("Failed to compile DATE_RE")
});

static CURRENCY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)₹|\bRs\.?|\bINR\b").expect("Failed to compile CURRENCY_RE")
});

// Specificity-descending keyword table; the first matching entry wins. Bare
// "in"/"out" never classify on their own, so an unmatched narration stays
// Unknown instead of guessing from the unit sign.
static TYPE_PATTERNS: Lazy<Vec<(Regex, TransactionType)>> = Lazy::new(|| {
    [
        (
            r"(?i)(?:dividend|idcw).{0,24}re-?invest|re-?invest.{0,24}(?:dividend|idcw)",
            TransactionType::DividendReinvestment,
        ),
        (r"(?i)dividend|idcw", TransactionType::DividendPayout),
        (
            r"(?i)stp\s*-?\s*in\b|systematic\s+transfer.{0,24}\bin\b",
            TransactionType::StpIn,
        ),
        (
            r"(?i)stp\s*-?\s*out\b|systematic\s+transfer.{0,24}\bout\b",
            TransactionType::StpOut,
        ),
        (r"(?i)switch(?:ed)?\s*-?\s*in\b", TransactionType::SwitchIn),
        (r"(?i)switch(?:ed)?\s*-?\s*out\b", TransactionType::SwitchOut),
        (
            r"(?i)\bsip\b|systematic\s+investment",
            TransactionType::Sip,
        ),
        (
            r"(?i)\bstt\b|securities\s+transactions?\s+tax",
            TransactionType::Stt,
        ),
        (r"(?i)stamp\s*duty", TransactionType::StampDuty),
        (r"(?i)\bcharges?\b|\bfees?\b", TransactionType::Charge),
        (r"(?i)redemption|redeem", TransactionType::Redemption),
        (
            r"(?i)purchase|subscription|allotment|investment",
            TransactionType::Purchase,
        ),
    ]
    .into_iter()
    .map(|(pattern, ty)| {
        (
            Regex::new(pattern).expect("Failed to compile TYPE_PATTERNS entry"),
            ty,
        )
    })
    .collect()
});

fn classify_type(description: &str) -> TransactionType {
    for (re, ty) in TYPE_PATTERNS.iter() {
        if re.is_match(description) {
            return *ty;
        }
    }
    TransactionType::Unknown
}

fn find_date(line: &str) -> Option<(NaiveDate, (usize, usize))> {
    let m = DATE_RE.find(line)?;
    let raw = m.as_str();
    let date = NaiveDate::parse_from_str(raw, "%d-%b-%Y")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d/%m/%Y"))
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .ok()?;
    Some((date, (m.start(), m.end())))
}

/// Streaming assembler for the transaction details section. Folio and ISIN
/// context come from banner lines between row groups; a folio change
/// invalidates the scheme context with it.
#[derive(Debug, Default)]
pub struct TransactionExtractor {
    transactions: Vec<Transaction>,
    issues: Vec<ValidationIssue>,
    folio: Option<String>,
    isin: Option<String>,
}

impl TransactionExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_line(&mut self, line: &str, markers: &MarkerSet) {
        if markers.contains(Marker::DatedRow) {
            if markers.contains(Marker::NumericPayload) {
                self.push_row(line, markers);
            } else {
                // A dated narration without numbers continues the previous row
                self.append_description(line);
            }
            return;
        }
        if markers.contains(Marker::IsinRow) {
            if let Some((isin, _)) = find_isin(line) {
                tracing::debug!(isin = %isin, "scheme banner");
                self.isin = Some(isin.to_string());
            }
            return;
        }
        if markers.contains(Marker::FolioRef) {
            if let Some((folio, _)) = find_folio(line) {
                if self.folio.as_deref() != Some(folio.as_str()) {
                    tracing::debug!(folio = %folio, "transaction folio context");
                    self.folio = Some(folio);
                    self.isin = None;
                }
            }
            return;
        }
        if markers.contains(Marker::Continuation) {
            self.append_description(line);
        }
    }

    fn append_description(&mut self, line: &str) {
        // Never creates a transaction on its own
        if let Some(last) = self.transactions.last_mut() {
            last.description.push(' ');
            last.description.push_str(line.trim());
        }
    }

    fn push_row(&mut self, line: &str, markers: &MarkerSet) {
        match self.assemble_row(line, markers) {
            Some(txn) => {
                tracing::debug!(date = %txn.date, ty = ?txn.txn_type, units = %txn.units, "transaction row");
                self.transactions.push(txn);
            }
            None => {
                tracing::warn!(row = %line, "dropping transaction row with no recoverable unit delta");
                self.issues.push(
                    ValidationIssue::error(
                        IssueCategory::ParseFailure,
                        "transaction row has no recoverable unit delta",
                    )
                    .with_reference(line),
                );
            }
        }
    }

    fn assemble_row(&mut self, line: &str, markers: &MarkerSet) -> Option<Transaction> {
        let (date, date_span) = find_date(line)?;
        let numbers = scan_numbers(line);

        let units_pos = numbers.iter().position(|t| t.places >= 3);
        let amount = numbers.iter().find(|t| t.places == 2).map(|t| t.value);
        let balance_units = units_pos.and_then(|pos| {
            numbers
                .iter()
                .skip(pos + 1)
                .find(|t| t.places >= 3 && t.value >= Decimal::ZERO)
                .map(|t| t.value)
        });

        let inline_isin = find_isin(line);

        let mut spans = vec![date_span];
        spans.extend(numbers.iter().map(|t| t.span));
        if let Some((_, span)) = inline_isin {
            spans.push(span);
        }
        spans.extend(CURRENCY_RE.find_iter(line).map(|m| (m.start(), m.end())));
        let description = strip_spans(line, &spans);

        let txn_type = classify_type(&description);

        let mut units = match units_pos {
            Some(pos) => numbers[pos].value,
            // Charge rows may omit the unit column entirely; their delta is
            // still a well-defined zero.
            None if txn_type.is_charge_like() => Decimal::ZERO,
            None => return None,
        };
        if txn_type.is_outflow() && units > Decimal::ZERO {
            units = -units;
        }
        if txn_type == TransactionType::DividendReinvestment {
            units = units.abs();
        }
        if txn_type.is_charge_like() {
            units = Decimal::ZERO;
        }

        if let Some((isin, _)) = inline_isin {
            self.isin = Some(isin.to_string());
        }

        Some(Transaction {
            date,
            txn_type,
            description,
            units,
            amount,
            balance_units,
            folio: self.folio.clone().unwrap_or_default(),
            isin: self.isin.clone().unwrap_or_default(),
            segregated: markers.contains(Marker::SegregatedRef),
        })
    }

    pub fn finalize(self) -> (Vec<Transaction>, Vec<ValidationIssue>) {
        (self.transactions, self.issues)
    }
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::classify;
    use crate::models::Severity;
    use rust_decimal_macros::dec;

    fn feed(extractor: &mut TransactionExtractor, line: &str) {
        let markers = classify(line);
        extractor.push_line(line, &markers);
    }

    fn context(extractor: &mut TransactionExtractor) {
        feed(extractor, "Folio No: 12345678/90");
        feed(extractor, "INF179K01YV8 HDFC Flexi Cap Fund");
    }

    #[test]
    fn assembles_sip_row_with_context() {
        let mut x = TransactionExtractor::new();
        context(&mut x);
        feed(&mut x, "01-Feb-2024 SIP Purchase Instalment 1 4,999.00 52.260 52.260");
        let (txns, issues) = x.finalize();
        assert!(issues.is_empty());
        assert_eq!(txns.len(), 1);
        let t = &txns[0];
        assert_eq!(t.date, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(t.txn_type, TransactionType::Sip);
        assert_eq!(t.description, "SIP Purchase Instalment 1");
        assert_eq!(t.units, dec!(52.260));
        assert_eq!(t.amount, Some(dec!(4999.00)));
        assert_eq!(t.balance_units, Some(dec!(52.260)));
        assert_eq!(t.folio, "12345678/90");
        assert_eq!(t.isin, "INF179K01YV8");
        assert!(!t.segregated);
    }

    #[test]
    fn specificity_beats_bare_keywords() {
        assert_eq!(classify_type("Switch In from Scheme X"), TransactionType::SwitchIn);
        assert_eq!(classify_type("Switch Out to Liquid Fund"), TransactionType::SwitchOut);
        assert_eq!(classify_type("STP In from Debt Plan"), TransactionType::StpIn);
        assert_eq!(classify_type("SIP Purchase"), TransactionType::Sip);
        assert_eq!(classify_type("Random narration text"), TransactionType::Unknown);
    }

    #[test]
    fn reinvestment_outranks_payout_and_redemption_keywords() {
        assert_eq!(
            classify_type("Dividend Reinvested against Redemption"),
            TransactionType::DividendReinvestment
        );
        assert_eq!(classify_type("IDCW Payout"), TransactionType::DividendPayout);
    }

    #[test]
    fn reinvestment_delta_is_forced_non_negative() {
        let mut x = TransactionExtractor::new();
        context(&mut x);
        feed(&mut x, "10-Apr-2024 Dividend Reinvestment (1.234) 10.00");
        let (txns, _) = x.finalize();
        assert_eq!(txns[0].txn_type, TransactionType::DividendReinvestment);
        assert_eq!(txns[0].units, dec!(1.234));
    }

    #[test]
    fn redemption_magnitude_is_forced_negative() {
        let mut x = TransactionExtractor::new();
        context(&mut x);
        feed(&mut x, "15-Mar-2024 Redemption - Online 25,000.00 20.504 84.015");
        let (txns, _) = x.finalize();
        assert_eq!(txns[0].txn_type, TransactionType::Redemption);
        assert_eq!(txns[0].units, dec!(-20.504));
        assert_eq!(txns[0].balance_units, Some(dec!(84.015)));
    }

    #[test]
    fn charge_rows_have_zero_delta_and_keep_amount() {
        let mut x = TransactionExtractor::new();
        context(&mut x);
        feed(&mut x, "02-Mar-2024 *** STT Paid *** 0.04 0.001");
        feed(&mut x, "02-Mar-2024 Stamp Duty 0.25");
        let (txns, issues) = x.finalize();
        assert!(issues.is_empty());
        assert_eq!(txns[0].txn_type, TransactionType::Stt);
        assert_eq!(txns[0].units, Decimal::ZERO);
        assert_eq!(txns[0].amount, Some(dec!(0.04)));
        // No unit column at all on the stamp duty row
        assert_eq!(txns[1].txn_type, TransactionType::StampDuty);
        assert_eq!(txns[1].units, Decimal::ZERO);
        assert_eq!(txns[1].amount, Some(dec!(0.25)));
    }

    #[test]
    fn unknown_rows_keep_their_narration() {
        let mut x = TransactionExtractor::new();
        context(&mut x);
        feed(&mut x, "05-May-2024 Misc Adjustment 10.00 1.000");
        let (txns, _) = x.finalize();
        assert_eq!(txns[0].txn_type, TransactionType::Unknown);
        assert_eq!(txns[0].description, "Misc Adjustment");
    }

    #[test]
    fn continuation_extends_previous_description() {
        let mut x = TransactionExtractor::new();
        context(&mut x);
        feed(&mut x, "20-Mar-2024 Switch Out 5,000.00 4.100 79.915");
        feed(&mut x, "to ICICI Prudential Bluechip Fund");
        let (txns, _) = x.finalize();
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].description, "Switch Out to ICICI Prudential Bluechip Fund");
    }

    #[test]
    fn continuation_without_a_row_is_dropped() {
        let mut x = TransactionExtractor::new();
        context(&mut x);
        feed(&mut x, "registrar remark line");
        let (txns, issues) = x.finalize();
        assert!(txns.is_empty());
        assert!(issues.is_empty());
    }

    #[test]
    fn folio_change_resets_scheme_context() {
        let mut x = TransactionExtractor::new();
        context(&mut x);
        feed(&mut x, "Folio No: 99887766/11");
        feed(&mut x, "01-Jun-2024 Purchase 1,000.00 9.991 9.991");
        let (txns, _) = x.finalize();
        assert_eq!(txns[0].folio, "99887766/11");
        assert_eq!(txns[0].isin, "");
    }

    #[test]
    fn segregated_rows_are_flagged() {
        let mut x = TransactionExtractor::new();
        context(&mut x);
        feed(&mut x, "12-Jun-2024 Segregated Portfolio Purchase 0.00 3.000 3.000");
        let (txns, _) = x.finalize();
        assert!(txns[0].segregated);
        assert_eq!(txns[0].txn_type, TransactionType::Purchase);
    }

    #[test]
    fn row_without_delta_is_reported_not_fatal() {
        let mut x = TransactionExtractor::new();
        context(&mut x);
        feed(&mut x, "01-Jul-2024 Purchase 5,000.00");
        let (txns, issues) = x.finalize();
        assert!(txns.is_empty());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Error);
        assert_eq!(issues[0].category, IssueCategory::ParseFailure);
    }
}
