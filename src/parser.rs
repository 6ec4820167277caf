// src/parser.rs

use crate::classifier::classify;
use crate::detector::{Section, SectionDetector};
use crate::document::ExtractedDocument;
use crate::extractors::holdings::HoldingsExtractor;
use crate::extractors::investor::InvestorExtractor;
use crate::extractors::transactions::TransactionExtractor;
use crate::models::{CasStatement, ValidationReport};
use crate::utils::error::ParseError;
use crate::validator;

/// Parses one extracted statement in a single pass: classify each line,
/// advance the section machine, hand the line to whichever extractor the
/// current section owns, then validate the assembled record.
///
/// Pure function of its input; parsing different documents concurrently needs
/// no coordination.
pub fn parse_document(document: &ExtractedDocument) -> Result<CasStatement, ParseError> {
    tracing::info!(
        pages = document.total_pages(),
        lines = document.line_count(),
        "parsing statement"
    );

    let mut detector = SectionDetector::new();
    let mut investor = InvestorExtractor::new();
    let mut holdings = HoldingsExtractor::new();
    let mut transactions = TransactionExtractor::new();

    // 1. Single pass over pages in document order
    for page in &document.pages {
        tracing::debug!(page = page.page_number, "scanning page");
        for line in &page.lines {
            let markers = classify(line);
            if detector.advance(&markers) {
                tracing::debug!(section = ?detector.state(), "section boundary");
                continue;
            }
            match detector.state() {
                Section::Initial | Section::End => {}
                Section::InvestorInfo => investor.push_line(line),
                Section::HoldingsSummary => holdings.push_line(line, &markers),
                Section::TransactionDetails => transactions.push_line(line, &markers),
            }
        }
    }

    // 2. A document that never produced a recognizable section is not a CAS
    if detector.state() == Section::Initial {
        tracing::error!("no statement sections recognized in input");
        return Err(ParseError::Unrecognized);
    }

    // 3. Finalize extractors; row-level failures arrive as issues, not errors
    let investor = investor.finalize();
    let (holdings, mut issues) = holdings.finalize();
    let (transactions, transaction_issues) = transactions.finalize();
    issues.extend(transaction_issues);

    // 4. Post-assembly consistency checks append after extraction findings
    issues.extend(validator::validate(&investor, &holdings, &transactions));
    let validation = ValidationReport::from_issues(issues);

    tracing::info!(
        holdings = holdings.len(),
        transactions = transactions.len(),
        errors = validation.error_count(),
        warnings = validation.warning_count(),
        valid = validation.is_valid,
        "statement assembled"
    );

    Ok(CasStatement {
        investor,
        holdings,
        transactions,
        validation,
    })
}
