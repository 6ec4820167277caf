// src/extractors/holdings.rs

use rust_decimal::Decimal;

use crate::classifier::{Marker, MarkerSet};
use crate::models::{Holding, IssueCategory, ValidationIssue};

use super::{find_folio, find_isin, scan_numbers, strip_spans};

/// Streaming assembler for the holdings summary section. Rows arrive in
/// document order; a folio banner line sets the context for the ISIN rows
/// that follow it.
#[derive(Debug, Default)]
pub struct HoldingsExtractor {
    holdings: Vec<Holding>,
    issues: Vec<ValidationIssue>,
    folio: Option<String>,
}

impl HoldingsExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_line(&mut self, line: &str, markers: &MarkerSet) {
        if markers.contains(Marker::IsinRow) {
            self.push_row(line);
        } else if markers.contains(Marker::FolioRef) {
            if let Some((folio, _)) = find_folio(line) {
                tracing::debug!(folio = %folio, "holdings folio context");
                self.folio = Some(folio);
            }
        } else if markers.contains(Marker::Continuation) {
            // Wrapped scheme name, possibly across a page break. Banner text
            // before the first row has nothing to attach to and is dropped.
            if let Some(last) = self.holdings.last_mut() {
                last.scheme_name.push(' ');
                last.scheme_name.push_str(line.trim());
            }
        }
    }

    fn push_row(&mut self, line: &str) {
        match self.assemble_row(line) {
            Some(holding) => {
                tracing::debug!(isin = %holding.isin, units = %holding.units, "holding row");
                self.holdings.push(holding);
            }
            None => {
                tracing::warn!(row = %line, "dropping holdings row with unrecoverable columns");
                self.issues.push(
                    ValidationIssue::error(
                        IssueCategory::ParseFailure,
                        "holdings row is missing one of units/nav/value",
                    )
                    .with_reference(line),
                );
            }
        }
    }

    fn assemble_row(&self, line: &str) -> Option<Holding> {
        let (isin, isin_span) = find_isin(line)?;
        let numbers = scan_numbers(line);

        // Column meaning is recovered from printed precision, not position:
        // units carry >=3 decimal places, NAV 2-4 places within [1, 10000],
        // the rupee value exactly 2.
        let units_pos = numbers.iter().position(|t| t.places >= 3)?;
        let nav_ceiling = Decimal::from(10_000);
        let nav_pos = (units_pos + 1..numbers.len()).find(|&i| {
            let t = &numbers[i];
            (2..=4).contains(&t.places) && t.value >= Decimal::ONE && t.value <= nav_ceiling
        })?;
        let value_pos = (nav_pos + 1..numbers.len()).find(|&i| numbers[i].places == 2)?;

        let inline_folio = find_folio(line);
        let folio = inline_folio
            .as_ref()
            .map(|(folio, _)| folio.clone())
            .or_else(|| self.folio.clone())
            .unwrap_or_default();

        let mut spans = vec![isin_span];
        spans.extend(numbers.iter().map(|t| t.span));
        if let Some((_, span)) = inline_folio {
            spans.push(span);
        }
        let scheme_name = strip_spans(line, &spans);

        Some(Holding {
            scheme_name,
            isin: isin.to_string(),
            folio,
            units: numbers[units_pos].value,
            nav: numbers[nav_pos].value,
            current_value: numbers[value_pos].value,
        })
    }

    pub fn finalize(self) -> (Vec<Holding>, Vec<ValidationIssue>) {
        (self.holdings, self.issues)
    }
}
