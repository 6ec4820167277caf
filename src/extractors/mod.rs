// src/extractors/mod.rs

pub mod holdings;
pub mod investor;
pub mod transactions;

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

// --- Shared Row-Scanning Helpers (Lazy Static) ---

static NUMBER_TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\(?-?\d[\d,]*\.\d+\)?").expect("Failed to compile NUMBER_TOKEN_RE")
});

static ISIN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bINF[A-Z0-9]{9}\b").expect("Failed to compile ISIN_RE"));

static FOLIO_VALUE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)folio\s*(?:no|number)?[\s.:]*([0-9][0-9/\s-]*[0-9]|[0-9])")
        .expect("Failed to compile FOLIO_VALUE_RE")
});

/// One decimal number found in a row, with its printed precision and the byte
/// span it occupied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NumberToken {
    pub value: Decimal,
    pub places: u32,
    pub span: (usize, usize),
}

/// Scans a row for decimal numbers. Comma grouping is dropped; a
/// parenthesized number is negative, the usual statement print convention.
pub(crate) fn scan_numbers(line: &str) -> Vec<NumberToken> {
    NUMBER_TOKEN_RE
        .find_iter(line)
        .filter_map(|m| {
            let raw = m.as_str();
            let parenthesized = raw.starts_with('(') && raw.ends_with(')');
            let cleaned: String = raw
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
                .collect();
            let places = cleaned.split('.').nth(1).map_or(0, |frac| frac.len() as u32);
            let mut value = Decimal::from_str(&cleaned).ok()?;
            if parenthesized {
                value = -value.abs();
            }
            Some(NumberToken {
                value,
                places,
                span: (m.start(), m.end()),
            })
        })
        .collect()
}

pub(crate) fn find_isin(line: &str) -> Option<(&str, (usize, usize))> {
    ISIN_RE.find(line).map(|m| (m.as_str(), (m.start(), m.end())))
}

/// Finds a "Folio No: ..." reference. Returns the folio value and the span of
/// the whole labeled reference so callers can cut it out of the row text.
pub(crate) fn find_folio(line: &str) -> Option<(String, (usize, usize))> {
    let caps = FOLIO_VALUE_RE.captures(line)?;
    let whole = caps.get(0)?;
    let value = caps.get(1)?;
    Some((
        value.as_str().trim().to_string(),
        (whole.start(), whole.end()),
    ))
}

/// Rebuilds a row's residual text after the given byte spans are removed,
/// collapsing whitespace and trimming stray separators.
pub(crate) fn strip_spans(line: &str, spans: &[(usize, usize)]) -> String {
    let mut kept = String::with_capacity(line.len());
    for (idx, ch) in line.char_indices() {
        if spans.iter().any(|&(start, end)| idx >= start && idx < end) {
            continue;
        }
        kept.push(ch);
    }
    let collapsed = kept.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, '-' | ':' | ',' | '.' | '*' | '#'))
        .to_string()
}
