// src/classifier.rs

// --- Imports ---
use once_cell::sync::Lazy;
use regex::Regex;

// --- Marker Tags ---

/// Semantic tags a single statement line can carry. A line may match several
/// rules at once; the section detector and the extractors decide what the
/// combination means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    InvestorInfoHeader,
    HoldingsHeader,
    TransactionHeader,
    EndOfStatement,
    IsinRow,
    DatedRow,
    FolioRef,
    PanRef,
    SegregatedRef,
    NumericPayload,
    Continuation,
}

/// The set of markers classification produced for one line.
#[derive(Debug, Clone, Default)]
pub struct MarkerSet {
    tags: Vec<Marker>,
}

impl MarkerSet {
    fn insert(&mut self, marker: Marker) {
        if !self.tags.contains(&marker) {
            self.tags.push(marker);
        }
    }

    pub fn contains(&self, marker: Marker) -> bool {
        self.tags.contains(&marker)
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn tags(&self) -> &[Marker] {
        &self.tags
    }
}

// --- Keyword Patterns (Lazy Static) ---
// Case-insensitive phrase markers. Depositories and registrars reword these
// headings between statement revisions, hence several variants per marker.

static INVESTOR_INFO_HEADER_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)consolidated\s+account\s+statement",
        r"(?i)personal\s+information",
        r"(?i)investor\s+details",
        r"(?i)account\s+holder\s+details",
        r"(?i)statement\s+for\s+the\s+period",
    ]
    .iter()
    .map(|pat| Regex::new(pat).expect("Failed to compile INVESTOR_INFO_HEADER_RES"))
    .collect()
});

static HOLDINGS_HEADER_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)mutual\s+funds?\b.*\bsummary",
        r"(?i)summary\s+of\s+(?:your\s+)?mutual\s+fund",
        r"(?i)scheme\s+name\b.*\bisin",
        r"(?i)portfolio\s+summary",
        r"(?i)market\s+value\s+of\b.*\bholdings?",
        r"(?i)folio\s+no\b.*\bunits\b.*\bnav",
    ]
    .iter()
    .map(|pat| Regex::new(pat).expect("Failed to compile HOLDINGS_HEADER_RES"))
    .collect()
});

static TRANSACTION_HEADER_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)transaction\s+(?:statement|details|history)",
        r"(?i)statement\s+of\s+transactions?",
        r"(?i)details\s+of\s+transactions?",
    ]
    .iter()
    .map(|pat| Regex::new(pat).expect("Failed to compile TRANSACTION_HEADER_RES"))
    .collect()
});

static END_OF_STATEMENT_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)this\s+is\s+a\s+computer\s+generated",
        r"(?i)end\s+of\s+(?:the\s+)?statement",
        r"(?i)statement\s+generated\s+on",
    ]
    .iter()
    .map(|pat| Regex::new(pat).expect("Failed to compile END_OF_STATEMENT_RES"))
    .collect()
});

// --- Structural Patterns (Lazy Static) ---
// Shape-based markers; deliberately case-sensitive where the shape is.

static ISIN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bINF[A-Z0-9]{9}\b").expect("Failed to compile ISIN_RE"));

static DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b\d{2}-[A-Za-z]{3}-\d{4}\b|\b\d{2}/\d{2}/\d{4}\b|\b\d{4}-\d{2}-\d{2}\b")
        .expect("Failed to compile DATE_RE")
});

static FOLIO_REF_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bfolio\s*(?:no|number)?\b").expect("Failed to compile FOLIO_REF_RE")
});

static PAN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Z]{5}[0-9]{4}[A-Z]\b").expect("Failed to compile PAN_RE"));

static SEGREGATED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)segregat|seg\.?\s*portfolio").expect("Failed to compile SEGREGATED_RE")
});

static NUMERIC_PAYLOAD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\(?-?\d[\d,]*\.\d{2,}\)?").expect("Failed to compile NUMERIC_PAYLOAD_RE")
});

static PAGE_FOOTER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*page\s+\d+\s+of\s+\d+\s*$").expect("Failed to compile PAGE_FOOTER_RE")
});

/// Classifies one whitespace-normalized line. Every rule is evaluated
/// independently; no rule references a character column.
pub fn classify(line: &str) -> MarkerSet {
    let mut set = MarkerSet::default();

    // Pagination footers are layout noise: not content, not a section
    // boundary.
    if PAGE_FOOTER_RE.is_match(line) {
        return set;
    }

    if INVESTOR_INFO_HEADER_RES.iter().any(|re| re.is_match(line)) {
        set.insert(Marker::InvestorInfoHeader);
    }
    if HOLDINGS_HEADER_RES.iter().any(|re| re.is_match(line)) {
        set.insert(Marker::HoldingsHeader);
    }
    if TRANSACTION_HEADER_RES.iter().any(|re| re.is_match(line)) {
        set.insert(Marker::TransactionHeader);
    }
    if END_OF_STATEMENT_RES.iter().any(|re| re.is_match(line)) {
        set.insert(Marker::EndOfStatement);
    }

    if ISIN_RE.is_match(line) {
        set.insert(Marker::IsinRow);
    }
    if DATE_RE.is_match(line) {
        set.insert(Marker::DatedRow);
    }
    if FOLIO_REF_RE.is_match(line) {
        set.insert(Marker::FolioRef);
    }
    if PAN_RE.is_match(line) {
        set.insert(Marker::PanRef);
    }
    if SEGREGATED_RE.is_match(line) {
        set.insert(Marker::SegregatedRef);
    }
    if NUMERIC_PAYLOAD_RE.is_match(line) {
        set.insert(Marker::NumericPayload);
    }

    // Leftover prose with no structural content is a continuation candidate;
    // whether it actually extends the previous record is the extractor's call.
    const STRUCTURAL: [Marker; 7] = [
        Marker::InvestorInfoHeader,
        Marker::HoldingsHeader,
        Marker::TransactionHeader,
        Marker::EndOfStatement,
        Marker::IsinRow,
        Marker::DatedRow,
        Marker::NumericPayload,
    ];
    if line.chars().any(char::is_alphabetic) && !STRUCTURAL.iter().any(|m| set.contains(*m)) {
        set.insert(Marker::Continuation);
    }

    set
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_headers_match_case_insensitively() {
        assert!(classify("CONSOLIDATED ACCOUNT STATEMENT").contains(Marker::InvestorInfoHeader));
        assert!(classify("Mutual Fund Holdings Summary").contains(Marker::HoldingsHeader));
        assert!(classify("Transaction Details").contains(Marker::TransactionHeader));
        assert!(classify("This is a Computer Generated statement").contains(Marker::EndOfStatement));
    }

    #[test]
    fn holdings_row_carries_multiple_markers() {
        let set = classify("HDFC Flexi Cap Fund INF179K01YV8 104.519 1,234.5678 129,035.01");
        assert!(set.contains(Marker::IsinRow));
        assert!(set.contains(Marker::NumericPayload));
        assert!(!set.contains(Marker::Continuation));
    }

    #[test]
    fn structural_markers_are_shape_based() {
        assert!(classify("01-Feb-2024 SIP Purchase 4,999.00 52.260").contains(Marker::DatedRow));
        assert!(classify("PAN: ABCDE1234F").contains(Marker::PanRef));
        assert!(classify("Folio No: 12345678/90").contains(Marker::FolioRef));
        assert!(classify("Segregated Portfolio Units").contains(Marker::SegregatedRef));
        // ISIN shape is case-sensitive
        assert!(!classify("inf179k01yv8 mentioned in passing").contains(Marker::IsinRow));
    }

    #[test]
    fn textual_remainder_is_a_continuation() {
        assert!(classify("Direct Plan Growth").contains(Marker::Continuation));
        assert!(!classify("Transaction Details").contains(Marker::Continuation));
        assert!(!classify("104.519 1,234.5678").contains(Marker::Continuation));
    }

    #[test]
    fn page_footers_carry_no_markers() {
        assert!(classify("Page 2 of 4").is_empty());
        assert!(classify("page 10 of 10").is_empty());
    }
}
