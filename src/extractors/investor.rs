// src/extractors/investor.rs

// --- Imports ---
use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::Investor;

// --- Field Patterns (Lazy Static) ---

static PAN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Z]{5}[0-9]{4}[A-Z]\b").expect("Failed to compile PAN_RE"));

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}\b")
        .expect("Failed to compile EMAIL_RE")
});

// Indian mobile: optional +91 prefix, ten digits led by 6-9
static MOBILE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\+\s*91[\s-]*)?\b([6-9][0-9]{9})\b").expect("Failed to compile MOBILE_RE")
});

static DP_ID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bdp\s*id[\s.:-]*([A-Z0-9]+)").expect("Failed to compile DP_ID_RE")
});

static CLIENT_ID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:client|bo)\s*id[\s.:-]*([A-Z0-9]+)")
        .expect("Failed to compile CLIENT_ID_RE")
});

static NAME_LABEL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^name[\s.:-]+(.+)$").expect("Failed to compile NAME_LABEL_RE")
});

static HONORIFIC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:mr|mrs|ms|shri|smt|dr|m/s)\.?\s+[A-Za-z]")
        .expect("Failed to compile HONORIFIC_RE")
});

// Lines that look textual but never hold the investor's name
static NON_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)statement|account|information|details|holdings?|summary|email|mobile|phone|address|\bpan\b|folio|joint|nominee|registrar|period",
    )
    .expect("Failed to compile NON_NAME_RE")
});

/// Accumulates the investor-info section verbatim, then scrapes the fields
/// out of it once the section is complete.
#[derive(Debug, Default)]
pub struct InvestorExtractor {
    lines: Vec<String>,
}

impl InvestorExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_line(&mut self, line: &str) {
        self.lines.push(line.trim().to_string());
    }

    /// Scrapes the accumulated section text. A missing name or PAN stays
    /// empty here; structural completeness is the validator's call.
    pub fn finalize(self) -> Investor {
        let mut investor = Investor::default();

        for line in &self.lines {
            if investor.pan.is_empty() {
                if let Some(m) = PAN_RE.find(line) {
                    investor.pan = m.as_str().to_uppercase();
                }
            }
            if investor.email.is_none() {
                if let Some(m) = EMAIL_RE.find(line) {
                    investor.email = Some(m.as_str().to_lowercase());
                }
            }
            if investor.mobile.is_none() {
                if let Some(caps) = MOBILE_RE.captures(line) {
                    investor.mobile = caps.get(1).map(|m| m.as_str().to_string());
                }
            }
            if investor.dp_id.is_none() {
                if let Some(caps) = DP_ID_RE.captures(line) {
                    investor.dp_id = caps.get(1).map(|m| m.as_str().to_string());
                }
            }
            if investor.client_id.is_none() {
                if let Some(caps) = CLIENT_ID_RE.captures(line) {
                    investor.client_id = caps.get(1).map(|m| m.as_str().to_string());
                }
            }
            if investor.name.is_empty() {
                if let Some(caps) = NAME_LABEL_RE.captures(line) {
                    if let Some(m) = caps.get(1) {
                        investor.name = m.as_str().trim().to_string();
                    }
                } else if HONORIFIC_RE.is_match(line) {
                    investor.name = line.clone();
                }
            }
        }

        // Fallback: first free-text line that plausibly is a person's name
        if investor.name.is_empty() {
            if let Some(line) = self.lines.iter().find(|l| plausible_name(l)) {
                investor.name = line.clone();
            }
        }

        tracing::debug!(
            name_found = !investor.name.is_empty(),
            pan_found = !investor.pan.is_empty(),
            "investor scrape complete"
        );
        investor
    }
}

fn plausible_name(line: &str) -> bool {
    let line = line.trim();
    line.len() >= 3
        && line.chars().any(char::is_alphabetic)
        && line
            .chars()
            .all(|c| c.is_alphabetic() || c.is_whitespace() || matches!(c, '.' | '\'' | '&'))
        && !NON_NAME_RE.is_match(line)
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    fn scrape(lines: &[&str]) -> Investor {
        let mut x = InvestorExtractor::new();
        for line in lines {
            x.push_line(line);
        }
        x.finalize()
    }

    #[test]
    fn scrapes_labeled_fields() {
        let investor = scrape(&[
            "Statement for the period 01-Jan-2024 to 30-Jun-2024",
            "Name: Anil Kumar Sharma",
            "Email: Anil.Sharma@Example.com",
            "Mobile: +91 9876543210",
            "PAN: ABCDE1234F",
            "DP ID: IN300123 Client ID: 12345678",
        ]);
        assert_eq!(investor.name, "Anil Kumar Sharma");
        assert_eq!(investor.pan, "ABCDE1234F");
        assert_eq!(investor.email.as_deref(), Some("anil.sharma@example.com"));
        assert_eq!(investor.mobile.as_deref(), Some("9876543210"));
        assert_eq!(investor.dp_id.as_deref(), Some("IN300123"));
        assert_eq!(investor.client_id.as_deref(), Some("12345678"));
    }

    #[test]
    fn honorific_line_is_taken_as_name() {
        let investor = scrape(&["Mr. Rajesh V Iyer", "PAN: ABCDE1234F"]);
        assert_eq!(investor.name, "Mr. Rajesh V Iyer");
    }

    #[test]
    fn falls_back_to_first_plausible_free_text_line() {
        let investor = scrape(&[
            "Statement for the period 01-Jan-2024 to 30-Jun-2024",
            "Anil Kumar Sharma",
            "42 MG Road, Pune 411001",
        ]);
        assert_eq!(investor.name, "Anil Kumar Sharma");
    }

    #[test]
    fn missing_fields_stay_unset() {
        let investor = scrape(&["Statement for the period 01-Jan-2024 to 30-Jun-2024"]);
        assert!(investor.name.is_empty());
        assert!(investor.pan.is_empty());
        assert!(investor.email.is_none());
        assert!(investor.mobile.is_none());
    }

    #[test]
    fn folio_digits_are_not_mistaken_for_mobile() {
        let investor = scrape(&["Folio No: 12345678/90"]);
        assert!(investor.mobile.is_none());
    }
}
