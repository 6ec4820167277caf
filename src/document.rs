// src/document.rs

use std::fs;
use std::path::Path;

use crate::utils::error::ParseError;

/// Extracted content of a single statement page.
#[derive(Debug, Clone, Default)]
pub struct PageContent {
    /// 1-indexed page number.
    pub page_number: usize,
    /// Whitespace-normalized text lines, empty lines dropped.
    pub lines: Vec<String>,
}

/// The per-page plain text of one statement, as produced by the upstream
/// extraction collaborator. Binary document decoding (decryption, layout
/// geometry, text-run ordering) happens before this boundary.
#[derive(Debug, Clone, Default)]
pub struct ExtractedDocument {
    pub pages: Vec<PageContent>,
}

impl ExtractedDocument {
    /// Builds a document from raw page texts, normalizing whitespace and
    /// dropping empty lines on the way in.
    pub fn from_page_texts<S: AsRef<str>>(pages: &[S]) -> Self {
        let pages = pages
            .iter()
            .enumerate()
            .map(|(idx, text)| PageContent {
                page_number: idx + 1,
                lines: clean_lines(text.as_ref()),
            })
            .collect();
        Self { pages }
    }

    pub fn total_pages(&self) -> usize {
        self.pages.len()
    }

    pub fn line_count(&self) -> usize {
        self.pages.iter().map(|p| p.lines.len()).sum()
    }

    /// Iterates all lines across pages in document order.
    pub fn iter_lines(&self) -> impl Iterator<Item = &str> {
        self.pages
            .iter()
            .flat_map(|p| p.lines.iter().map(String::as_str))
    }
}

/// Reads a pre-extracted text dump from disk. Pages are separated by
/// form-feed (`\x0c`), the convention of common text extractors.
///
/// The optional passphrase belongs to the upstream extraction boundary; a
/// pre-extracted dump is never encrypted, so it is accepted and ignored here.
pub fn load_text_file(path: &Path, passphrase: Option<&str>) -> Result<ExtractedDocument, ParseError> {
    let bytes = fs::read(path)?;
    let text = String::from_utf8(bytes)
        .map_err(|_| ParseError::Unreadable(format!("{} is not valid UTF-8 text", path.display())))?;

    if text.starts_with("%PDF") {
        return Err(ParseError::Unreadable(format!(
            "{} is a binary PDF; extract its text before parsing",
            path.display()
        )));
    }
    if passphrase.is_some() {
        tracing::debug!("passphrase supplied; unused for pre-extracted text input");
    }

    let page_texts: Vec<&str> = text.split('\x0c').collect();
    Ok(ExtractedDocument::from_page_texts(&page_texts))
}

fn clean_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect()
}
