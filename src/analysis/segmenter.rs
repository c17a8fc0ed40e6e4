//! Clause segmentation
//!
//! Splits contract text on sentence terminators followed by whitespace while
//! protecting periods inside known abbreviations and decimal numbers.
//! Fragments whose trimmed length does not exceed the clause floor are dropped,
//! so bare enumerators such as "1." disappear from the output.

use once_cell::sync::Lazy;
use regex::Regex;

use super::models::Clause;

/// Abbreviations whose periods never terminate a clause
pub const DEFAULT_ABBREVIATIONS: &[&str] = &[
    "Mr.", "Mrs.", "Ms.", "Dr.", "Prof.", "Sr.", "Jr.", "St.", "Co.", "Corp.", "Inc.", "Ltd.",
    "e.g.", "i.e.", "vs.", "etc.", "No.", "Op.", "p.", "pp.", "cf.", "al.",
];

/// Stand-in for a protected period while splitting
const PROTECTED_PERIOD: char = '\u{E000}';

static TERMINATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]\s+").expect("terminator pattern is valid"));

static DEFAULT_SEGMENTER: Lazy<Segmenter> = Lazy::new(Segmenter::default);

/// Segment text with the default abbreviation table
pub fn segment_text(text: &str) -> Vec<Clause> {
    DEFAULT_SEGMENTER.segment(text)
}

/// Rule-based clause segmenter
#[derive(Debug, Clone)]
pub struct Segmenter {
    /// (abbreviation, abbreviation with protected periods), longest first
    abbreviations: Vec<(String, String)>,
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::with_abbreviations(DEFAULT_ABBREVIATIONS)
    }
}

impl Segmenter {
    /// Build a segmenter protecting the given abbreviations
    ///
    /// Abbreviations are matched case-sensitively as plain substrings, so "p." also
    /// protects the period closing "ownership." and "al." the one closing "approval.".
    pub fn with_abbreviations(abbreviations: &[&str]) -> Self {
        let mut abbreviations: Vec<String> = abbreviations
            .iter()
            .filter(|a| a.contains('.'))
            .map(|a| a.to_string())
            .collect();
        abbreviations.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        abbreviations.dedup();

        let abbreviations = abbreviations
            .into_iter()
            .map(|abbr| {
                let protected = abbr.replace('.', &PROTECTED_PERIOD.to_string());
                (abbr, protected)
            })
            .collect();
        Self { abbreviations }
    }

    /// Split `text` into ordered clauses
    pub fn segment(&self, text: &str) -> Vec<Clause> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let protected = self.protect(text);

        let mut pieces = Vec::new();
        let mut start = 0;
        for m in TERMINATOR.find_iter(&protected) {
            // Terminators are single-byte ASCII, keep them with the piece.
            pieces.push(&protected[start..m.start() + 1]);
            start = m.end();
        }
        pieces.push(&protected[start..]);

        pieces
            .into_iter()
            .filter_map(|piece| Clause::new(restore(piece)))
            .collect()
    }

    fn protect(&self, text: &str) -> String {
        let abbreviated = self
            .abbreviations
            .iter()
            .fold(text.to_string(), |acc, (abbr, protected)| {
                acc.replace(abbr.as_str(), protected)
            });
        protect_decimals(&abbreviated)
    }
}

/// Replace `digit '.' digit` periods with the protected marker
fn protect_decimals(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    for (i, &c) in chars.iter().enumerate() {
        let between_digits = c == '.'
            && i > 0
            && chars[i - 1].is_ascii_digit()
            && chars.get(i + 1).map_or(false, |n| n.is_ascii_digit());
        out.push(if between_digits { PROTECTED_PERIOD } else { c });
    }
    out
}

fn restore(piece: &str) -> String {
    piece.replace(PROTECTED_PERIOD, ".")
}
