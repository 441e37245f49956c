//! Institution vocabulary and filename matching.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed vocabulary of institutions referenced in certificate filenames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Institution {
    /// Banco de Previsión Social
    Bps,
    /// Ministerio de Salud Pública
    Msp,
    Abitab,
    /// Dirección General Impositiva
    Dgi,
    Asse,
    Antel,
    Ute,
    Ose,
}

impl Institution {
    pub const ALL: [Institution; 8] = [
        Self::Bps,
        Self::Msp,
        Self::Abitab,
        Self::Dgi,
        Self::Asse,
        Self::Antel,
        Self::Ute,
        Self::Ose,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bps => "BPS",
            Self::Msp => "MSP",
            Self::Abitab => "ABITAB",
            Self::Dgi => "DGI",
            Self::Asse => "ASSE",
            Self::Antel => "ANTEL",
            Self::Ute => "UTE",
            Self::Ose => "OSE",
        }
    }
}

impl fmt::Display for Institution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Institution {
    type Err = String;

    /// Case-insensitive exact match against the vocabulary.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|inst| inst.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| format!("Unknown institution '{}'", s))
    }
}

/// A filename pattern that identifies an institution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstitutionPattern {
    /// Uppercase ASCII pattern searched for in the filename
    pub pattern: &'static str,
    pub institution: Institution,
}

impl InstitutionPattern {
    pub const fn new(pattern: &'static str, institution: Institution) -> Self {
        Self {
            pattern,
            institution,
        }
    }
}

/// Patterns in declaration order. Matching evaluates them longest first,
/// falling back to this order on equal length.
pub const INSTITUTION_PATTERNS: &[InstitutionPattern] = &[
    InstitutionPattern::new("BPS", Institution::Bps),
    InstitutionPattern::new("MSP", Institution::Msp),
    InstitutionPattern::new("ABITAB", Institution::Abitab),
    InstitutionPattern::new("DGI", Institution::Dgi),
    InstitutionPattern::new("ASSE", Institution::Asse),
    InstitutionPattern::new("ANTEL", Institution::Antel),
    InstitutionPattern::new("UTE", Institution::Ute),
    InstitutionPattern::new("OSE", Institution::Ose),
];

/// Words that contain a pattern without naming the institution.
pub const EXCLUDED_WORDS: &[&str] = &[
    "JOSE", "ROSE", "DOSE", "POSE", "CLOSE", "MINUTE", "ESTATUTE", "INSTITUTE", "COMPUTE",
];

/// Matches filenames against an institution pattern table.
#[derive(Debug, Clone)]
pub struct InstitutionMatcher {
    patterns: Vec<InstitutionPattern>,
    excluded: Vec<&'static str>,
}

impl Default for InstitutionMatcher {
    fn default() -> Self {
        Self::new(INSTITUTION_PATTERNS)
    }
}

impl InstitutionMatcher {
    pub fn new(patterns: &[InstitutionPattern]) -> Self {
        let mut patterns = patterns.to_vec();
        // Stable sort keeps declaration order among equal lengths.
        patterns.sort_by(|a, b| b.pattern.len().cmp(&a.pattern.len()));
        Self {
            patterns,
            excluded: EXCLUDED_WORDS.to_vec(),
        }
    }

    /// Replace the excluded word table. Words are uppercase ASCII.
    pub fn with_excluded_words(mut self, words: &[&'static str]) -> Self {
        self.excluded = words.to_vec();
        self
    }

    /// Patterns in evaluation order.
    pub fn patterns(&self) -> &[InstitutionPattern] {
        &self.patterns
    }

    /// Return the first institution whose pattern appears in `filename`.
    ///
    /// Plain case-insensitive substring match, so `"CertificadoBPS2024"`
    /// reads as BPS. An occurrence that lies inside one of the excluded
    /// words (`"JOSE"` for OSE) does not count.
    pub fn detect(&self, filename: &str) -> Option<Institution> {
        let upper = filename.to_ascii_uppercase();
        self.patterns
            .iter()
            .find(|p| self.contains_pattern(&upper, p.pattern))
            .map(|p| p.institution)
    }

    fn contains_pattern(&self, haystack: &str, needle: &str) -> bool {
        haystack.match_indices(needle).any(|(start, _)| {
            let end = start + needle.len();
            !self.excluded.iter().any(|word| {
                haystack
                    .match_indices(word)
                    .any(|(word_start, _)| word_start <= start && end <= word_start + word.len())
            })
        })
    }
}
