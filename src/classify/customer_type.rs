//! Person vs company classification of customer folder names.

use crate::registry::CustomerType;

/// A keyword that marks a folder name as belonging to a given customer type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeKeyword {
    /// Lowercase token compared against each name token
    pub keyword: &'static str,
    pub customer_type: CustomerType,
}

impl TypeKeyword {
    pub const fn new(keyword: &'static str, customer_type: CustomerType) -> Self {
        Self {
            keyword,
            customer_type,
        }
    }
}

/// Legal-entity keywords, checked in order. The first hit decides.
pub const COMPANY_KEYWORDS: &[TypeKeyword] = &[
    TypeKeyword::new("sociedad", CustomerType::Company),
    TypeKeyword::new("anónima", CustomerType::Company),
    TypeKeyword::new("anonima", CustomerType::Company),
    TypeKeyword::new("s.a.", CustomerType::Company),
    TypeKeyword::new("s.a", CustomerType::Company),
    TypeKeyword::new("sa", CustomerType::Company),
    TypeKeyword::new("s.r.l.", CustomerType::Company),
    TypeKeyword::new("s.r.l", CustomerType::Company),
    TypeKeyword::new("srl", CustomerType::Company),
    TypeKeyword::new("ltda", CustomerType::Company),
    TypeKeyword::new("ltda.", CustomerType::Company),
    TypeKeyword::new("limitada", CustomerType::Company),
    TypeKeyword::new("empresa", CustomerType::Company),
    TypeKeyword::new("corporación", CustomerType::Company),
    TypeKeyword::new("corporacion", CustomerType::Company),
    TypeKeyword::new("corp", CustomerType::Company),
    TypeKeyword::new("corp.", CustomerType::Company),
];

/// Default number of tokens above which an unmatched name is read as a
/// company.
pub const DEFAULT_COMPANY_TOKEN_THRESHOLD: usize = 3;

/// Classifies folder names using a keyword table and a token-count fallback.
#[derive(Debug, Clone)]
pub struct CustomerTypeClassifier {
    keywords: &'static [TypeKeyword],
    token_threshold: usize,
}

impl Default for CustomerTypeClassifier {
    fn default() -> Self {
        Self::new(COMPANY_KEYWORDS, DEFAULT_COMPANY_TOKEN_THRESHOLD)
    }
}

impl CustomerTypeClassifier {
    pub fn new(keywords: &'static [TypeKeyword], token_threshold: usize) -> Self {
        Self {
            keywords,
            token_threshold,
        }
    }

    pub fn with_token_threshold(token_threshold: usize) -> Self {
        Self::new(COMPANY_KEYWORDS, token_threshold)
    }

    /// Keywords compare against whole tokens, so "Rosa" never hits "sa".
    pub fn classify(&self, name: &str) -> CustomerType {
        let lowered = name.to_lowercase();
        let tokens: Vec<&str> = lowered
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|t| !t.is_empty())
            .collect();

        for entry in self.keywords {
            if tokens.iter().any(|t| *t == entry.keyword) {
                return entry.customer_type;
            }
        }

        if tokens.len() > self.token_threshold {
            CustomerType::Company
        } else {
            CustomerType::Person
        }
    }
}
