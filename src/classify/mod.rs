//! Filename and folder-name heuristics.
//!
//! Every classifier here is an explicit, ordered table so it can be tested
//! without touching the filesystem. The labels they produce are advisory:
//! downstream stages must treat institution, customer type and date as
//! hints, not validated facts.

mod customer_type;
mod date;
mod file_kind;
mod institution;

pub use customer_type::{
    CustomerTypeClassifier, TypeKeyword, COMPANY_KEYWORDS, DEFAULT_COMPANY_TOKEN_THRESHOLD,
};
pub use date::{parse_filename_date, DateLayout, DATE_LAYOUTS};
pub use file_kind::{guess_mime_type, FileKind};
pub use institution::{
    Institution, InstitutionMatcher, InstitutionPattern, EXCLUDED_WORDS, INSTITUTION_PATTERNS,
};

/// True when the filename carries the notary's `ERROR` marker.
pub fn has_error_prefix(filename: &str) -> bool {
    filename
        .get(..5)
        .map(|prefix| prefix.eq_ignore_ascii_case("ERROR"))
        .unwrap_or(false)
}
