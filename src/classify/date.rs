//! Best-effort date extraction from certificate filenames.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;

/// Order in which the date layouts are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateLayout {
    /// `YYYY-MM-DD` or `YYYY_MM_DD`
    IsoDashed,
    /// `DD-MM-YYYY` or `DD_MM_YYYY`
    DayFirstDashed,
    /// `YYYYMMDD`, not embedded in a longer digit run
    Compact,
}

pub const DATE_LAYOUTS: [DateLayout; 3] = [
    DateLayout::IsoDashed,
    DateLayout::DayFirstDashed,
    DateLayout::Compact,
];

lazy_static! {
    static ref ISO_DASHED: Regex =
        Regex::new(r"(\d{4})[-_](\d{2})[-_](\d{2})").expect("valid ISO date regex");
    static ref DAY_FIRST_DASHED: Regex =
        Regex::new(r"(\d{2})[-_](\d{2})[-_](\d{4})").expect("valid day-first date regex");
    static ref COMPACT: Regex =
        Regex::new(r"(?:^|\D)(\d{4})(\d{2})(\d{2})(?:\D|$)").expect("valid compact date regex");
}

impl DateLayout {
    /// Try every occurrence of this layout in `text`, returning the first
    /// one that is a real calendar date.
    pub fn parse(&self, text: &str) -> Option<NaiveDate> {
        let (regex, order): (&Regex, [usize; 3]) = match self {
            Self::IsoDashed => (&*ISO_DASHED, [1, 2, 3]),
            Self::DayFirstDashed => (&*DAY_FIRST_DASHED, [3, 2, 1]),
            Self::Compact => (&*COMPACT, [1, 2, 3]),
        };

        regex.captures_iter(text).find_map(|caps| {
            let year: i32 = caps.get(order[0])?.as_str().parse().ok()?;
            let month: u32 = caps.get(order[1])?.as_str().parse().ok()?;
            let day: u32 = caps.get(order[2])?.as_str().parse().ok()?;
            NaiveDate::from_ymd_opt(year, month, day)
        })
    }
}

/// Extract a date from a filename, trying each layout in turn.
pub fn parse_filename_date(filename: &str) -> Option<NaiveDate> {
    DATE_LAYOUTS.iter().find_map(|layout| layout.parse(filename))
}
