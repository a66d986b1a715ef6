//! Receipt date location in header text.

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::patterns::{DATE_DMY_DASH, DATE_DMY_DOT, DATE_DMY_SLASH, DATE_YMD};

/// Layout of the date printed in a receipt header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateFormat {
    /// `13/08/2025`
    #[default]
    DayMonthYearSlash,
    /// `13-08-2025`
    DayMonthYearDash,
    /// `13.08.2025`
    DayMonthYearDot,
    /// `2025-08-13`
    Iso,
}

impl DateFormat {
    fn pattern(self) -> &'static Regex {
        match self {
            Self::DayMonthYearSlash => &*DATE_DMY_SLASH,
            Self::DayMonthYearDash => &*DATE_DMY_DASH,
            Self::DayMonthYearDot => &*DATE_DMY_DOT,
            Self::Iso => &*DATE_YMD,
        }
    }

    /// `chrono` format string for this layout.
    pub fn chrono_format(self) -> &'static str {
        match self {
            Self::DayMonthYearSlash => "%d/%m/%Y",
            Self::DayMonthYearDash => "%d-%m-%Y",
            Self::DayMonthYearDot => "%d.%m.%Y",
            Self::Iso => "%Y-%m-%d",
        }
    }

    /// Parse a single date token in this layout.
    pub fn parse(self, token: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(token, self.chrono_format()).ok()
    }
}

/// Finds the receipt date among the header lines.
#[derive(Debug, Clone)]
pub struct DateLocator {
    format: DateFormat,
    require_time: bool,
}

impl DateLocator {
    pub fn new(format: DateFormat) -> Self {
        Self {
            format,
            require_time: true,
        }
    }

    /// Only consider lines that also carry a time (contain a colon).
    pub fn with_time_requirement(mut self, require_time: bool) -> Self {
        self.require_time = require_time;
        self
    }

    pub fn format(&self) -> DateFormat {
        self.format
    }

    /// Date on a single line, if the line is a candidate and holds a valid date.
    pub fn date_in_line(&self, line: &str) -> Option<NaiveDate> {
        if self.require_time && !line.contains(':') {
            return None;
        }

        self.format
            .pattern()
            .find_iter(line)
            .find_map(|m| self.format.parse(m.as_str()))
    }

    /// First date found scanning lines in order; scanning stops at the first hit.
    pub fn find_receipt_date<I, S>(&self, lines: I) -> Option<NaiveDate>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        lines.into_iter().enumerate().find_map(|(idx, line)| {
            let date = self.date_in_line(line.as_ref());
            if let Some(date) = date {
                trace!("Receipt date {} found on line {}", date, idx + 1);
            }
            date
        })
    }
}

impl Default for DateLocator {
    fn default() -> Self {
        Self::new(DateFormat::default())
    }
}

/// Find the receipt date with the default `DD/MM/YYYY` layout.
pub fn find_receipt_date<I, S>(lines: I) -> Option<NaiveDate>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    DateLocator::default().find_receipt_date(lines)
}
