//! Common regex patterns for receipt extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Comma-decimal numeral, unit suffix already removed: "12,34", "-1", "0,350"
    pub static ref NUMERAL: Regex = Regex::new(
        r"^([+-]?)(\d+)(?:,(\d+))?$"
    ).unwrap();

    // Header date patterns
    pub static ref DATE_DMY_SLASH: Regex = Regex::new(
        r"\b\d{1,2}/\d{1,2}/\d{4}\b"
    ).unwrap();

    pub static ref DATE_DMY_DASH: Regex = Regex::new(
        r"\b\d{1,2}-\d{1,2}-\d{4}\b"
    ).unwrap();

    pub static ref DATE_DMY_DOT: Regex = Regex::new(
        r"\b\d{1,2}\.\d{1,2}\.\d{4}\b"
    ).unwrap();

    pub static ref DATE_YMD: Regex = Regex::new(
        r"\b\d{4}-\d{1,2}-\d{1,2}\b"
    ).unwrap();
}
