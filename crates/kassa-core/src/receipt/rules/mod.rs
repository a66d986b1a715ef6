//! Rule-based field extractors for the receipt layout.

pub mod dates;
pub mod lines;
pub mod numbers;
pub mod patterns;

pub use dates::{DateFormat, DateLocator, find_receipt_date};
pub use lines::{Classified, Rejection, classify_line, classify_text_line};
pub use numbers::{
    MAX_MAGNITUDE, WEIGHT_SUFFIX, has_weight_suffix, parse_decimal, strip_unit_suffix,
    within_range,
};
